use statig::prelude::*;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::ledger::BillId;

/// Progress lines cycled while a payment "processes". Purely cosmetic; they
/// carry no semantic state and however many are shown has no effect on when
/// the payment settles.
pub const PROGRESS_MESSAGES: [&str; 6] = [
    "Waiting for the OTP SMS...",
    "Calculating 18% GST...",
    "Connecting to the bank server (it's lunch time)...",
    "Looking for cashback offers...",
    "Asking the neighbors to get off your WiFi...",
    "Verifying with Aadhaar...",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// A bill was selected for payment; opens the review step.
    Select { bill_id: BillId },
    /// Explicit confirm; enters the non-cancellable processing phase.
    Confirm,
    /// Dismiss the workflow. Only honored during review.
    Cancel,
    /// A progress message was shown.
    Progress,
    /// The processing deadline elapsed.
    Settle,
}

/// Where the workflow currently is, readable from outside the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentPhase {
    #[default]
    Idle,
    Review,
    Processing,
    Settled,
}

/// Payment workflow context: `Review -> Processing -> Settled`.
///
/// `Review` is the only state that allows cancellation; `Settled` is terminal
/// and it is the caller's cue to mark the bill paid. There is no decline
/// path: processing always settles.
#[derive(Debug, Default)]
pub struct PaymentMachine {
    bill_id: Option<BillId>,
    messages_shown: u32,
    phase: PaymentPhase,
}

impl PaymentMachine {
    pub fn bill_id(&self) -> Option<BillId> {
        self.bill_id
    }

    pub fn messages_shown(&self) -> u32 {
        self.messages_shown
    }

    pub fn phase(&self) -> PaymentPhase {
        self.phase
    }
}

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl PaymentMachine {
    #[state]
    fn idle(&mut self, event: &PaymentEvent) -> Response<State> {
        match event {
            PaymentEvent::Select { bill_id } => {
                self.bill_id = Some(*bill_id);
                self.messages_shown = 0;
                self.phase = PaymentPhase::Review;
                tracing::info!(bill_id = %bill_id, "Payment review opened");
                Transition(State::review())
            }
            _ => Handled,
        }
    }

    #[state]
    fn review(&mut self, event: &PaymentEvent) -> Response<State> {
        match event {
            PaymentEvent::Confirm => {
                tracing::info!(bill_id = ?self.bill_id, "Payment confirmed, processing");
                self.phase = PaymentPhase::Processing;
                Transition(State::processing())
            }
            PaymentEvent::Cancel => {
                tracing::info!(bill_id = ?self.bill_id, "Payment cancelled at review");
                self.bill_id = None;
                self.phase = PaymentPhase::Idle;
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn processing(&mut self, event: &PaymentEvent) -> Response<State> {
        match event {
            PaymentEvent::Progress => {
                self.messages_shown += 1;
                Handled
            }
            PaymentEvent::Settle => {
                tracing::info!(
                    bill_id = ?self.bill_id,
                    messages_shown = self.messages_shown,
                    "Payment settled"
                );
                self.phase = PaymentPhase::Settled;
                Transition(State::settled())
            }
            // Processing is non-cancellable.
            _ => Handled,
        }
    }

    #[state]
    #[allow(unused_variables)]
    fn settled(&mut self, event: &PaymentEvent) -> Response<State> {
        Handled
    }
}

/// The two timers that drive the processing phase: a progress-message
/// interval and an independent settle deadline. Dropping the handle aborts
/// both, so tearing down the workflow early can never leave an orphaned
/// timer firing into disposed state.
pub struct ProcessingTimers {
    ticker: JoinHandle<()>,
    deadline: JoinHandle<()>,
}

impl ProcessingTimers {
    pub fn start(
        interval: Duration,
        total: Duration,
        progress: mpsc::UnboundedSender<&'static str>,
        settled: oneshot::Sender<()>,
    ) -> Self {
        let ticker = tokio::spawn(async move {
            // First message shows as soon as processing starts, the rest
            // cycle on the interval.
            if progress.send(PROGRESS_MESSAGES[0]).is_err() {
                return;
            }
            let start = tokio::time::Instant::now();
            let mut tick = tokio::time::interval_at(start + interval, interval);
            let mut idx = 0usize;
            loop {
                tick.tick().await;
                idx = (idx + 1) % PROGRESS_MESSAGES.len();
                if progress.send(PROGRESS_MESSAGES[idx]).is_err() {
                    break;
                }
            }
        });

        let deadline = tokio::spawn(async move {
            tokio::time::sleep(total).await;
            let _ = settled.send(());
        });

        Self { ticker, deadline }
    }
}

impl Drop for ProcessingTimers {
    fn drop(&mut self) {
        self.ticker.abort();
        self.deadline.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_confirm_settle_is_the_happy_path() {
        let mut sm = PaymentMachine::default().state_machine();
        assert_eq!(sm.state(), &State::idle());

        sm.handle(&PaymentEvent::Select { bill_id: BillId(101) });
        assert_eq!(sm.state(), &State::review());
        assert_eq!(sm.bill_id(), Some(BillId(101)));

        sm.handle(&PaymentEvent::Confirm);
        assert_eq!(sm.state(), &State::processing());

        sm.handle(&PaymentEvent::Progress);
        sm.handle(&PaymentEvent::Progress);
        sm.handle(&PaymentEvent::Settle);
        assert_eq!(sm.state(), &State::settled());
        assert_eq!(sm.phase(), PaymentPhase::Settled);
        assert_eq!(sm.messages_shown(), 2);
    }

    #[test]
    fn cancel_is_only_honored_in_review() {
        let mut sm = PaymentMachine::default().state_machine();
        sm.handle(&PaymentEvent::Select { bill_id: BillId(101) });
        sm.handle(&PaymentEvent::Cancel);
        assert_eq!(sm.state(), &State::idle());
        assert_eq!(sm.bill_id(), None);

        // Once processing, cancel is ignored.
        sm.handle(&PaymentEvent::Select { bill_id: BillId(101) });
        sm.handle(&PaymentEvent::Confirm);
        sm.handle(&PaymentEvent::Cancel);
        assert_eq!(sm.state(), &State::processing());
    }

    #[test]
    fn settle_does_not_apply_outside_processing() {
        let mut sm = PaymentMachine::default().state_machine();
        sm.handle(&PaymentEvent::Settle);
        assert_eq!(sm.state(), &State::idle());

        sm.handle(&PaymentEvent::Select { bill_id: BillId(101) });
        sm.handle(&PaymentEvent::Settle);
        assert_eq!(sm.state(), &State::review());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_settles_regardless_of_message_cycles() {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let (settle_tx, settle_rx) = oneshot::channel();
        let _timers = ProcessingTimers::start(
            Duration::from_secs(1),
            Duration::from_millis(3500),
            progress_tx,
            settle_tx,
        );

        settle_rx.await.expect("deadline should fire");

        let mut shown = Vec::new();
        while let Ok(msg) = progress_rx.try_recv() {
            shown.push(msg);
        }
        // Messages at t=0s, 1s, 2s, 3s; the 3.5s deadline wins.
        assert_eq!(
            shown,
            vec![
                PROGRESS_MESSAGES[0],
                PROGRESS_MESSAGES[1],
                PROGRESS_MESSAGES[2],
                PROGRESS_MESSAGES[3],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timers_cancels_both() {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let (settle_tx, mut settle_rx) = oneshot::channel();
        let timers = ProcessingTimers::start(
            Duration::from_secs(1),
            Duration::from_millis(3500),
            progress_tx,
            settle_tx,
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(timers);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(settle_rx.try_recv().is_err(), "deadline must not fire after teardown");

        let mut shown = 0;
        while progress_rx.try_recv().is_ok() {
            shown += 1;
        }
        assert!(shown <= 2, "no progress after teardown, got {shown}");
    }
}
