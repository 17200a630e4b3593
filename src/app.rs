use statig::prelude::*;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::billing::{
    seed_bills, BillId, BillLedger, BillStatus, PaymentEvent, PaymentMachine, PaymentPhase,
    ProcessingTimers,
};
use crate::config::PortalConfig;
use crate::currency::Money;
use crate::errors::PortalError;
use crate::identity::{
    reduce, verify_credentials, ActorId, IdentityProvider, Role, SessionAction, SessionState,
    View,
};
use crate::notify::Notifier;
use crate::store::DocumentStore;
use crate::tasks::{TaskDraft, TaskId, TaskLedger, TaskStatus};
use crate::telemetry::create_workflow_span;

/// The portal engine for one session.
///
/// Wires the bill ledger, payment workflow, task ledger, and notification
/// channel together. Every `PortalError` raised by an operation is caught
/// here and surfaced as a single error notification; nothing crashes the
/// session.
pub struct Portal {
    config: PortalConfig,
    session: SessionState,
    bills: BillLedger,
    payment: StateMachine<PaymentMachine>,
    tasks: Option<TaskLedger>,
    notifier: Notifier,
}

impl Portal {
    pub fn new(config: PortalConfig) -> Self {
        let notifier = Notifier::new(config.notifications.display_duration());
        Self {
            config,
            session: SessionState::default(),
            bills: BillLedger::new(seed_bills()),
            payment: PaymentMachine::default().state_machine(),
            tasks: None,
            notifier,
        }
    }

    /// Sign in against the identity provider and attach the document store.
    /// Uses the custom token when one is provided, anonymous sign-in
    /// otherwise; a failed token sign-in falls back to anonymous.
    pub async fn initialize(
        &mut self,
        identity: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
        token: Option<&str>,
    ) -> Result<(), PortalError> {
        let actor = match token {
            Some(token) => match identity.sign_in_with_token(token).await {
                Ok(actor) => actor,
                Err(err) => {
                    tracing::warn!(error = %err, "Token sign-in failed, falling back to anonymous");
                    identity.sign_in_anonymously().await?
                }
            },
            None => identity.sign_in_anonymously().await?,
        };
        self.dispatch(SessionAction::AuthStateChanged(Some(actor)));

        let collection = self.config.store.activation_path();
        self.tasks = Some(TaskLedger::connect(store, collection));
        Ok(())
    }

    pub fn dispatch(&mut self, action: SessionAction) {
        self.session = reduce(self.session.clone(), action);
    }

    /// Portal login. Credential mismatches are form-level errors, not
    /// notifications.
    pub fn login(&mut self, mobile: &str, password: &str, role: Role) -> Result<(), String> {
        let actor = self.session.actor.clone();
        let span = create_workflow_span("login", actor.as_ref().map(|a| a.0.as_str()), None);
        let _guard = span.enter();

        verify_credentials(mobile, password, role)?;
        self.dispatch(SessionAction::LoggedIn { role });
        tracing::info!(role = ?role, "Logged in");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.dispatch(SessionAction::LoggedOut);
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn bills(&self) -> &BillLedger {
        &self.bills
    }

    pub fn total_due(&self) -> Money {
        self.bills.total_due()
    }

    pub fn switch_view(&mut self, view: View) {
        self.dispatch(SessionAction::SwitchView(view));
    }

    // --- Payment workflow -------------------------------------------------

    /// Open the payment review step for a bill.
    pub fn select_bill(&mut self, id: BillId) -> Result<(), PortalError> {
        let result = self.try_select_bill(id);
        self.reported(result)
    }

    fn try_select_bill(&mut self, id: BillId) -> Result<(), PortalError> {
        let bill = self
            .bills
            .get(id)
            .ok_or_else(|| PortalError::NotFound(format!("Bill {id}")))?;
        if bill.status == BillStatus::Paid {
            return Err(PortalError::AlreadyPaid(id));
        }
        self.payment.handle(&PaymentEvent::Select { bill_id: id });
        Ok(())
    }

    /// Dismiss the payment workflow. Only honored while still in review;
    /// processing is non-cancellable.
    pub fn cancel_payment(&mut self) {
        self.payment.handle(&PaymentEvent::Cancel);
    }

    /// Confirm the reviewed payment and drive the simulated processing
    /// phase to settlement. Progress messages cycle on their interval while
    /// an independent deadline decides when the payment settles; both
    /// timers die with this call, even if it is dropped mid-flight.
    pub async fn confirm_payment(&mut self) -> Result<(), PortalError> {
        let result = self.try_confirm_payment().await;
        self.reported(result)
    }

    async fn try_confirm_payment(&mut self) -> Result<(), PortalError> {
        if self.payment.phase() != PaymentPhase::Review {
            return Err(PortalError::validation("No payment awaiting confirmation"));
        }
        let bill_id = self
            .payment
            .bill_id()
            .ok_or_else(|| PortalError::validation("No bill selected for payment"))?;

        self.payment.handle(&PaymentEvent::Confirm);

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let (settle_tx, mut settle_rx) = oneshot::channel();
        let _timers = ProcessingTimers::start(
            self.config.payment.progress_interval(),
            self.config.payment.processing_duration(),
            progress_tx,
            settle_tx,
        );

        loop {
            tokio::select! {
                Some(message) = progress_rx.recv() => {
                    tracing::info!(message, "Processing payment");
                    self.payment.handle(&PaymentEvent::Progress);
                }
                settled = &mut settle_rx => {
                    settled.map_err(|_| {
                        PortalError::validation("Payment processing was interrupted")
                    })?;
                    break;
                }
            }
        }

        self.payment.handle(&PaymentEvent::Settle);
        self.bills.mark_paid(bill_id)?;
        // The workflow instance is done; the next payment starts fresh.
        self.payment = PaymentMachine::default().state_machine();
        self.notifier
            .success("Payment successful! Enjoy the cricket match without buffering.");
        Ok(())
    }

    pub fn payment_phase(&self) -> PaymentPhase {
        self.payment.phase()
    }

    /// Simulated invoice download: only the notification exists.
    pub fn download_invoice(&mut self, id: BillId) -> Result<(), PortalError> {
        let result = self
            .bills
            .get(id)
            .ok_or_else(|| PortalError::NotFound(format!("Bill {id}")))
            .map(|bill| {
                self.notifier
                    .info(format!("Downloading {}... saving for tax returns?", bill.pdf));
            });
        self.reported(result)
    }

    // --- Task workflow (engineer role) ------------------------------------

    pub fn tasks(&self) -> Result<&TaskLedger, PortalError> {
        self.tasks.as_ref().ok_or(PortalError::StoreUnavailable)
    }

    /// Register a new activation task. Engineer-only; the gate is a UI-level
    /// rule enforced at this boundary, not by the data layer.
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<TaskId, PortalError> {
        let result = self.try_create_task(draft).await;
        self.reported(result)
    }

    async fn try_create_task(&mut self, draft: TaskDraft) -> Result<TaskId, PortalError> {
        let engineer = self.require_engineer()?;
        let name = draft.name.clone();
        let id = self.tasks()?.create_task(draft, &engineer).await?;
        self.notifier.success(format!(
            "User {name} added successfully! Installation is scheduled."
        ));
        Ok(id)
    }

    /// Advance an installation task to its next status. Engineer-only.
    pub async fn advance_task(
        &mut self,
        id: &TaskId,
        new_status: TaskStatus,
    ) -> Result<(), PortalError> {
        let result = self.try_advance_task(id, new_status).await;
        self.reported(result)
    }

    async fn try_advance_task(
        &mut self,
        id: &TaskId,
        new_status: TaskStatus,
    ) -> Result<(), PortalError> {
        let engineer = self.require_engineer()?;
        let tasks = self.tasks()?;
        let name = tasks
            .tasks()
            .into_iter()
            .find(|t| &t.id == id)
            .map(|t| t.name)
            .ok_or_else(|| PortalError::NotFound(format!("Task {id}")))?;
        tasks.update_status(id, new_status, &engineer).await?;
        self.notifier
            .success(format!("Task for {name} updated to {new_status}!"));
        Ok(())
    }

    fn require_engineer(&self) -> Result<ActorId, PortalError> {
        match self.session.role {
            Role::Engineer => {}
            Role::Customer => {
                return Err(PortalError::validation(
                    "Only engineers can manage installation tasks.",
                ))
            }
        }
        self.session
            .actor
            .clone()
            .ok_or(PortalError::StoreUnavailable)
    }

    /// Workflow boundary: convert any failure into an error notification
    /// and keep the session alive.
    fn reported<T>(&self, result: Result<T, PortalError>) -> Result<T, PortalError> {
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Workflow operation failed");
            self.notifier.error(err.to_string());
        }
        result
    }
}
