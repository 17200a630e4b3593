use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A transient user-facing message. At most one is ever live.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

struct NotifierInner {
    current: Option<Notification>,
    /// Bumped on every notify; an expiry timer only clears the notification
    /// it was started for, so a superseded timer can never clear a newer one.
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

/// Latest-wins notification channel shared by all workflows.
///
/// `notify` replaces whatever is currently displayed and restarts the
/// visibility timer; there is no stacking or queueing.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Mutex<NotifierInner>>,
    display_duration: Duration,
}

impl Notifier {
    pub fn new(display_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NotifierInner {
                current: None,
                generation: 0,
                expiry: None,
            })),
            display_duration,
        }
    }

    /// Show a notification, replacing any live one and discarding its timer.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        tracing::info!(severity = ?severity, message = %message, "notification");

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.generation += 1;
        let generation = inner.generation;
        if let Some(old) = inner.expiry.take() {
            old.abort();
        }
        inner.current = Some(Notification {
            message,
            severity,
            created_at: Utc::now(),
        });

        let shared = Arc::clone(&self.inner);
        let ttl = self.display_duration;
        inner.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut inner = shared.lock().unwrap_or_else(|e| e.into_inner());
            if inner.generation == generation {
                inner.current = None;
                inner.expiry = None;
            }
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(message, Severity::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(message, Severity::Error);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(message, Severity::Info);
    }

    /// The currently visible notification, if its timer has not elapsed.
    pub fn current(&self) -> Option<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(handle) = inner.expiry.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expires_after_display_duration() {
        let notifier = Notifier::new(Duration::from_secs(4));
        notifier.success("Payment successful!");
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newest_replaces_oldest_and_old_timer_never_clears_it() {
        let notifier = Notifier::new(Duration::from_secs(4));
        notifier.info("A");
        tokio::time::sleep(Duration::from_secs(3)).await;
        notifier.error("B");

        // A's original expiry would have fired here; B must survive it.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let live = notifier.current().expect("B should still be visible");
        assert_eq!(live.message, "B");
        assert_eq!(live.severity, Severity::Error);

        // B expires on its own 4-second clock.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(notifier.current().is_none());
    }
}
