// 4You Portal - Broadband Customer/Engineer Portal Workflow Engine
// This exposes the core components for testing and integration

pub mod app;
pub mod billing;
pub mod config;
pub mod currency;
pub mod errors;
pub mod identity;
pub mod notify;
pub mod store;
pub mod tasks;
pub mod telemetry;

// Re-export key types for easy access
pub use app::Portal;
pub use billing::{Bill, BillId, BillLedger, BillStatus, PaymentEvent, PaymentMachine, PaymentPhase};
pub use config::{config, init_config, PortalConfig};
pub use currency::{format_inr, Money};
pub use errors::PortalError;
pub use identity::{ActorId, IdentityProvider, LocalIdentity, Role, SessionAction, SessionState, View};
pub use notify::{Notification, Notifier, Severity};
pub use store::{DocumentStore, MemoryStore, RawDocument, Snapshot};
pub use tasks::{AttachmentMeta, PlanTier, TaskDraft, TaskId, TaskLedger, TaskRecord, TaskStatus};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
