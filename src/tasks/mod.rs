// Installation/activation tasks
//
// Records live in the external document store, shared by every engineer.
// The ledger keeps a client-side snapshot in sync and enforces the strict
// linear status order; the store itself enforces nothing.

pub mod ledger;
pub mod types;

pub use ledger::TaskLedger;
pub use types::{
    AttachmentMeta, PlanTier, TaskDraft, TaskId, TaskRecord, TaskStatus, MAX_ATTACHMENT_BYTES,
};
