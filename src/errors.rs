use thiserror::Error;

use crate::billing::BillId;
use crate::tasks::TaskStatus;

/// Every failure a workflow can surface. All of these are caught at the
/// portal boundary and turned into an error notification; none of them
/// should ever tear down a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortalError {
    /// Missing or malformed input. The message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// Attachment over the upload limit.
    #[error("File size too big, yaar! Max 2MB allowed.")]
    SizeLimit { file_name: String, size_bytes: u64 },

    /// Task status jump that is not the next step in the linear order.
    #[error("Cannot move task from '{from}' to '{to}'")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Bill is already settled; paying it twice is not a thing.
    #[error("Bill {0} is already paid")]
    AlreadyPaid(BillId),

    /// Unknown record identifier.
    #[error("{0} not found")]
    NotFound(String),

    /// Document store handle not initialized yet.
    #[error("Database not ready. Wait for a second!")]
    StoreUnavailable,
}

impl PortalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PortalError::Validation(msg.into())
    }
}
