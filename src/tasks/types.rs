use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::ActorId;
use crate::store::RawDocument;

/// Attachments are capped at 2 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 2 * 1024 * 1024;

/// Store-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Installation lifecycle. Strictly linear: no skipping, no reverse edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Pending Installation")]
    PendingInstallation,
    #[serde(rename = "Installation Scheduled")]
    InstallationScheduled,
    Completed,
}

impl TaskStatus {
    /// The only status this one may advance to. `Completed` is terminal.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::PendingInstallation => Some(TaskStatus::InstallationScheduled),
            TaskStatus::InstallationScheduled => Some(TaskStatus::Completed),
            TaskStatus::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::PendingInstallation => write!(f, "Pending Installation"),
            TaskStatus::InstallationScheduled => write!(f, "Installation Scheduled"),
            TaskStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// The broadband tiers an engineer can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanTier {
    #[serde(rename = "100 Mbps Standard")]
    Standard100,
    #[serde(rename = "300 Mbps Fiber Blast")]
    FiberBlast300,
    #[serde(rename = "500 Mbps Pro Gamer")]
    ProGamer500,
    #[serde(rename = "1 Gbps Premium")]
    Premium1G,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Standard100,
        PlanTier::FiberBlast300,
        PlanTier::ProGamer500,
        PlanTier::Premium1G,
    ];
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Standard100 => write!(f, "100 Mbps Standard"),
            PlanTier::FiberBlast300 => write!(f, "300 Mbps Fiber Blast"),
            PlanTier::ProGamer500 => write!(f, "500 Mbps Pro Gamer"),
            PlanTier::Premium1G => write!(f, "1 Gbps Premium"),
        }
    }
}

/// Uploaded file placeholder. Only the name and size exist; the bytes are
/// never transmitted or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub size_bytes: u64,
}

impl AttachmentMeta {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
        }
    }

    pub fn oversized(&self) -> bool {
        self.size_bytes > MAX_ATTACHMENT_BYTES
    }
}

/// Everything an engineer fills in before a task record exists.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub plan: Option<PlanTier>,
    pub initial_password: String,
    pub photo: Option<AttachmentMeta>,
    pub document: Option<AttachmentMeta>,
}

/// One activation case in the shared store. Field names mirror the stored
/// document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(skip)]
    pub id: TaskId,
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub plan: PlanTier,
    pub initial_password: String,
    pub photo_file_name: String,
    pub document_file_name: String,
    pub status: TaskStatus,
    pub created_by_engineer: ActorId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Decode a stored document. Returns `None` for documents that do not
    /// parse as task records; snapshot sync tolerates and skips them.
    pub fn from_raw(raw: &RawDocument) -> Option<TaskRecord> {
        match serde_json::from_value::<TaskRecord>(raw.data.clone()) {
            Ok(mut record) => {
                record.id = TaskId(raw.id.clone());
                Some(record)
            }
            Err(err) => {
                tracing::warn!(id = %raw.id, error = %err, "Skipping malformed task document");
                None
            }
        }
    }

    pub fn to_document(&self) -> serde_json::Value {
        // `id` is skipped by serde; the store assigns it.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
