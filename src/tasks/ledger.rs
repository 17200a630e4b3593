use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::types::{TaskDraft, TaskId, TaskRecord, TaskStatus};
use crate::errors::PortalError;
use crate::identity::ActorId;
use crate::store::{DocumentStore, Snapshot};

/// Externally synchronized collection of activation tasks.
///
/// The store is the source of truth shared by every engineer session; this
/// ledger keeps a client-side snapshot current through the subscription and
/// re-sorts it newest-created-first on every delivery (the store provides no
/// ordering). Its own writes are echoed locally so in-session reads never
/// observe stale state while the broadcast is in flight.
pub struct TaskLedger {
    store: Arc<dyn DocumentStore>,
    collection: String,
    cache: Arc<RwLock<Vec<TaskRecord>>>,
    snapshots: watch::Sender<Vec<TaskRecord>>,
    sync_task: JoinHandle<()>,
}

impl TaskLedger {
    /// Attach to the activation collection and start the snapshot sync loop.
    pub fn connect(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        let (initial, changes) = store.subscribe(&collection);
        let tasks = decode_snapshot(&initial);

        let cache = Arc::new(RwLock::new(tasks.clone()));
        let (snapshots, _) = watch::channel(tasks);

        let sync_task = tokio::spawn(sync_loop(
            changes,
            Arc::clone(&cache),
            snapshots.clone(),
        ));

        Self {
            store,
            collection,
            cache,
            snapshots,
            sync_task,
        }
    }

    /// Current snapshot, newest-created-first.
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Tasks still in flight (anything not yet `Completed`).
    pub fn pending_tasks(&self) -> Vec<TaskRecord> {
        self.tasks()
            .into_iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .collect()
    }

    pub fn completed_tasks(&self) -> Vec<TaskRecord> {
        self.tasks()
            .into_iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .collect()
    }

    /// Push-based snapshot stream: always carries the latest full snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TaskRecord>> {
        self.snapshots.subscribe()
    }

    /// Validate a draft and append it with status `Pending Installation`.
    pub async fn create_task(
        &self,
        draft: TaskDraft,
        engineer: &ActorId,
    ) -> Result<TaskId, PortalError> {
        let (plan, photo, document) = validate_draft(&draft)?;

        let mut record = TaskRecord {
            id: TaskId::default(),
            name: draft.name,
            mobile: draft.mobile,
            address: draft.address,
            plan,
            initial_password: draft.initial_password,
            photo_file_name: photo.file_name,
            document_file_name: document.file_name,
            status: TaskStatus::PendingInstallation,
            created_by_engineer: engineer.clone(),
            created_at: Utc::now(),
            last_updated_by: None,
            updated_at: None,
        };

        let id = self
            .store
            .create(&self.collection, record.to_document())
            .await?;
        record.id = TaskId(id.clone());

        tracing::info!(
            task_id = %id,
            name = %record.name,
            plan = %record.plan,
            engineer = %engineer,
            "Activation task created"
        );

        self.apply_local(|tasks| {
            tasks.push(record.clone());
            sort_newest_first(tasks);
        });

        Ok(TaskId(id))
    }

    /// Advance a record to `new_status`. Only the next status in the linear
    /// order is accepted; everything else (same-state, backward, skip) is an
    /// invalid transition. The write merges status, actor, and timestamp
    /// into the existing document without disturbing its other fields.
    pub async fn update_status(
        &self,
        id: &TaskId,
        new_status: TaskStatus,
        actor: &ActorId,
    ) -> Result<(), PortalError> {
        let current = self
            .tasks()
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| PortalError::NotFound(format!("Task {id}")))?;

        if current.status.next() != Some(new_status) {
            return Err(PortalError::InvalidTransition {
                from: current.status,
                to: new_status,
            });
        }

        let updated_at = Utc::now();
        self.store
            .merge(
                &self.collection,
                &id.0,
                json!({
                    "status": new_status,
                    "lastUpdatedBy": actor,
                    "updatedAt": updated_at,
                }),
            )
            .await?;

        tracing::info!(
            task_id = %id,
            from = %current.status,
            to = %new_status,
            actor = %actor,
            "Task status advanced"
        );

        self.apply_local(|tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| &t.id == id) {
                task.status = new_status;
                task.last_updated_by = Some(actor.clone());
                task.updated_at = Some(updated_at);
            }
        });

        Ok(())
    }

    fn apply_local(&self, mutate: impl FnOnce(&mut Vec<TaskRecord>)) {
        let mut tasks = self.cache.write().unwrap_or_else(|e| e.into_inner());
        mutate(&mut tasks);
        let _ = self.snapshots.send(tasks.clone());
    }
}

impl Drop for TaskLedger {
    fn drop(&mut self) {
        self.sync_task.abort();
    }
}

async fn sync_loop(
    mut changes: broadcast::Receiver<Snapshot>,
    cache: Arc<RwLock<Vec<TaskRecord>>>,
    snapshots: watch::Sender<Vec<TaskRecord>>,
) {
    loop {
        match changes.recv().await {
            Ok(snapshot) => {
                let tasks = decode_snapshot(&snapshot);
                *cache.write().unwrap_or_else(|e| e.into_inner()) = tasks.clone();
                let _ = snapshots.send(tasks);
            }
            // Fell behind; the next delivery carries the full latest
            // snapshot anyway.
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Task snapshot stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn decode_snapshot(snapshot: &Snapshot) -> Vec<TaskRecord> {
    let mut tasks: Vec<TaskRecord> = snapshot.iter().filter_map(TaskRecord::from_raw).collect();
    sort_newest_first(&mut tasks);
    tasks
}

fn sort_newest_first(tasks: &mut [TaskRecord]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

type ValidatedAttachments = (
    super::types::PlanTier,
    super::types::AttachmentMeta,
    super::types::AttachmentMeta,
);

fn validate_draft(draft: &TaskDraft) -> Result<ValidatedAttachments, PortalError> {
    let text_fields_present = !draft.name.trim().is_empty()
        && !draft.mobile.trim().is_empty()
        && !draft.address.trim().is_empty()
        && !draft.initial_password.trim().is_empty();

    let (plan, photo, document) = match (draft.plan, &draft.photo, &draft.document) {
        (Some(plan), Some(photo), Some(document)) if text_fields_present => {
            (plan, photo.clone(), document.clone())
        }
        _ => {
            return Err(PortalError::validation(
                "Please fill all details and upload files. KYC is mandatory!",
            ))
        }
    };

    if draft.mobile.len() != 10 || !draft.mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(PortalError::validation("Mobile number must be 10 digits."));
    }

    for attachment in [&photo, &document] {
        if attachment.oversized() {
            return Err(PortalError::SizeLimit {
                file_name: attachment.file_name.clone(),
                size_bytes: attachment.size_bytes,
            });
        }
    }

    Ok((plan, photo, document))
}
