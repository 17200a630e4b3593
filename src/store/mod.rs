// Document store seam
//
// The portal engine never talks to a concrete cloud store; it is handed a
// capability set of create/merge/subscribe. Tests and the demo binary inject
// the in-memory implementation.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::errors::PortalError;

pub use memory::MemoryStore;

/// A stored document: store-assigned id plus a JSON object payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub data: serde_json::Value,
}

/// Full point-in-time copy of a collection. The store gives no ordering
/// guarantee; consumers re-sort on every delivery.
pub type Snapshot = Vec<RawDocument>;

/// External document database collaborator.
///
/// Mirrors the shape of a cloud document store: documents are schemaless
/// JSON objects in named collections, merges are shallow partial updates
/// with last-write-wins semantics, and subscriptions push the full current
/// snapshot on every change.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document, returning its store-assigned identifier.
    async fn create(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> Result<String, PortalError>;

    /// Shallow-merge `partial` into an existing document. Fields absent from
    /// `partial` are left untouched.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> Result<(), PortalError>;

    /// Subscribe to a collection: the current snapshot immediately, then a
    /// fresh snapshot on every subsequent change.
    fn subscribe(&self, collection: &str) -> (Snapshot, broadcast::Receiver<Snapshot>);
}
