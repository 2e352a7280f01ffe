use serde::{Deserialize, Serialize};

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::{ApiError, DocumentId, Fields};

/// Change notification for one document of a collection.
///
/// `Added` and `Modified` carry the full field mapping of the document,
/// not just the fields that changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Change {
    /// Document appeared in the collection
    Added { id: DocumentId, fields: Fields },
    /// Document content changed
    Modified { id: DocumentId, fields: Fields },
    /// Document was deleted
    Removed { id: DocumentId },
}

impl Change {
    pub fn id(&self) -> &str {
        match self {
            Change::Added { id, .. } | Change::Modified { id, .. } | Change::Removed { id } => id,
        }
    }

    /// Short tag used in logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Change::Added { .. } => "ADDED",
            Change::Modified { .. } => "MODIFIED",
            Change::Removed { .. } => "REMOVED",
        }
    }
}

/// Group of changes delivered together by a subscription
///
/// Entries are applied in order; a batch may be empty (the initial snapshot
/// of an empty collection).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub type ChangeBatch = Batch<Change>;

/// Ordered change batches of one subscription.
///
/// The stream ends when the backend shuts down; dropping it unsubscribes.
pub type ChangeStream = Pin<Box<dyn Stream<Item = Result<ChangeBatch, ApiError>> + Send>>;

/// Remote document database, one named collection per record kind.
///
/// Writes are fire-and-forget from the table's point of view: their effect on
/// any mirrored table arrives later through `subscribe`, never through the
/// return value.
///
/// # Example
///
/// ```rust,no_run
/// use servis_api::RemoteCollections;
/// use tokio_stream::StreamExt;
///
/// async fn example(remote: &dyn RemoteCollections) -> Result<(), servis_api::ApiError> {
///     let mut stream = remote.subscribe("korisnici").await?;
///     while let Some(batch) = stream.next().await {
///         for change in batch?.items {
///             println!("{} {}", change.kind_name(), change.id());
///         }
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteCollections: Send + Sync {
    /// Create a document and return its server-assigned id
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentId, ApiError>;

    /// Patch the given fields of an existing document (last write wins)
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), ApiError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ApiError>;

    /// Fetch the current fields of a document
    async fn get_document(&self, collection: &str, id: &str) -> Result<Fields, ApiError>;

    /// Subscribe to a collection.
    ///
    /// The first batch lists every existing document as `Change::Added`,
    /// subsequent batches carry changes in commit order.
    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, ApiError>;
}
