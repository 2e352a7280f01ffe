//! In-memory implementation of RemoteCollections
//!
//! Stands in for the remote database when no credentials are configured and
//! in tests. Writes are committed under one lock and the resulting change
//! batch is sent to every subscriber before the lock is released, so
//! subscribers observe commits in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use servis_api::{ApiError, Change, ChangeBatch, ChangeStream, DocumentId, Fields, RemoteCollections};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

type Subscriber = mpsc::UnboundedSender<Result<ChangeBatch, ApiError>>;

/// One write of an atomic batch commit
#[derive(Debug, Clone)]
pub enum Write {
    Add { fields: Fields },
    Update { id: DocumentId, fields: Fields },
    Delete { id: DocumentId },
}

#[derive(Default)]
struct MemoryCollection {
    /// Documents in creation order
    documents: Vec<(DocumentId, Fields)>,
    subscribers: Vec<Subscriber>,
}

impl MemoryCollection {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|(doc_id, _)| doc_id == id)
    }

    /// Send a batch to all subscribers, dropping the ones that went away
    fn notify(&mut self, batch: ChangeBatch) {
        self.subscribers.retain(|tx| tx.send(Ok(batch.clone())).is_ok());
    }
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<String, MemoryCollection>,
    /// Counter for deterministic id generation
    next_id_counter: u64,
}

/// HashMap-backed document collections with change subscriptions.
///
/// # Example
///
/// ```rust,no_run
/// use servis::MemoryCollections;
/// use servis_api::RemoteCollections;
///
/// async fn example() -> Result<(), servis_api::ApiError> {
///     let remote = MemoryCollections::deterministic();
///     let id = remote.add_document("korisnici", Default::default()).await?;
///     assert_eq!(id, "doc-1");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MemoryCollections {
    state: Arc<Mutex<MemoryState>>,
    deterministic_ids: bool,
}

impl Default for MemoryCollections {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCollections {
    /// Collections assigning random 20-character ids
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            deterministic_ids: false,
        }
    }

    /// Collections assigning `doc-1`, `doc-2`, ... so test runs are reproducible
    pub fn deterministic() -> Self {
        Self {
            deterministic_ids: true,
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a panic elsewhere; the map itself stays consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn generate_id(&self, state: &mut MemoryState) -> DocumentId {
        state.next_id_counter += 1;
        if self.deterministic_ids {
            format!("doc-{}", state.next_id_counter)
        } else {
            uuid::Uuid::new_v4().simple().to_string()[..20].to_string()
        }
    }

    /// Apply several writes atomically and notify them as one change batch
    pub fn commit_batch(&self, collection: &str, writes: Vec<Write>) -> Result<Vec<DocumentId>, ApiError> {
        let mut state = self.lock();
        let mut created = Vec::new();
        let mut changes = Vec::with_capacity(writes.len());

        // Validate updates before touching anything
        {
            let coll = state.collections.entry(collection.to_string()).or_default();
            for write in &writes {
                if let Write::Update { id, .. } = write {
                    if coll.position(id).is_none() {
                        return Err(ApiError::DocumentNotFound {
                            collection: collection.to_string(),
                            id: id.clone(),
                        });
                    }
                }
            }
        }

        for write in writes {
            match write {
                Write::Add { fields } => {
                    let id = self.generate_id(&mut state);
                    let coll = state.collections.entry(collection.to_string()).or_default();
                    coll.documents.push((id.clone(), fields.clone()));
                    changes.push(Change::Added {
                        id: id.clone(),
                        fields,
                    });
                    created.push(id);
                }
                Write::Update { id, fields } => {
                    let coll = state.collections.entry(collection.to_string()).or_default();
                    if let Some(pos) = coll.position(&id) {
                        let doc = &mut coll.documents[pos].1;
                        doc.extend(fields);
                        changes.push(Change::Modified {
                            id,
                            fields: doc.clone(),
                        });
                    }
                }
                Write::Delete { id } => {
                    let coll = state.collections.entry(collection.to_string()).or_default();
                    if let Some(pos) = coll.position(&id) {
                        coll.documents.remove(pos);
                        changes.push(Change::Removed { id });
                    }
                }
            }
        }

        debug!(
            "[MemoryCollections] Committed {} changes to {}",
            changes.len(),
            collection
        );
        if !changes.is_empty() {
            let coll = state.collections.entry(collection.to_string()).or_default();
            coll.notify(ChangeBatch::new(changes));
        }
        Ok(created)
    }

    /// Number of documents currently stored in a collection
    pub fn document_count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteCollections for MemoryCollections {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentId, ApiError> {
        let mut ids = self.commit_batch(collection, vec![Write::Add { fields }])?;
        ids.pop().ok_or_else(|| ApiError::InternalError {
            message: "add produced no document id".to_string(),
        })
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), ApiError> {
        self.commit_batch(
            collection,
            vec![Write::Update {
                id: id.to_string(),
                fields,
            }],
        )?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        self.commit_batch(collection, vec![Write::Delete { id: id.to_string() }])?;
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Fields, ApiError> {
        let state = self.lock();
        state
            .collections
            .get(collection)
            .and_then(|c| c.position(id).map(|pos| c.documents[pos].1.clone()))
            .ok_or_else(|| ApiError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, ApiError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let coll = state.collections.entry(collection.to_string()).or_default();

        // Initial snapshot goes out first, under the same lock as later commits
        let snapshot = coll
            .documents
            .iter()
            .map(|(id, fields)| Change::Added {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();
        let _ = tx.send(Ok(ChangeBatch::new(snapshot)));
        coll.subscribers.push(tx);

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servis_api::Value;
    use tokio_stream::StreamExt;

    fn customer(ime: &str) -> Fields {
        Fields::from([("ime".to_string(), Value::from(ime))])
    }

    #[tokio::test]
    async fn subscription_starts_with_snapshot() {
        let remote = MemoryCollections::deterministic();
        remote.add_document("korisnici", customer("Ana")).await.unwrap();

        let mut stream = remote.subscribe("korisnici").await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(
            first.items,
            vec![Change::Added {
                id: "doc-1".into(),
                fields: customer("Ana")
            }]
        );

        remote.delete_document("korisnici", "doc-1").await.unwrap();
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.items, vec![Change::Removed { id: "doc-1".into() }]);
    }

    #[tokio::test]
    async fn empty_collection_yields_empty_first_batch() {
        let remote = MemoryCollections::deterministic();
        let mut stream = remote.subscribe("vozila").await.unwrap();
        assert!(stream.next().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_patches_fields_and_reports_full_document() {
        let remote = MemoryCollections::deterministic();
        let id = remote.add_document("korisnici", customer("Ana")).await.unwrap();
        let mut stream = remote.subscribe("korisnici").await.unwrap();
        let _snapshot = stream.next().await;

        let patch = Fields::from([("telefon".to_string(), Value::from("065"))]);
        remote.update_document("korisnici", &id, patch).await.unwrap();

        let batch = stream.next().await.unwrap().unwrap();
        let Change::Modified { fields, .. } = &batch.items[0] else {
            panic!("expected MODIFIED, got {:?}", batch.items[0]);
        };
        assert_eq!(fields.get("ime"), Some(&Value::from("Ana")));
        assert_eq!(fields.get("telefon"), Some(&Value::from("065")));
    }

    #[tokio::test]
    async fn update_of_missing_document_fails_and_delete_does_not() {
        let remote = MemoryCollections::deterministic();
        let err = remote
            .update_document("korisnici", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DocumentNotFound { .. }));
        remote.delete_document("korisnici", "nope").await.unwrap();
        assert!(remote.get_document("korisnici", "nope").await.is_err());
    }

    #[tokio::test]
    async fn batch_commit_is_delivered_as_one_batch() {
        let remote = MemoryCollections::deterministic();
        let mut stream = remote.subscribe("korisnici").await.unwrap();
        let _snapshot = stream.next().await;

        let ids = remote
            .commit_batch(
                "korisnici",
                vec![
                    Write::Add { fields: customer("Ana") },
                    Write::Add { fields: customer("Bojan") },
                    Write::Delete { id: "doc-1".into() },
                ],
            )
            .unwrap();
        assert_eq!(ids, vec!["doc-1".to_string(), "doc-2".to_string()]);

        let batch = stream.next().await.unwrap().unwrap();
        let kinds: Vec<_> = batch.items.iter().map(Change::kind_name).collect();
        assert_eq!(kinds, vec!["ADDED", "ADDED", "REMOVED"]);
        assert_eq!(remote.document_count("korisnici"), 1);
    }

    #[tokio::test]
    async fn random_ids_are_twenty_characters() {
        let remote = MemoryCollections::new();
        let id = remote.add_document("servisi", Fields::new()).await.unwrap();
        assert_eq!(id.len(), 20);
    }
}
