//! RemoteCollections over the Firestore REST API
//!
//! The REST API has no push channel, so each subscription runs a polling task:
//! - The first poll emits the whole collection as ADDED entries, even when empty
//! - Later polls are diffed against the previous snapshot; empty diffs are skipped
//! - The task ends when the subscriber drops its stream

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use servis_api::{ApiError, Change, ChangeBatch, ChangeStream, DocumentId, Fields, RemoteCollections};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::client::FirestoreClient;
use crate::config::FirestoreConfig;
use crate::models::FirestoreDocument;

/// Documents of one collection in listing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    docs: Vec<(DocumentId, Fields)>,
}

impl Snapshot {
    pub fn new(docs: Vec<(DocumentId, Fields)>) -> Self {
        Self { docs }
    }

    pub fn from_documents(documents: &[FirestoreDocument]) -> Self {
        Self::new(
            documents
                .iter()
                .map(|doc| (doc.id().to_string(), doc.decoded_fields()))
                .collect(),
        )
    }

    pub fn docs(&self) -> &[(DocumentId, Fields)] {
        &self.docs
    }

    /// Every document as ADDED
    pub fn initial_batch(&self) -> ChangeBatch {
        ChangeBatch::new(
            self.docs
                .iter()
                .map(|(id, fields)| Change::Added {
                    id: id.clone(),
                    fields: fields.clone(),
                })
                .collect(),
        )
    }
}

/// Changes turning `previous` into `current`: removals first, then additions
/// and modifications in `current` order
pub fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> ChangeBatch {
    let before: HashMap<&str, &Fields> = previous
        .docs
        .iter()
        .map(|(id, fields)| (id.as_str(), fields))
        .collect();
    let after: HashMap<&str, &Fields> = current
        .docs
        .iter()
        .map(|(id, fields)| (id.as_str(), fields))
        .collect();

    let removed = previous
        .docs
        .iter()
        .filter(|(id, _)| !after.contains_key(id.as_str()))
        .map(|(id, _)| Change::Removed { id: id.clone() });

    let upserted = current
        .docs
        .iter()
        .filter_map(|(id, fields)| match before.get(id.as_str()) {
            None => Some(Change::Added {
                id: id.clone(),
                fields: fields.clone(),
            }),
            Some(old) if *old != fields => Some(Change::Modified {
                id: id.clone(),
                fields: fields.clone(),
            }),
            Some(_) => None,
        });

    ChangeBatch::new(removed.chain(upserted).collect())
}

/// Full listings of a collection, as polled by subscriptions
#[async_trait]
pub trait CollectionLister: Send + Sync {
    async fn list_snapshot(&self, collection: &str) -> anyhow::Result<Snapshot>;
}

#[async_trait]
impl CollectionLister for FirestoreClient {
    async fn list_snapshot(&self, collection: &str) -> anyhow::Result<Snapshot> {
        let documents = self.list_documents(collection).await?;
        Ok(Snapshot::from_documents(&documents))
    }
}

fn network_error(e: anyhow::Error) -> ApiError {
    ApiError::NetworkError {
        message: format!("{:#}", e),
    }
}

pub struct FirestoreCollections {
    client: Arc<FirestoreClient>,
    poll_interval: Duration,
}

impl FirestoreCollections {
    pub fn new(config: &FirestoreConfig) -> anyhow::Result<Self> {
        info!(
            "[FirestoreCollections] Connecting to project {} (emulator: {})",
            config.project_id,
            config.emulator_host.as_deref().unwrap_or("none")
        );
        Ok(Self {
            client: Arc::new(FirestoreClient::new(config)?),
            poll_interval: config.poll_interval,
        })
    }
}

#[async_trait]
impl RemoteCollections for FirestoreCollections {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentId, ApiError> {
        let doc = self
            .client
            .create_document(collection, &fields)
            .await
            .map_err(network_error)?;
        Ok(doc.id().to_string())
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), ApiError> {
        self.client
            .patch_document(collection, id, &fields)
            .await
            .map_err(network_error)?
            .map(|_| ())
            .ok_or_else(|| ApiError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        self.client
            .delete_document(collection, id)
            .await
            .map_err(network_error)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Fields, ApiError> {
        self.client
            .get_document(collection, id)
            .await
            .map_err(network_error)?
            .map(|doc| doc.decoded_fields())
            .ok_or_else(|| ApiError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn subscribe(&self, collection: &str) -> Result<ChangeStream, ApiError> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(poll_collection(
            self.client.clone(),
            collection.to_string(),
            self.poll_interval,
            tx,
        ));
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[tracing::instrument(name = "firestore.poll", skip(lister, tx))]
async fn poll_collection(
    lister: Arc<dyn CollectionLister>,
    collection: String,
    interval: Duration,
    tx: mpsc::UnboundedSender<Result<ChangeBatch, ApiError>>,
) {
    let mut known: Option<Snapshot> = None;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tx.closed() => break,
        }

        let batch = match lister.list_snapshot(&collection).await {
            Ok(current) => {
                let batch = match &known {
                    None => current.initial_batch(),
                    Some(previous) => diff_snapshots(previous, &current),
                };
                let first = known.is_none();
                known = Some(current);
                if !first && batch.is_empty() {
                    continue;
                }
                debug!(
                    "[FirestoreCollections] {} changes in {}",
                    batch.len(),
                    collection
                );
                Ok(batch)
            }
            Err(e) => {
                warn!("[FirestoreCollections] Polling {} failed: {:#}", collection, e);
                Err(network_error(e))
            }
        };

        if tx.send(batch).is_err() {
            break;
        }
    }
    debug!("[FirestoreCollections] Subscription to {} ended", collection);
}
