//! Merged change notifications of every record collection
//!
//! Each collection subscription delivers its batches in commit order. The feed
//! merges them into one keyed stream with a single consumer, so batches of one
//! collection are never reordered or applied concurrently.

use futures::FutureExt;
use servis_api::{ApiError, ChangeBatch, RecordKind, RemoteCollections};
use tokio_stream::{StreamExt, StreamMap};
use tracing::info;

use crate::error::Result;

pub struct ChangeFeed {
    streams: StreamMap<RecordKind, servis_api::ChangeStream>,
}

impl ChangeFeed {
    /// Subscribe to the collection of every record kind
    pub async fn subscribe(remote: &dyn RemoteCollections) -> Result<Self> {
        let mut streams = StreamMap::new();
        for kind in RecordKind::ALL {
            let stream = remote.subscribe(kind.collection()).await?;
            streams.insert(kind, stream);
            info!("[ChangeFeed] Subscribed to {}", kind.collection());
        }
        Ok(Self { streams })
    }

    /// Wait for the next batch of any collection.
    ///
    /// Returns `None` once every subscription has ended.
    pub async fn next(&mut self) -> Option<(RecordKind, std::result::Result<ChangeBatch, ApiError>)> {
        self.streams.next().await
    }

    /// Take the next batch if one is already queued
    pub fn try_next(
        &mut self,
    ) -> Option<(RecordKind, std::result::Result<ChangeBatch, ApiError>)> {
        self.streams.next().now_or_never().flatten()
    }

    pub fn is_closed(&self) -> bool {
        self.streams.is_empty()
    }
}
