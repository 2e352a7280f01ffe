//! Firestore backend for servis
//!
//! - `client` - FirestoreClient (REST documents API over reqwest)
//! - `config` - project, token and emulator settings
//! - `models` - wire models and typed value conversion
//! - `firestore_collections` - RemoteCollections with polling subscriptions

pub mod client;
pub mod config;
pub mod firestore_collections;
pub mod models;

pub use client::FirestoreClient;
pub use config::{Credentials, FirestoreConfig};
pub use firestore_collections::{CollectionLister, FirestoreCollections, Snapshot, diff_snapshots};
