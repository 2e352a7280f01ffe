pub mod app;
pub mod confirm;
pub mod core;
pub mod entry;
pub mod error;
pub mod memory_backend;
pub mod presentation;
pub mod settings;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use app::AppContext;
pub use error::{Result, ServisError};
pub use memory_backend::MemoryCollections;

// Shared vocabulary from servis-api
pub use servis_api::{
    ApiError, Change, ChangeBatch, DocumentId, Fields, RecordKind, RemoteCollections, Value,
};
