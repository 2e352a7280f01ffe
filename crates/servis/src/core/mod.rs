//! Record Synchronization Core
//!
//! - `table`: ordered in-memory rows with a fixed column schema
//! - `table_sync`: applies remote change batches and propagates confirmed local edits
//! - `feed`: merged, ordered change notifications of all collections
//! - `field_mapping` / `timestamp`: header and date/time translation

pub mod feed;
pub mod field_mapping;
pub mod table;
pub mod table_sync;
pub mod timestamp;

pub use feed::ChangeFeed;
pub use table::{Column, RecordTable, Row};
pub use table_sync::{EditOutcome, TableSync};
