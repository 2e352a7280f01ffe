//! Error type of the synchronization core and the application context

use std::path::PathBuf;

use servis_api::{ApiError, RecordKind};

pub type Result<T> = std::result::Result<T, ServisError>;

#[derive(Debug, thiserror::Error)]
pub enum ServisError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Malformed timestamp {value:?}: expected \"yyyy-MM-dd HH:mm:ss\"")]
    MalformedTimestamp { value: String },

    #[error("Invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// An action needs a selected row first. `message` is the warning shown to the user.
    #[error("{message}")]
    SelectionRequired {
        kind: RecordKind,
        message: &'static str,
    },

    #[error("Row {row} out of range for {kind} ({len} rows)")]
    RowOutOfRange {
        kind: RecordKind,
        row: usize,
        len: usize,
    },

    #[error("Column {column} out of range for {kind}")]
    ColumnOutOfRange { kind: RecordKind, column: usize },

    #[error("{kind} records cannot be created through the entry form")]
    UnsupportedEntryKind { kind: RecordKind },

    #[error("Failed to access settings file {}: {source}", path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", path.display())]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ServisError {
    /// Whether the error is a user-facing warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(self, ServisError::SelectionRequired { .. })
    }
}
