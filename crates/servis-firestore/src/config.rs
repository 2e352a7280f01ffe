//! Connection settings read from the credentials file and the environment

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Bearer token override, for tokens minted outside the application
pub const ACCESS_TOKEN_ENV: &str = "FIRESTORE_ACCESS_TOKEN";
/// `host:port` of a local Firestore emulator
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The parts of a service account credentials file this crate reads
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub project_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub access_token: Option<String>,
    pub emulator_host: Option<String>,
    pub poll_interval: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            access_token: None,
            emulator_host: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Settings for the project named in a credentials file, with
    /// `FIRESTORE_ACCESS_TOKEN` and `FIRESTORE_EMULATOR_HOST` applied
    pub fn from_credentials_file(path: &Path) -> Result<Self> {
        let credentials = Credentials::load(path)?;
        let mut config = Self::new(credentials.project_id);
        config.access_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .or(credentials.access_token)
            .filter(|t| !t.is_empty());
        config.emulator_host = std::env::var(EMULATOR_HOST_ENV).ok().filter(|h| !h.is_empty());
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Root URL of the documents resource
    pub fn documents_url(&self) -> String {
        let host = match &self.emulator_host {
            Some(host) => format!("http://{}", host),
            None => "https://firestore.googleapis.com".to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            host, self.project_id, self.database
        )
    }
}
