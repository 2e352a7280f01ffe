use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use servis::settings::{Settings, SettingsStore};
use servis::{AppContext, MemoryCollections, RemoteCollections};
use servis_firestore::{FirestoreCollections, FirestoreConfig};
use tokio::io::BufReader;
use tracing::info;

use crate::app_main::ConsoleApp;
use crate::config::LaunchConfig;
use crate::prompt::ConsoleIo;

/// Remote collections for this launch: Firestore when credentials are
/// configured, in-memory collections otherwise
pub fn build_remote(config: &LaunchConfig, settings: &Settings) -> Result<Arc<dyn RemoteCollections>> {
    match settings.credentials_path() {
        Some(path) if !config.memory => {
            let mut firestore = FirestoreConfig::from_credentials_file(path)?;
            if let Some(interval) = config.poll_interval {
                firestore = firestore.with_poll_interval(interval);
            }
            Ok(Arc::new(FirestoreCollections::new(&firestore)?))
        }
        _ => {
            info!("[Launcher] Using in-memory collections");
            Ok(Arc::new(MemoryCollections::new()))
        }
    }
}

pub async fn run_app(config: LaunchConfig, settings_path: PathBuf) -> Result<()> {
    let settings = SettingsStore::load(settings_path)?;
    info!("[Launcher] Settings from {}", settings.path().display());

    let remote = build_remote(&config, settings.settings())?;
    let app = AppContext::new(remote, settings);
    let feed = app.subscribe().await?;

    let io = ConsoleIo::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    ConsoleApp::new(app, io).run(feed).await
}
