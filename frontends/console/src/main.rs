use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use servis::settings::SettingsStore;
use servis_console::{LaunchConfig, run_app};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "stefan-pos.log";

/// Application logs go to a file next to the settings file
fn init_logging(settings_path: &Path) {
    let log_file_path = match settings_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            dir.join(LOG_FILE)
        }
        None => PathBuf::from(LOG_FILE),
    };

    // Default to INFO level, can be overridden with RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match OpenOptions::new().create(true).append(true).open(&log_file_path) {
        Ok(log_file) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(log_file).with_ansi(false))
            .init(),
        Err(e) => {
            eprintln!(
                "Warning: Could not open log file {:?} ({}), logging to stderr",
                log_file_path, e
            );
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = LaunchConfig::from_args(std::env::args().skip(1))
        .map_err(|e| miette::miette!("{:#}", e))?;
    let settings_path = config
        .settings_path
        .clone()
        .unwrap_or_else(SettingsStore::default_path);
    init_logging(&settings_path);

    run_app(config, settings_path)
        .await
        .map_err(|e| miette::miette!("{:#}", e))
}
