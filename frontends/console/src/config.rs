use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Launch options from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Settings file; the per-user default when absent
    pub settings_path: Option<PathBuf>,
    /// Use in-memory collections even when credentials are configured
    pub memory: bool,
    /// Poll interval of remote subscriptions
    pub poll_interval: Option<Duration>,
}

impl LaunchConfig {
    /// Parse `--settings <path>`, `--memory` and `--poll-ms <millis>`
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" | "-s" => {
                    let path = args.next().context("--settings needs a path")?;
                    config.settings_path = Some(PathBuf::from(path));
                }
                "--memory" | "-m" => config.memory = true,
                "--poll-ms" => {
                    let millis = args.next().context("--poll-ms needs a value")?;
                    let millis: u64 = millis
                        .parse()
                        .with_context(|| format!("Invalid --poll-ms value {:?}", millis))?;
                    config.poll_interval = Some(Duration::from_millis(millis.max(1)));
                }
                other => bail!("Unknown argument {:?}", other),
            }
        }
        Ok(config)
    }
}
