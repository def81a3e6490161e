use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::bluesky::client::DEFAULT_SERVICE_URL;
use crate::output::export::ExportFormat;
use crate::scoring::verdict::{ClassifierMode, Thresholds};

/// Credentials and endpoints loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded
/// automatically at startup via dotenvy.
pub struct Config {
    pub bluesky_handle: String,
    /// App password, not the account password.
    pub bluesky_app_password: String,
    /// PDS or entryway used for login and all XRPC calls.
    pub service_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            bluesky_handle: env::var("BLUESKY_HANDLE").unwrap_or_default(),
            bluesky_app_password: env::var("BLUESKY_APP_PASSWORD").unwrap_or_default(),
            service_url: env::var("SKYSWEEP_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string()),
        })
    }

    /// Check that login credentials are configured.
    /// Every command acts on an authenticated session.
    pub fn require_auth(&self) -> Result<()> {
        if self.bluesky_handle.is_empty() {
            anyhow::bail!(
                "BLUESKY_HANDLE not set. Add it to your .env file\n\
                 (BLUESKY_HANDLE=you.bsky.social)."
            );
        }
        if self.bluesky_app_password.is_empty() {
            anyhow::bail!(
                "BLUESKY_APP_PASSWORD not set. Generate an app password at\n\
                 https://bsky.app/settings (App Passwords) and add it to your .env file."
            );
        }
        Ok(())
    }
}

/// What to do with a matched profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanAction {
    /// Log only; nothing is blocked.
    #[default]
    Review,
    /// Log what would be blocked.
    Simulate,
    /// Block matches, up to `max_blocks`.
    AutoBlock,
}

/// Immutable settings for one follower scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub action: ScanAction,
    pub mode: ClassifierMode,
    pub thresholds: Thresholds,
    /// Scan this account's followers instead of the session account's.
    pub target: Option<String>,
    /// Follower pages to walk (100 per page). 0 walks all of them.
    pub pages: usize,
    /// Pause after each profile lookup.
    pub profile_delay: Duration,
    /// Pause after each successful block.
    pub block_delay: Duration,
    pub max_blocks: usize,
    pub export: Option<ExportFormat>,
    pub export_path: Option<PathBuf>,
    /// Print a metrics line for every profile.
    pub verbose: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            action: ScanAction::Review,
            mode: ClassifierMode::BotOnly,
            thresholds: Thresholds::default(),
            target: None,
            pages: 0,
            profile_delay: Duration::from_millis(100),
            block_delay: Duration::from_millis(400),
            max_blocks: 25,
            export: None,
            export_path: None,
            verbose: false,
        }
    }
}
