use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ScoutError};
use crate::types::UserProfile;

/// Top-level configuration for the scout application.
///
/// Loaded from `~/.scout/config.toml` by default. Each section covers
/// one subsystem or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScoutConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does
    /// not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the task store, ledger, and queue.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.scout/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Identity of the tracked person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Full name as it appears in messages.
    pub full_name: String,
    /// Mailbox address, used to recognize self-sent mail.
    pub email: String,
    /// Chat handle, used to recognize self-sent chat messages.
    pub chat_handle: String,
    /// Trusted mail domain; mail from outside it goes to the ingest
    /// queue instead of the deterministic extractor.
    pub internal_domain: String,
    /// Sender substrings whose mail is meeting-notes-bot output and is
    /// always queued for the external agent.
    pub notes_bot_senders: Vec<String>,
}

impl UserConfig {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            chat_handle: self.chat_handle.clone(),
            internal_domain: self.internal_domain.clone(),
        }
    }
}

/// Scan cycle timing and lookback windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minutes between scheduled scan cycles, measured from completion
    /// of the previous cycle.
    pub interval_minutes: u64,
    /// Delay before the first scheduled cycle after startup.
    pub startup_delay_secs: u64,
    /// Bounded wait for each scanner in a cycle; slower scanners are
    /// abandoned, not cancelled.
    pub scanner_timeout_secs: u64,
    /// How far back the mail scanner looks.
    pub mail_lookback_days: i64,
    /// Most recent N mailbox messages examined per cycle.
    pub mail_batch_limit: usize,
    /// Extra minutes of chat lookback on top of the scan interval.
    pub chat_slack_minutes: u64,
    /// How far back the call scanner looks.
    pub call_lookback_hours: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            startup_delay_secs: 10,
            scanner_timeout_secs: 90,
            mail_lookback_days: 2,
            mail_batch_limit: 50,
            chat_slack_minutes: 2,
            call_lookback_hours: 25,
        }
    }
}

/// On-disk artifact names, resolved inside `general.data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub tasks_file: String,
    pub ledger_file: String,
    pub queue_dir: String,
    pub trigger_file: String,
    pub heartbeat_file: String,
    /// Most recent N ledger entries kept; older ones are truncated.
    pub ledger_cap: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_file: "tasks.json".to_string(),
            ledger_file: "processed.json".to_string(),
            queue_dir: "ingest-queue".to_string(),
            trigger_file: ".scan-trigger".to_string(),
            heartbeat_file: ".companion-alive".to_string(),
            ledger_cap: 10_000,
        }
    }
}

impl StorageConfig {
    pub fn tasks_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.tasks_file)
    }

    pub fn ledger_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.ledger_file)
    }

    pub fn queue_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.queue_dir)
    }

    pub fn trigger_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.trigger_file)
    }

    pub fn heartbeat_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.heartbeat_file)
    }
}

/// Daily reminder timer settings (local time).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Hour of the afternoon open-task digest.
    pub digest_hour: u32,
    pub digest_minute: u32,
    /// Hour of the morning due-date check.
    pub due_check_hour: u32,
    pub due_check_minute: u32,
    /// Days-before-due thresholds that trigger a reminder.
    pub due_thresholds: Vec<i64>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            digest_hour: 15,
            digest_minute: 0,
            due_check_hour: 9,
            due_check_minute: 0,
            due_thresholds: vec![10, 5, 3, 1],
        }
    }
}
