//! Signal files shared with the external extraction agent.
//!
//! Two tiny files coordinate the two processes: a scan-trigger file the
//! core writes when a manual scan is requested (the agent watches for
//! it and consumes it), and a heartbeat file the agent touches while
//! running so the core can report whether it is alive.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Local;

use scout_core::error::Result;

/// Handles to the trigger and heartbeat files.
pub struct SignalFiles {
    trigger: PathBuf,
    heartbeat: PathBuf,
}

impl SignalFiles {
    pub fn new(trigger: &Path, heartbeat: &Path) -> Self {
        Self {
            trigger: trigger.to_path_buf(),
            heartbeat: heartbeat.to_path_buf(),
        }
    }

    /// Request an agent-side scan by writing the trigger file.
    ///
    /// The content is the request time; the agent deletes the file when
    /// it picks the request up.
    pub fn request_scan(&self) -> Result<()> {
        if let Some(parent) = self.trigger.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.trigger, Local::now().to_rfc3339())?;
        Ok(())
    }

    /// Whether a scan request is still waiting for pickup.
    pub fn scan_requested(&self) -> bool {
        self.trigger.exists()
    }

    /// Whether the external agent has touched its heartbeat recently.
    pub fn companion_alive(&self, max_age: Duration) -> bool {
        let Ok(meta) = std::fs::metadata(&self.heartbeat) else {
            return false;
        };
        match meta.modified() {
            Ok(modified) => match SystemTime::now().duration_since(modified) {
                Ok(age) => age <= max_age,
                // Heartbeat from the future (clock skew) still counts.
                Err(_) => true,
            },
            Err(_) => false,
        }
    }
}
