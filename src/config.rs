use crate::remote::DebuggingMode;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TERMINAL_ID_PATH: &str = "~/.SAP/ABAPDebugging/terminalId";
pub const DEFAULT_IDLE_REFRESH_SECS: u64 = 60;

/// Per-session settings of the debug bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub mode: DebuggingMode,
    /// Seconds of front end inactivity before the idle refresh probe fires.
    pub idle_refresh_secs: u64,
    /// Where the terminal id is persisted. `~` is expanded.
    pub terminal_id_path: String,
    /// Keep the debuggee halted at program exit.
    pub stop_on_exit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: DebuggingMode::User,
            idle_refresh_secs: DEFAULT_IDLE_REFRESH_SECS,
            terminal_id_path: DEFAULT_TERMINAL_ID_PATH.to_string(),
            stop_on_exit: true,
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn idle_refresh_delay(&self) -> Duration {
        Duration::from_secs(self.idle_refresh_secs)
    }

    pub fn terminal_id_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.terminal_id_path).into_owned())
    }
}
