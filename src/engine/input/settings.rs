// Input subsystem settings
//
// Host-level knobs that are not part of any player's bindings. Loaded from an
// optional JSON file; every field falls back to its default when absent.

use super::capture::DEFAULT_CAPTURE_DEAD_ZONE;
use super::kind::{DeviceClass, MAX_PLAYERS};
use super::InputError;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default settings file name, looked up in the working directory
pub const SETTINGS_FILE: &str = "input_settings.json";

const DEFAULT_CONFIG_DIR: &str = "config/input";
const DEFAULT_PRESENCE_POLL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Directory holding the persisted `player<n>_<class>.json` files
    pub config_dir: PathBuf,

    /// Device class each player starts with, before gamepad assignment
    pub default_classes: [DeviceClass; MAX_PLAYERS],

    /// How often the host polls gamepad presence
    pub presence_poll_ms: u64,

    /// Dead zone used by the default rebind capture filter
    pub capture_dead_zone: f32,

    /// Switch players 1..N to gamepad when N pads are present at startup
    pub assign_gamepads_on_startup: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            default_classes: [DeviceClass::Keyboard; MAX_PLAYERS],
            presence_poll_ms: DEFAULT_PRESENCE_POLL_MS,
            capture_dead_zone: DEFAULT_CAPTURE_DEAD_ZONE,
            assign_gamepads_on_startup: true,
        }
    }
}

impl InputSettings {
    /// Load from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, InputError> {
        if !path.exists() {
            info!("No {} found, using default input settings", path.display());
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path).map_err(|e| {
            InputError::StoreUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings: Self = serde_json::from_slice(&bytes)?;
        info!("Loaded input settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), InputError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(|e| {
            InputError::StoreUnavailable(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    pub fn presence_poll_period(&self) -> Duration {
        Duration::from_millis(self.presence_poll_ms)
    }
}
