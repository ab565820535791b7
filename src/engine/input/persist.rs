// Registry persistence
//
// One serialized registry per (player, device class) pair, stored under the
// key `player<n>_<Keyboard|Gamepad>`. The store is a byte-level collaborator;
// encoding is JSON through serde.

use super::axis::AxisDefinition;
use super::kind::{DeviceClass, PlayerId};
use super::registry::PlayerAxisRegistry;
use super::InputError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File extension used by `FileConfigStore`
pub const CONFIG_EXTENSION: &str = "json";

/// Storage key of one persisted registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub player: PlayerId,
    pub class: DeviceClass,
}

impl ConfigKey {
    pub fn new(player: PlayerId, class: DeviceClass) -> Self {
        Self { player, class }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}_{}", self.player.number(), self.class)
    }
}

/// Byte store for persisted registries
pub trait ConfigStore {
    /// `Ok(None)` when nothing is stored under `key`
    fn read(&self, key: ConfigKey) -> Result<Option<Vec<u8>>, InputError>;

    fn write(&mut self, key: ConfigKey, bytes: &[u8]) -> Result<(), InputError>;

    fn contains(&self, key: ConfigKey) -> bool {
        matches!(self.read(key), Ok(Some(_)))
    }
}

/// In-memory store, used by tests and as a fallback when no directory is set
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: HashMap<ConfigKey, Vec<u8>>,
    unavailable: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backing store
    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self, key: ConfigKey) -> Result<(), InputError> {
        if self.unavailable {
            return Err(InputError::StoreUnavailable(format!("{key}: store offline")));
        }
        Ok(())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self, key: ConfigKey) -> Result<Option<Vec<u8>>, InputError> {
        self.check(key)?;
        Ok(self.entries.get(&key).cloned())
    }

    fn write(&mut self, key: ConfigKey, bytes: &[u8]) -> Result<(), InputError> {
        self.check(key)?;
        self.entries.insert(key, bytes.to_vec());
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per registry in a directory
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    base_path: PathBuf,
}

impl FileConfigStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Full path of the file backing `key`
    pub fn resolve_path(&self, key: ConfigKey) -> PathBuf {
        self.base_path
            .join(format!("{key}"))
            .with_extension(CONFIG_EXTENSION)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl ConfigStore for FileConfigStore {
    fn read(&self, key: ConfigKey) -> Result<Option<Vec<u8>>, InputError> {
        let path = self.resolve_path(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read(&path).map(Some).map_err(|e| {
            InputError::StoreUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    fn write(&mut self, key: ConfigKey, bytes: &[u8]) -> Result<(), InputError> {
        let path = self.resolve_path(key);
        std::fs::create_dir_all(&self.base_path)
            .and_then(|_| std::fs::write(&path, bytes))
            .map_err(|e| {
                InputError::StoreUnavailable(format!("Failed to write {}: {}", path.display(), e))
            })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn contains(&self, key: ConfigKey) -> bool {
        self.resolve_path(key).is_file()
    }
}

/// Serialized form of a registry
#[derive(Debug, Serialize, Deserialize)]
struct RegistryDocument {
    name: String,
    axes: Vec<AxisDefinition>,
}

/// Encode a registry as pretty JSON, channels sorted by name
pub fn encode_registry(registry: &PlayerAxisRegistry) -> Result<Vec<u8>, InputError> {
    let document = RegistryDocument {
        name: registry.name().to_string(),
        axes: registry.definitions(),
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Decode a registry, validating every channel
pub fn decode_registry(bytes: &[u8], now: Instant) -> Result<PlayerAxisRegistry, InputError> {
    let document: RegistryDocument = serde_json::from_slice(bytes)?;
    for axis in &document.axes {
        axis.validate()?;
    }
    PlayerAxisRegistry::from_definitions(document.name, document.axes, now)
}
