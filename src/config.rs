//! Tuning knobs for backend autodetection.
//!
//! Defaults reproduce the full cascade: try memory first, then a memory map,
//! then a stream. Configuration can come from code, from environment variables,
//! or (with the `config` feature) from a TOML file.

use crate::binary::validation::MAX_BUFFER_LEN;
#[cfg(feature = "config")]
use crate::error::{BinaryError, Result};
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Environment variable overriding [`BinaryFileConfig::max_in_memory_len`]
pub const ENV_MAX_IN_MEMORY: &str = "BINFILE_MAX_IN_MEMORY";

/// Environment variable that disables memory mapping when set to a truthy value
pub const ENV_NO_MMAP: &str = "BINFILE_NO_MMAP";

/// Settings consulted when [`BinaryFile`](crate::binary::BinaryFile) opens a path
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BinaryFileConfig {
    /// Largest file loaded fully into memory; larger files skip straight to
    /// memory mapping
    pub max_in_memory_len: u64,

    /// Whether the memory-mapping step of the cascade is attempted at all
    pub memory_map: bool,
}

impl Default for BinaryFileConfig {
    fn default() -> Self {
        Self {
            max_in_memory_len: MAX_BUFFER_LEN,
            memory_map: true,
        }
    }
}

impl BinaryFileConfig {
    /// Apply `BINFILE_MAX_IN_MEMORY` and `BINFILE_NO_MMAP` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_MAX_IN_MEMORY) {
            match value.trim().parse::<u64>() {
                Ok(limit) => self.max_in_memory_len = limit,
                Err(e) => log::warn!("Ignoring {ENV_MAX_IN_MEMORY}={value:?}: {e}"),
            }
        }

        if let Some(value) = lookup(ENV_NO_MMAP) {
            let value = value.trim().to_ascii_lowercase();
            self.memory_map = matches!(value.as_str(), "" | "0" | "false" | "no" | "off");
        }

        self
    }
}

#[cfg(feature = "config")]
impl BinaryFileConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BinaryError::config(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BinaryError::file_error(format!("Failed to read config file: {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// `<config dir>/binfile/config.toml`, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("binfile").join("config.toml"))
    }

    /// Load the per-user config file, falling back to defaults when it is absent
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
}
