//! Runtime configuration, read from a TOML file such as `parley.toml`:
//!
//! ```toml
//! [runtime]
//! version = "1.1"
//! status-variable = "system.entityToResolve"
//!
//! [display.ADDRESS]
//! subfields = ["street", "city"]
//! ```

use crate::error::ConfigError;
use parley_resolution::{DisplayDescriptor, DisplayRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Variable that carries the resolution status between turns.
pub const DEFAULT_STATUS_VARIABLE: &str = "system.entityToResolve";

/// Version reported by `list_metadata`.
pub const DEFAULT_RUNTIME_VERSION: &str = "1.1";

fn default_version() -> String {
    DEFAULT_RUNTIME_VERSION.to_string()
}

fn default_status_variable() -> String {
    DEFAULT_STATUS_VARIABLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeSection {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_status_variable")]
    pub status_variable: String,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            status_variable: default_status_variable(),
        }
    }
}

/// Display descriptor override for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySection {
    pub subfields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub display: BTreeMap<String, DisplaySection>,
}

impl RuntimeConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses `path`, surfacing any error.
    pub fn try_load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from `path`.
    /// A missing, unreadable or malformed file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No runtime config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded runtime config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load runtime config {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    pub fn version(&self) -> &str {
        &self.runtime.version
    }

    pub fn status_variable(&self) -> &str {
        &self.runtime.status_variable
    }

    /// Built-in display descriptors with configured overrides applied.
    pub fn display_registry(&self) -> DisplayRegistry {
        let mut registry = DisplayRegistry::with_builtins();
        for (type_ref, section) in &self.display {
            registry.register(
                type_ref.as_str(),
                DisplayDescriptor::new(section.subfields.iter().cloned()),
            );
        }
        registry
    }
}
