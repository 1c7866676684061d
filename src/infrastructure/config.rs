use crate::domain::entities::SavedRequest;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "jolt_config.json";
pub const DEFAULT_SPACE: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not determine a config directory; pass --config")]
    NoConfigDir,

    #[error("variable '{name}' is not defined in space '{space}'")]
    VariableNotFound { space: String, name: String },

    #[error("no saved request named '{0}'")]
    RequestNotFound(String),
}

/// A named group of variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Space {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            variables: BTreeMap::new(),
        }
    }
}

/// Contents of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub version: String,
    #[serde(default)]
    pub spaces: Vec<Space>,
    #[serde(default)]
    pub requests: BTreeMap<String, SavedRequest>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            spaces: vec![Space::new(DEFAULT_SPACE)],
            requests: BTreeMap::new(),
        }
    }
}

impl UserConfig {
    /// Returns the space called `name`, creating it if needed.
    /// An empty name means the default space.
    pub fn space_mut(&mut self, name: &str) -> &mut Space {
        let name = space_name(name);
        let index = match self.spaces.iter().position(|space| space.name == name) {
            Some(index) => index,
            None => {
                self.spaces.push(Space::new(name));
                self.spaces.len() - 1
            }
        };
        &mut self.spaces[index]
    }

    pub fn space(&self, name: &str) -> Option<&Space> {
        let name = space_name(name);
        self.spaces.iter().find(|space| space.name == name)
    }

    pub fn set_var(&mut self, space: &str, name: &str, value: &str) {
        self.space_mut(space)
            .variables
            .insert(name.to_string(), value.to_string());
    }

    pub fn get_var(&self, space: &str, name: &str) -> Result<&str, ConfigError> {
        self.space(space)
            .and_then(|s| s.variables.get(name))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::VariableNotFound {
                space: space_name(space).to_string(),
                name: name.to_string(),
            })
    }

    pub fn save_request(&mut self, name: &str, request: SavedRequest) {
        self.requests.insert(name.to_string(), request);
    }

    pub fn saved_request(&self, name: &str) -> Result<&SavedRequest, ConfigError> {
        self.requests
            .get(name)
            .ok_or_else(|| ConfigError::RequestNotFound(name.to_string()))
    }

    pub fn to_pretty_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn space_name(name: &str) -> &str {
    if name.is_empty() { DEFAULT_SPACE } else { name }
}

/// Reads and writes the config file at an explicit path.
///
/// The whole file is loaded, mutated in memory and written back. There is no
/// locking: two invocations racing on the same file can lose an update.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform config location, e.g. `~/.config/jolt/jolt_config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "jolt").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads the config, writing a fresh default one if the file does not exist
    pub fn load_or_create(&self) -> Result<UserConfig, ConfigError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), "loaded config");
                serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = UserConfig::default();
                self.save(&config)?;
                info!(path = %self.path.display(), "created config file");
                Ok(config)
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn save(&self, config: &UserConfig) -> Result<(), ConfigError> {
        let bytes = serde_json::to_vec_pretty(config)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, bytes).map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
