use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the file backend; unset means `./data` unless the
    /// caller fills it in
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: None,
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("./data"))
    }
}

/// What `load()` does when the persisted aggregate does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Return an error and leave the stored value alone
    #[default]
    Fail,
    /// Back the value up under `<data_key>.corrupt` and seed a fresh store
    Reseed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_key")]
    pub data_key: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,
}

fn default_data_key() -> String {
    "fitness_app_data".to_string()
}
fn default_session_key() -> String {
    "current_user".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_key: default_data_key(),
            session_key: default_session_key(),
            on_corrupt: CorruptPolicy::Fail,
        }
    }
}

/// The director account written into a fresh store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            id: "director-1".to_string(),
            email: "dima260208@bk.ru".to_string(),
            password: "Sempay666".to_string(),
            name: "Дмитрий Болотин".to_string(),
        }
    }
}

impl Config {
    /// Load from `KINETIC_CONFIG`, then the default locations, then defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("KINETIC_CONFIG") {
            return Self::load_from_path(Path::new(&path));
        }

        let default_paths = [
            PathBuf::from("kinetic.toml"),
            PathBuf::from("config/kinetic.toml"),
        ];

        for path in default_paths {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        tracing::warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
