use anyhow::{Context, Result};
use directories::ProjectDirs;
use kinetic_core::Config;
use std::path::{Path, PathBuf};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("ru", "kinetic", "kinetic")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
}

/// Platform data directory used when the config leaves `storage.path` unset
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Where `Config::load` would look, in order
pub fn config_candidates() -> Vec<PathBuf> {
    match std::env::var("KINETIC_CONFIG") {
        Ok(path) => vec![PathBuf::from(path)],
        Err(_) => vec![
            PathBuf::from("kinetic.toml"),
            PathBuf::from("config/kinetic.toml"),
        ],
    }
}

/// Load the core config and fill in the CLI's storage location.
///
/// `--config` wins over the usual lookup; `--data-dir` wins over both the
/// file and the platform default.
pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if let Some(dir) = data_dir {
        config.storage.path = Some(dir);
    } else if config.storage.path.is_none() {
        config.storage.path = Some(default_data_dir()?);
    }

    Ok(config)
}

pub fn render(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    shown.seed.password = "****".to_string();
    toml::to_string_pretty(&shown).context("Failed to render config")
}
