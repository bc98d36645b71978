use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use super::PgpipeConfig;
use crate::constants::default_constants::CONFIG_RELATIVE_PATH;
use crate::constants::env_variables::CONFIG_PATH_ENV;

/// `PGPIPE_CONFIG_PATH` if set, `~/.config/pgpipe/config.toml` otherwise.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir().unwrap_or(PathBuf::from("~")).join(CONFIG_RELATIVE_PATH)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PgpipeConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config: PgpipeConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;
    debug!("Loaded config from {:?}: {:?}", path, config);
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<PgpipeConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        debug!("No config at {:?}, using defaults", path);
        Ok(PgpipeConfig::default())
    }
}

pub fn save_config<P: AsRef<Path>>(config: &PgpipeConfig, path: P) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml_str)?;
    Ok(())
}
