//! Locating, loading and saving the configuration file.

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Config;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ACTUATE_CONFIG";

/// Directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "actuate";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Pick the configuration path: explicit, then environment, then the
/// platform config directory.
pub fn resolve_path(
    explicit: Option<&Path>,
    env: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> ConfigResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir { env: CONFIG_ENV })
}

/// A configuration file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the path chosen by [`resolve_path`] for this process.
    pub fn locate(explicit: Option<&Path>) -> ConfigResult<Self> {
        let path = resolve_path(explicit, std::env::var_os(CONFIG_ENV), dirs::config_dir())?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the file; a missing file yields the default configuration.
    pub fn load(&self) -> ConfigResult<Config> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                debug!(path = %self.path.display(), "Loaded configuration");
                Config::from_toml(&content).map_err(|source| ConfigError::Parse {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No configuration file, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::io(&self.path, e)),
        }
    }

    /// Write `config`, creating parent directories as needed.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let content = config.to_toml()?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::io(&self.path, e))?;
        info!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }

    /// Load, apply `change`, save.
    pub fn update<T>(
        &self,
        change: impl FnOnce(&mut Config) -> ConfigResult<T>,
    ) -> ConfigResult<T> {
        let mut config = self.load()?;
        let result = change(&mut config)?;
        self.save(&config)?;
        Ok(result)
    }
}
