//! blazecal configuration.
//!
//! Loaded from `~/.config/blazecal/config.toml` (created with every option
//! commented out on first run), then overridden by `BLAZECAL__*` environment
//! variables, e.g. `BLAZECAL__STORE__PROVIDER=caldav`.

use std::path::{Path, PathBuf};

use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_UID_DOMAIN, DEFAULT_UPCOMING_DAYS, MAX_UPCOMING_DAYS};
use crate::error::{CalError, CalResult};
use crate::remote::RemoteConfig;

static DEFAULT_STORE_DIR: &str = "~/calendar";

fn default_store_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

fn default_upcoming_days() -> i64 {
    DEFAULT_UPCOMING_DAYS
}

fn default_uid_domain() -> String {
    DEFAULT_UID_DOMAIN.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    /// Length of the upcoming-events list
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,

    /// Domain part of generated event uids
    #[serde(default = "default_uid_domain")]
    pub uid_domain: String,
}

/// Where master records live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Provider binary suffix; the directory store is used when unset
    pub provider: Option<String>,

    #[serde(default = "default_store_dir")]
    pub directory: PathBuf,

    /// Passed through to the provider untouched
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            provider: None,
            directory: default_store_dir(),
            remote: RemoteConfig::default(),
        }
    }
}

impl StoreConfig {
    /// The store directory with `~` expanded.
    pub fn directory_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.directory.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig::default(),
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
        }
    }
}

impl Config {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalError::Config("Could not determine config directory".into()))?
            .join("blazecal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing the template there first if
    /// no file exists yet.
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> CalResult<Self> {
        let config: Config = config::Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("BLAZECAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CalResult<()> {
        if !(1..=MAX_UPCOMING_DAYS).contains(&self.upcoming_days) {
            return Err(CalError::Config(format!(
                "upcoming_days must be between 1 and {}, got {}",
                MAX_UPCOMING_DAYS, self.upcoming_days
            )));
        }
        if self.uid_domain.trim().is_empty() {
            return Err(CalError::Config("uid_domain must not be empty".into()));
        }
        if self.store.provider.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(CalError::Config("store.provider must not be empty".into()));
        }
        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# blazecal configuration

# Days shown in the upcoming-events list:
# upcoming_days = {}

# Domain used in generated event uids:
# uid_domain = \"{}\"

[store]
# Directory of .ics files, used when no provider is set:
# directory = \"{}\"

# Talk to a remote calendar through blazecal-provider-<name> instead:
# provider = \"caldav\"

# Settings handed to the provider as-is:
# [store.remote]
# url = \"https://dav.example.com/calendars/family/\"
",
            DEFAULT_UPCOMING_DAYS, DEFAULT_UID_DOMAIN, DEFAULT_STORE_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
