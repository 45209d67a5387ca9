// Configuration Module

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sync::activity::{ActivitySettings, DecayPolicy};

pub const ENV_SYNCTHING_URL: &str = "SYNCTHING_URL";
pub const ENV_SYNCTHING_API_KEY: &str = "SYNCTHING_API_KEY";
pub const ENV_SYNCTHING_CERT_FILE: &str = "SYNCTHING_CERT_FILE";
pub const ENV_INDICATOR_CLI: &str = "CM_RGB_CLI_PATH";

// Configuration Struct
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the Syncthing GUI/REST listener, e.g. `https://127.0.0.1:8384`.
    pub syncthing_url: String,
    pub api_key: String,
    /// PEM certificate the daemon's HTTPS listener is trusted with.
    pub cert_file: PathBuf,
    /// Path of the cooler RGB command line tool.
    pub indicator_cli: PathBuf,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub activity: ActivityConfig,
}

/// `[activity]` table of the settings file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ActivityConfig {
    pub min_delta_bytes: u64,
    pub initial_delay_secs: u64,
    pub tolerance_cycles: u32,
    pub decay: DecayPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syncthing_url: String::new(),
            api_key: String::new(),
            cert_file: PathBuf::new(),
            indicator_cli: PathBuf::new(),
            poll_interval_secs: 1,
            request_timeout_secs: 5,
            activity: ActivityConfig::default(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        let defaults = ActivitySettings::default();
        Self {
            min_delta_bytes: defaults.min_delta_bytes,
            initial_delay_secs: defaults.initial_delay.as_secs(),
            tolerance_cycles: defaults.tolerance_cycles,
            decay: defaults.decay,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn activity_settings(&self) -> ActivitySettings {
        ActivitySettings {
            min_delta_bytes: self.activity.min_delta_bytes,
            initial_delay: Duration::from_secs(self.activity.initial_delay_secs),
            tolerance_cycles: self.activity.tolerance_cycles,
            decay: self.activity.decay,
        }
    }

    /// Overlay values found through `lookup` (normally the process environment).
    /// Empty values count as unset.
    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_SYNCTHING_URL) {
            self.syncthing_url = v;
        }
        if let Some(v) = get(ENV_SYNCTHING_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_SYNCTHING_CERT_FILE) {
            self.cert_file = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_INDICATOR_CLI) {
            self.indicator_cli = PathBuf::from(v);
        }
    }

    /// Defaults overlaid with `lookup` only, no settings file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Check the values the monitor cannot start without.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            (ENV_SYNCTHING_URL, self.syncthing_url.is_empty()),
            (ENV_SYNCTHING_API_KEY, self.api_key.is_empty()),
            (ENV_SYNCTHING_CERT_FILE, self.cert_file.as_os_str().is_empty()),
            (ENV_INDICATOR_CLI, self.indicator_cli.as_os_str().is_empty()),
        ];
        if let Some((key, _)) = missing.iter().find(|(_, empty)| *empty) {
            bail!("Required setting '{}' is not set", key);
        }

        url::Url::parse(&self.syncthing_url)
            .with_context(|| format!("Invalid {}: {}", ENV_SYNCTHING_URL, self.syncthing_url))?;

        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1");
        }
        // A zero timeout fails every request, the daemon would always look down.
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

// Function to get the default settings file path
pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "SyncLed", "syncled")
        .context("Failed to get project directories")?;
    Ok(proj_dirs.config_dir().join("syncled.toml"))
}

// Function to load a settings file
pub fn load_config_file(config_path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Build the startup configuration: defaults, then the settings file, then the
/// environment. An explicit `path` must exist; the default location is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => load_config_file(p)?,
        None => {
            let default_path = get_config_path()?;
            if default_path.exists() {
                log::debug!("Using settings file {}", default_path.display());
                load_config_file(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    config.apply_lookup(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
