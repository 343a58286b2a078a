use std::{fs, path::Path, path::PathBuf, time::Duration};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{BuyablesError, Result};
use crate::infra::cache::DEFAULT_TTL;
use crate::infra::feed::MAPPING_TTL;
use crate::infra::wiki::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::util::logging::LoggingConfig;
use crate::util::version::default_user_agent;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "Buyables";
const APP_NAME: &str = "Buyables";
const SETTINGS_FILE: &str = "settings.json";

/// Runtime settings. Every field has a default, so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub wiki_base_url: String,
    /// Identifying client tag sent with every upstream request.
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    pub mapping_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    /// How long past expiry an entry survives sweeps, keeping it usable as a fallback.
    pub sweep_grace_secs: u64,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wiki_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            mapping_ttl_secs: MAPPING_TTL.as_secs(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            sweep_interval_secs: 60,
            sweep_grace_secs: 6 * 60 * 60,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Defaults, then the user's settings file, then `.env` and process environment.
    pub fn load() -> Result<Self> {
        let mut settings = match config_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        // A missing .env is normal.
        let _ = dotenvy::dotenv();
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| BuyablesError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| BuyablesError::Config(format!("{}: {e}", path.display())))
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WIKI_API_BASE_URL") {
            self.wiki_base_url = url;
        }
        if let Some(agent) = lookup("USER_AGENT") {
            self.user_agent = agent;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }

        let numeric = [
            ("CACHE_TTL_SECONDS", &mut self.cache_ttl_secs),
            ("MAPPING_TTL_SECONDS", &mut self.mapping_ttl_secs),
            ("REQUEST_TIMEOUT_SECONDS", &mut self.request_timeout_secs),
            ("CACHE_SWEEP_INTERVAL_SECONDS", &mut self.sweep_interval_secs),
            ("CACHE_SWEEP_GRACE_SECONDS", &mut self.sweep_grace_secs),
        ];
        for (key, slot) in numeric {
            if let Some(raw) = lookup(key) {
                *slot = raw.trim().parse().map_err(|_| {
                    BuyablesError::Config(format!(
                        "{key} must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("cache_ttl_secs", self.cache_ttl_secs),
            ("mapping_ttl_secs", self.mapping_ttl_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("sweep_interval_secs", self.sweep_interval_secs),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(BuyablesError::Config(format!(
                "{name} must be greater than zero"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(BuyablesError::Config("user_agent must not be empty".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn mapping_ttl(&self) -> Duration {
        Duration::from_secs(self.mapping_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_grace(&self) -> Duration {
        Duration::from_secs(self.sweep_grace_secs)
    }
}

/// Location of the optional settings file in the platform config directory.
pub fn config_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}
