use crate::{PqcBenchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_URL: &str = "PQCBENCH_URL";
pub const ENV_TIMEOUT_SECS: &str = "PQCBENCH_TIMEOUT_SECS";
pub const ENV_USER: &str = "PQCBENCH_USER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    #[serde(default)]
    pub user: Option<String>,
    pub logout_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "user".to_string(),
            user: None,
            logout_path: "/logout".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Defaults overlaid with `PQCBENCH_*` variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from any key lookup, so tests need not touch the process env.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.backend.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.backend.timeout_secs = raw.trim().parse().map_err(|_| {
                PqcBenchError::Config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.session.user = Some(user);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PqcBenchError::Config(format!(
                "backend URL must start with http:// or https://, got {:?}",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(PqcBenchError::Config("timeout must be at least one second".to_string()));
        }
        if self.session.cookie_name.is_empty() {
            return Err(PqcBenchError::Config("cookie name must not be empty".to_string()));
        }
        if !self.session.logout_path.starts_with('/') {
            return Err(PqcBenchError::Config(format!(
                "logout path must be absolute, got {:?}",
                self.session.logout_path
            )));
        }
        Ok(())
    }
}
