use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_ORIGIN_ADDRESS, DEFAULT_ROUTES_URL,
    MAPS_API_KEY_ENV, PORT_ENV, SUPABASE_ANON_KEY_ENV, SUPABASE_PROJECT_REF_ENV, SUPABASE_URL_ENV,
};
use crate::error::{Result, ShowsError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub distance: DistanceConfig,
    pub backend: BackendConfig,
    /// Routing provider credential. Only ever taken from the environment.
    #[serde(skip)]
    pub maps_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub origin_address: String,
    pub routes_url: String,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            origin_address: DEFAULT_ORIGIN_ADDRESS.to_string(),
            routes_url: DEFAULT_ROUTES_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub readiness_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            readiness_timeout_ms: 9_000,
        }
    }
}

impl Config {
    /// Loads `.env.local` / `.env`, the optional TOML file, then environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();

        let (path, explicit) = match std::env::var(CONFIG_PATH_ENV) {
            Ok(p) => (p, true),
            Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
        };

        let mut config = if explicit || Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            debug!("No config file at {}, using defaults", path);
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShowsError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Applies environment overrides through `lookup` so tests need not touch
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = non_empty(PORT_ENV) {
            match port.trim().parse() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!("Ignoring invalid {}={}", PORT_ENV, port),
            }
        }

        if let Some(url) = non_empty(SUPABASE_URL_ENV) {
            self.backend.url = url;
        } else if let Some(project_ref) = non_empty(SUPABASE_PROJECT_REF_ENV) {
            self.backend.url = format!("https://{}.supabase.co", project_ref);
        }

        if let Some(key) = non_empty(SUPABASE_ANON_KEY_ENV) {
            self.backend.anon_key = key;
        }

        self.maps_api_key = non_empty(MAPS_API_KEY_ENV);
    }
}
