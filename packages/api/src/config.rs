//! # Backend configuration: endpoint URL and public API key
//!
//! The client needs two values at startup: the Supabase project URL and its
//! public (anon) key. Both are required; without them the application cannot
//! render and the web binary shows a configuration error instead.
//!
//! ## Sources, lowest precedence first
//!
//! | Source | Keys |
//! |--------|------|
//! | Compile-time environment (`option_env!`) | `LOCALHELP_SUPABASE_URL`, `LOCALHELP_SUPABASE_ANON_KEY` |
//! | `localhelp.toml` in the working directory (optional) | `supabase_url`, `supabase_anon_key` |
//! | Runtime environment, after loading `.env` (native only) | `LOCALHELP_SUPABASE_URL`, `LOCALHELP_SUPABASE_ANON_KEY` |
//!
//! Browsers have no process environment, so wasm builds rely on the values
//! baked in at compile time.

use config::{Config, Environment, File, FileFormat};
use reqwest::Url;
use thiserror::Error;

const URL_KEY: &str = "supabase_url";
const ANON_KEY_KEY: &str = "supabase_anon_key";

/// Failures while loading [`BackendConfig`]. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not read configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Where the hosted backend lives and how to identify to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    url: Url,
    anon_key: String,
}

impl BackendConfig {
    /// Optional configuration file read from the working directory.
    pub const FILE: &'static str = "localhelp.toml";
    /// Prefix of the environment variables.
    pub const ENV_PREFIX: &'static str = "LOCALHELP";

    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        let anon_key = anon_key.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("LOCALHELP_SUPABASE_URL"));
        }
        if anon_key.is_empty() {
            return Err(ConfigError::Missing("LOCALHELP_SUPABASE_ANON_KEY"));
        }

        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Self {
            url: parsed,
            anon_key: anon_key.to_string(),
        })
    }

    /// Load from every source listed in the module docs.
    pub fn load() -> Result<Self, ConfigError> {
        #[cfg(not(target_arch = "wasm32"))]
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(url) = option_env!("LOCALHELP_SUPABASE_URL") {
            builder = builder.set_default(URL_KEY, url)?;
        }
        if let Some(key) = option_env!("LOCALHELP_SUPABASE_ANON_KEY") {
            builder = builder.set_default(ANON_KEY_KEY, key)?;
        }
        let config = builder
            .add_source(
                File::with_name(Self::FILE)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(Self::ENV_PREFIX))
            .build()?;

        Self::from_config(&config)
    }

    /// Extract and validate the two keys from an assembled [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let url = config
            .get_string(URL_KEY)
            .map_err(|_| ConfigError::Missing("LOCALHELP_SUPABASE_URL"))?;
        let anon_key = config
            .get_string(ANON_KEY_KEY)
            .map_err(|_| ConfigError::Missing("LOCALHELP_SUPABASE_ANON_KEY"))?;
        Self::new(&url, &anon_key)
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Absolute URL of `path` (e.g. `"auth/v1/token"`) on the backend.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
