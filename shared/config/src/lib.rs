//! Environment configuration for the kgbridge services.
//!
//! Everything is read from the process environment once at startup (after an
//! optional `.env` file has been loaded). Missing store credentials are fatal:
//! [`AppConfig::from_env`] reports every missing variable in one error.

pub mod error;
pub mod stores;

pub use error::ConfigError;
pub use stores::{MongoSettings, Neo4jSettings};

use serde::Serialize;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Limits applied by the search orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    /// Result count used when the caller does not pass `limit`
    pub default_limit: usize,
    /// Upper bound for caller-supplied limits
    pub max_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl SearchSettings {
    /// Resolve a caller-supplied limit into `1..=max_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub neo4j: Neo4jSettings,
    pub mongo: MongoSettings,
    pub search: SearchSettings,
}

impl AppConfig {
    /// Load `.env` (if present) and build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvReader::new(&lookup);

        let neo4j = Neo4jSettings::from_reader(&vars);
        let mongo = MongoSettings::from_reader(&vars);

        let missing: Vec<String> = [neo4j.as_ref().err(), mongo.as_ref().err()]
            .into_iter()
            .flatten()
            .flat_map(|e| e.missing_vars())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: vars.string_or("HOST", &defaults.host),
            port: vars.parsed_or("PORT", defaults.port)?,
        };

        let search_defaults = SearchSettings::default();
        let search = SearchSettings {
            default_limit: vars.parsed_or("SEARCH_DEFAULT_LIMIT", search_defaults.default_limit)?,
            max_limit: vars.parsed_or("SEARCH_MAX_LIMIT", search_defaults.max_limit)?,
        };
        if search.default_limit == 0 || search.max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_DEFAULT_LIMIT/SEARCH_MAX_LIMIT".to_string(),
                value: "0".to_string(),
                reason: "limits must be positive".to_string(),
            });
        }

        let config = Self {
            server,
            neo4j: neo4j?,
            mongo: mongo?,
            search,
        };

        tracing::debug!(
            neo4j_uri = %config.neo4j.uri,
            mongo_database = %config.mongo.database,
            port = config.server.port,
            "Configuration loaded"
        );

        Ok(config)
    }
}

/// Thin wrapper over a variable lookup that treats blank values as unset.
pub(crate) struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub(crate) fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
