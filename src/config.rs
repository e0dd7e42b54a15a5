use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{COMPARED_ATTRIBUTES, DEFAULT_MATCH_THRESHOLD};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which report store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String { "registros".to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_nearby_radius_km")]
    pub nearby_radius_km: f64,
    #[serde(default = "default_match_radius_km")]
    pub match_radius_km: f64,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: u8,
    #[serde(default)]
    pub enforce_match_radius: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            nearby_radius_km: default_nearby_radius_km(),
            match_radius_km: default_match_radius_km(),
            match_threshold: default_match_threshold(),
            enforce_match_radius: false,
        }
    }
}

impl MatchingSettings {
    /// Reject thresholds no candidate can meet (or every candidate meets) and unusable radii
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=COMPARED_ATTRIBUTES).contains(&self.match_threshold) {
            return Err(ConfigError::Message(format!(
                "matching.match_threshold must be between 1 and {}, got {}",
                COMPARED_ATTRIBUTES, self.match_threshold
            )));
        }

        for (key, radius) in [
            ("nearby_radius_km", self.nearby_radius_km),
            ("match_radius_km", self.match_radius_km),
        ] {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ConfigError::Message(format!(
                    "matching.{} must be a non-negative number, got {}",
                    key, radius
                )));
            }
        }

        Ok(())
    }
}

fn default_nearby_radius_km() -> f64 { 5.0 }
fn default_match_radius_km() -> f64 { 10.0 }
fn default_match_threshold() -> u8 { DEFAULT_MATCH_THRESHOLD }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PETMATCH__)
    /// 5. SUPABASE_URL, SUPABASE_ANON_KEY and DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        Self::layered(builder)
    }

    /// Load configuration from a custom path
    ///
    /// The file replaces `config/default` and `config/local`; environment
    /// layers apply exactly as in [`Settings::load`].
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::layered(Config::builder().add_source(File::from(path.as_ref())))
    }

    fn layered(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            // e.g., PETMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PETMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = apply_env_overrides(settings)?.try_deserialize()?;
        settings.matching.validate()?;

        Ok(settings)
    }
}

/// Apply the well-known connection variables on top of the layered config
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("store.url", url)?;
    }
    if let Ok(api_key) = env::var("SUPABASE_ANON_KEY") {
        builder = builder.set_override("store.api_key", api_key)?;
    }
    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.nearby_radius_km, 5.0);
        assert_eq!(matching.match_radius_km, 10.0);
        assert_eq!(matching.match_threshold, 3);
        assert!(!matching.enforce_match_radius);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [server]
                host = "127.0.0.1"
                port = 9000

                [store]
                backend = "memory"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.store.table, "registros");
        assert_eq!(settings.store.timeout_secs, 30);
        assert!(settings.database.is_none());
        assert_eq!(settings.matching.match_threshold, 3);
        assert_eq!(settings.logging.format, "json");
    }

    fn write_temp_config(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("pet-match-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_applies_database_url_override() {
        let path = write_temp_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [store]
            backend = "postgres"

            [database]
            url = "postgres://from-file/registry"
            "#,
        );

        std::env::set_var("DATABASE_URL", "postgres://from-env/registry");
        let loaded = Settings::load_from(&path);
        std::env::remove_var("DATABASE_URL");
        std::fs::remove_file(&path).ok();

        let database = loaded.unwrap().database.unwrap();
        assert_eq!(database.url, "postgres://from-env/registry");
    }

    #[test]
    fn test_load_from_rejects_out_of_range_threshold() {
        let path = write_temp_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [store]
            backend = "memory"

            [matching]
            match_threshold = 0
            "#,
        );

        let loaded = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(loaded.is_err());
    }

    #[test]
    fn test_matching_threshold_bounds() {
        let with_threshold = |match_threshold| MatchingSettings {
            match_threshold,
            ..MatchingSettings::default()
        };

        assert!(with_threshold(0).validate().is_err());
        assert!(with_threshold(1).validate().is_ok());
        assert!(with_threshold(COMPARED_ATTRIBUTES).validate().is_ok());
        assert!(with_threshold(COMPARED_ATTRIBUTES + 1).validate().is_err());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let matching = MatchingSettings {
            match_radius_km: -1.0,
            ..MatchingSettings::default()
        };
        assert!(matching.validate().is_err());
    }
}
