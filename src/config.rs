use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{ClassifierThresholds, DEFAULT_EXCERPT_CHARS, DEFAULT_RADIUS_KM};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub classifier: ClassifierThresholds,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
        }
    }
}

fn default_storage_backend() -> StorageBackend { StorageBackend::Postgres }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

fn default_true() -> bool { true }
fn default_geocoding_url() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "animal_rescue".to_string() }
fn default_geocoding_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Redis L2 tier; L1-only when absent
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_radius_km() -> f64 { DEFAULT_RADIUS_KM }
fn default_excerpt_chars() -> usize { DEFAULT_EXCERPT_CHARS }

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
    /// 4. Environment variables (prefixed with RESCUE__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RESCUE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RESCUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RESCUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Let the conventional `DATABASE_URL` win over file configuration
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_notification_settings() {
        let notifications = NotificationSettings::default();
        assert_eq!(notifications.radius_km, 50.0);
        assert_eq!(notifications.excerpt_chars, 200);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_minimal_file() {
        let dir = std::env::temp_dir().join(format!("rescue-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [storage]
            backend = "memory"

            [database]
            url = "postgres://localhost/rescue"

            [classifier]
            large_area = 20000.0
            medium_area = 5000.0
            dog_aspect_ratio = 1.5
            dog_confidence = 0.65
            cat_confidence = 0.60
            rabbit_confidence = 0.55
            bird_confidence = 0.50
            large_image_area = 500000.0
            color_dominance = 0.1
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.classifier.large_area, 20000.0);
        assert_eq!(settings.notifications.radius_km, 50.0);
        assert!(settings.geocoding.enabled);
        assert!(settings.cache.redis_url.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_classifier_table_keeps_defaults() {
        let dir = std::env::temp_dir().join(format!("rescue-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [storage]
            backend = "memory"

            [database]
            url = "postgres://localhost/rescue"

            [classifier]
            dog_confidence = 0.9
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        let defaults = ClassifierThresholds::default();
        assert_eq!(settings.classifier.dog_confidence, 0.9);
        assert_eq!(settings.classifier.large_area, defaults.large_area);
        assert_eq!(settings.classifier.cat_confidence, defaults.cat_confidence);

        std::fs::remove_dir_all(&dir).ok();
    }
}
