/**
 * Server Configuration
 *
 * This module loads the server configuration and opens the SQLite pool.
 *
 * # Configuration Sources
 *
 * 1. Built-in defaults suitable for local development
 * 2. An optional TOML file, path taken from `QUILL_CONFIG`
 * 3. Environment variables (highest priority, `.env` is loaded by `main`)
 *
 * # Environment Variables
 *
 * - `SERVER_PORT` - listen port (default 5000)
 * - `DATABASE_URL` - SQLite URL (default `sqlite://quill.db?mode=rwc`)
 * - `JWT_SECRET` - token signing secret, required in production
 * - `JWT_TTL_DAYS` - token lifetime in days (default 30)
 * - `APP_ENV` - `development` or `production` (default development)
 * - `BCRYPT_COST` - password hashing cost (default 12)
 * - `CORS_ORIGINS` - comma-separated origin allowlist
 * - `MEDIA_CLOUD_NAME`, `MEDIA_UPLOAD_PRESET`, `MEDIA_FOLDER` - media host
 * - `SEED_DEMO` - `1` to seed demo data on an empty database
 */

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://quill.db?mode=rwc";
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
pub const DEFAULT_MEDIA_FOLDER: &str = "quill";
const DEVELOPMENT_JWT_SECRET: &str = "quill-development-secret";

/// Front-end origins allowed when `CORS_ORIGINS` is not set
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:5175",
];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(other.to_string()),
        }
    }
}

/// Media host settings for image uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub environment: Environment,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    /// `None` disables uploads (503)
    pub media: Option<MediaConfig>,
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            environment: Environment::Development,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            media: None,
            seed_demo: false,
        }
    }
}

/// Keys accepted in the optional TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    jwt_ttl_days: Option<i64>,
    environment: Option<Environment>,
    bcrypt_cost: Option<u32>,
    cors_origins: Option<Vec<String>>,
    media_cloud_name: Option<String>,
    media_upload_preset: Option<String>,
    media_folder: Option<String>,
    seed_demo: Option<bool>,
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// # Returns
    ///
    /// The merged configuration, or the first invalid value found
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the environment
    ///
    /// Reads the TOML file named by `QUILL_CONFIG` first, then applies
    /// overrides.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup("QUILL_CONFIG") {
            Some(path) => read_file_config(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let mut config = ServerConfig::default();
        config.apply_file(file);

        if let Some(value) = lookup("SERVER_PORT") {
            config.port = parse_value("SERVER_PORT", &value)?;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            config.database_url = value;
        }
        if let Some(value) = lookup("JWT_TTL_DAYS") {
            config.token_ttl_days = parse_value("JWT_TTL_DAYS", &value)?;
        }
        if let Some(value) = lookup("APP_ENV") {
            config.environment = value.parse().map_err(|value| ConfigError::InvalidValue {
                key: "APP_ENV",
                value,
            })?;
        }
        if let Some(value) = lookup("BCRYPT_COST") {
            config.bcrypt_cost = parse_value("BCRYPT_COST", &value)?;
        }
        if let Some(value) = lookup("CORS_ORIGINS") {
            config.cors_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup("SEED_DEMO") {
            config.seed_demo = matches!(value.trim(), "1" | "true" | "yes");
        }

        let cloud_name = lookup("MEDIA_CLOUD_NAME");
        let upload_preset = lookup("MEDIA_UPLOAD_PRESET");
        if let (Some(cloud_name), Some(upload_preset)) = (cloud_name, upload_preset) {
            let folder = lookup("MEDIA_FOLDER")
                .or_else(|| config.media.as_ref().map(|m| m.folder.clone()))
                .unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string());
            config.media = Some(MediaConfig {
                cloud_name,
                upload_preset,
                folder,
            });
        }

        match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => config.jwt_secret = secret,
            _ if config.jwt_secret != DEVELOPMENT_JWT_SECRET => {}
            _ if config.environment.is_development() => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        }

        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: config.bcrypt_cost.to_string(),
            });
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(url) = file.database_url {
            self.database_url = url;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = secret;
        }
        if let Some(days) = file.jwt_ttl_days {
            self.token_ttl_days = days;
        }
        if let Some(environment) = file.environment {
            self.environment = environment;
        }
        if let Some(cost) = file.bcrypt_cost {
            self.bcrypt_cost = cost;
        }
        if let Some(origins) = file.cors_origins {
            self.cors_origins = origins;
        }
        if let Some(seed) = file.seed_demo {
            self.seed_demo = seed;
        }
        if let (Some(cloud_name), Some(upload_preset)) =
            (file.media_cloud_name, file.media_upload_preset)
        {
            self.media = Some(MediaConfig {
                cloud_name,
                upload_preset,
                folder: file
                    .media_folder
                    .unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string()),
            });
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!("Loaded configuration file {}", path.display());
    Ok(toml::from_str(&text)?)
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Open the SQLite pool and run migrations
///
/// In-memory databases get a single long-lived connection so every query
/// sees the same schema.
///
/// # Arguments
///
/// * `database_url` - SQLite connection URL
///
/// # Errors
///
/// Returns the connection or migration error; the server cannot start
/// without its database.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
