use common::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// The single account allowed to use the API.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// When false, every request runs as the `anonymous` principal.
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://docvault.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.enabled", true)?
            .set_default("auth.username", "admin")?
            .set_default("auth.password", "admin123")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., DOCVAULT__DATABASE__URL)
            .add_source(Environment::with_prefix("DOCVAULT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
