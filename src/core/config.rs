use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Public base url, used in mail links and upload urls.
    pub app_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub db_url: String,
    /// Bootstraps the schema on startup when set. Meant for development and tests.
    pub with_db_init: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CourierConfig {
    pub log_level: String,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub smtp: SmtpConfig,
    pub uploads: UploadConfig,
}

impl CourierConfig {
    pub fn new_config(run_mode: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("default.config.toml"))
            .add_source(File::with_name(&format!("{run_mode}.config.toml")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?;
        config.try_deserialize()
    }
}
