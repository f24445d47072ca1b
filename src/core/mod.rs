mod config;
mod app_state;
mod entity;
pub mod pagination;
#[cfg(test)]
pub mod test_support;

pub use config::{CourierConfig, HttpConfig, DatabaseConfig, AuthConfig, SmtpConfig, UploadConfig};
pub use app_state::AppState;
pub use entity::EntityMeta;
