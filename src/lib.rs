pub mod auth;
pub mod chat;
pub mod core;
pub mod database;
pub mod email;
pub mod errors;
pub mod files;
pub mod friends;
pub mod router;
pub mod users;
pub mod welcome;
