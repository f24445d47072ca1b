mod user_database;
mod friend_database;
mod chat_database;

pub use user_database::UserDatabase;
pub use friend_database::FriendRequestDatabase;
pub use chat_database::ChatDatabase;

use std::str::FromStr;
use log::info;
use sqlx::{Pool, Sqlite};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use crate::core::DatabaseConfig;

pub async fn connect_pool(config: &DatabaseConfig) -> Pool<Sqlite> {
    let opt = SqliteConnectOptions::from_str(&config.db_url)
        .unwrap_or_else(|err| panic!("Invalid database url: {:?}", err))
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = match SqlitePoolOptions::new()
        .max_connections(25)
        .connect_with(opt)
        .await
    {
        Ok(pool) => {
            info!("Established connection to the database.");
            pool
        }
        Err(err) => {
            panic!("Failed to connect to the database: {:?}", err);
        }
    };
    if config.with_db_init {
        init_schema(&pool).await.unwrap_or_else(|err| panic!("Failed to bootstrap the schema: {:?}", err));
    }
    pool
}

/// Bootstraps the schema. The unique index on `rooms.room_id` is load-bearing:
/// it is what makes concurrent first-contact room creation collapse into a
/// single row instead of two.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            status TEXT NOT NULL DEFAULT 'pending',
            email_verified INTEGER NOT NULL DEFAULT 0,
            phone TEXT,
            profile_picture TEXT,
            latitude REAL,
            longitude REAL,
            address TEXT,
            city TEXT,
            country TEXT,
            reset_token TEXT,
            reset_expires TEXT,
            refresh_token TEXT,
            friends TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    ).execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS friend_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            sender_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            receiver_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            status TEXT NOT NULL DEFAULT 'pending'
        )
        "#,
    ).execute(pool).await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_friend_requests_pair ON friend_requests (sender_id, receiver_id)")
        .execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            room_id TEXT NOT NULL UNIQUE,
            user_a_id INTEGER NOT NULL REFERENCES users (id),
            user_b_id INTEGER NOT NULL REFERENCES users (id)
        )
        "#,
    ).execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            room_id INTEGER NOT NULL REFERENCES rooms (id),
            sender_id INTEGER NOT NULL REFERENCES users (id),
            receiver_id INTEGER NOT NULL REFERENCES users (id),
            content TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ).execute(pool).await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_messages_room ON chat_messages (room_id)")
        .execute(pool).await?;

    info!("Database schema is in place.");
    Ok(())
}
