use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use crate::auth::token::TokenIssuer;
use crate::chat::sessions::SessionRegistry;
use crate::core::{AppState, AuthConfig, CourierConfig, DatabaseConfig, HttpConfig, SmtpConfig, UploadConfig};
use crate::database::{init_schema, ChatDatabase, FriendRequestDatabase, UserDatabase};
use crate::email::NoopMailer;
use crate::users::model::{NewUser, UserRole, UserStatus};

fn test_config() -> CourierConfig {
    CourierConfig {
        log_level: "debug".to_string(),
        http: HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origin: "http://localhost:3000".to_string(),
            app_url: "http://localhost:8080".to_string(),
        },
        database: DatabaseConfig {
            db_url: "sqlite::memory:".to_string(),
            with_db_init: true,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_minutes: 15,
        },
        smtp: SmtpConfig {
            enabled: false,
            host: "localhost".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: "noreply@localhost".to_string(),
        },
        uploads: UploadConfig { dir: "uploads".to_string() },
    }
}

/// Fresh application state on an in-memory database. A single connection
/// keeps every query on the same in-memory instance.
pub async fn test_state() -> Arc<AppState> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    let config = test_config();
    let tokens = TokenIssuer::new(&config.auth);
    Arc::new(AppState {
        env: config,
        user_repository: UserDatabase::new(pool.clone()),
        friend_repository: FriendRequestDatabase::new(pool.clone()),
        chat_repository: ChatDatabase::new(pool),
        sessions: Arc::new(SessionRegistry::new()),
        mailer: Arc::new(NoopMailer),
        tokens,
    })
}

/// Inserts a verified, active user and returns its id.
pub async fn seed_user(state: &Arc<AppState>, name: &str, email: &str) -> i64 {
    let user = state.user_repository.insert_user(&NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        role: UserRole::User,
        status: UserStatus::Active,
        email_verified: true,
        phone: None,
    }).await.unwrap();
    user.meta.id
}
