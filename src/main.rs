use std::env;
use std::sync::Arc;
use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use courier::auth::token::TokenIssuer;
use courier::chat::sessions::SessionRegistry;
use courier::core::{AppState, CourierConfig};
use courier::database::{connect_pool, ChatDatabase, FriendRequestDatabase, UserDatabase};
use courier::email::{Mailer, NoopMailer, SmtpMailer};
use courier::router::init_router;
use courier::welcome::welcome;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let run_mode = env::var("COURIER_MODE").unwrap_or_else(|_| "development".into());

    let config = CourierConfig::new_config(&run_mode).unwrap_or_else(|err| panic!("Missing needed env: {}", err));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();
    welcome();

    let pool = connect_pool(&config.database).await;
    let mailer: Arc<dyn Mailer> = if config.smtp.enabled {
        Arc::new(SmtpMailer::new(&config.smtp).unwrap_or_else(|err| panic!("Unable to set up smtp: {}", err)))
    } else {
        Arc::new(NoopMailer)
    };

    let app_state = AppState {
        tokens: TokenIssuer::new(&config.auth),
        user_repository: UserDatabase::new(pool.clone()),
        friend_repository: FriendRequestDatabase::new(pool.clone()),
        chat_repository: ChatDatabase::new(pool),
        sessions: Arc::new(SessionRegistry::new()),
        mailer,
        env: config,
    };

    let url = format!("{}:{}", app_state.env.http.host, app_state.env.http.port);
    let app: Router = init_router(app_state).await;
    let listener = TcpListener::bind(url.clone()).await.unwrap_or_else(|err| panic!("Can't bind {}: {}", url, err));
    info!("Server is listening on: {url}");
    axum::serve(listener, app).await.unwrap();
    info!("Stopping courier...");
}
