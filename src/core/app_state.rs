use std::sync::Arc;
use crate::auth::token::TokenIssuer;
use crate::chat::sessions::SessionRegistry;
use crate::core::CourierConfig;
use crate::database::{ChatDatabase, FriendRequestDatabase, UserDatabase};
use crate::email::Mailer;

/// Everything a request handler needs, shared behind an `Arc`. The session
/// registry lives here on purpose: it is process-scoped state owned by the
/// application, not a global.
#[derive(Clone)]
pub struct AppState {
    pub env: CourierConfig,
    pub user_repository: UserDatabase,
    pub friend_repository: FriendRequestDatabase,
    pub chat_repository: ChatDatabase,
    pub sessions: Arc<SessionRegistry>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenIssuer,
}
