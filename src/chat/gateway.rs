use std::sync::Arc;
use axum::Extension;
use axum::extract::{State, WebSocketUpgrade};
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::sync::mpsc::unbounded_channel;
use tracing::error;
use uuid::Uuid;
use crate::auth::model::AuthUser;
use crate::chat::model::{canonical_room_id, ClientEvent, ServerEvent};
use crate::chat::service::ChatService;
use crate::core::AppState;

/// The upgrade request passes through the auth middleware like any other
/// route, so the socket's identity is fixed here once and never renegotiated.
pub async fn handle_chat_socket(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| chat_socket(socket, state, user))
}

async fn chat_socket(socket: WebSocket, state: Arc<AppState>, user: AuthUser) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = unbounded_channel::<ServerEvent>();
    let connection_id = state.sessions.connect(user.id, tx).await;
    info!("User {} connected to the chat socket.", user.id);

    // outbound half: everything addressed to this session goes over the wire
    let forward = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    error!("Can't serialize server event: {}", err);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = ws_rx.next().await {
        match frame {
            Message::Text(text) => {
                if let Err(err) = dispatch(&state, &user, connection_id, text.as_str()).await {
                    // a bad event answers with an error ack, the socket stays open
                    state.sessions.send_to_user(user.id, ServerEvent::Error {
                        status: "error".to_string(),
                        error: err.client_message(),
                    }).await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.disconnect(user.id, connection_id).await;
    forward.abort();
    debug!("Chat socket for user {} closed.", user.id);
}

async fn dispatch(state: &Arc<AppState>, user: &AuthUser, connection_id: Uuid, text: &str) -> Result<(), crate::errors::AppError> {
    let event: ClientEvent = serde_json::from_str(text)
        .map_err(|_| crate::errors::AppError::ValidationError("Unknown or malformed event.".to_string()))?;

    match event {
        ClientEvent::JoinRoom { other_user_id } => {
            let room = ChatService::get_or_create_room(state.clone(), user.id, other_user_id).await?;
            state.sessions.join_room(user.id, connection_id, &room.room_id).await;
            state.sessions.send_to_user(user.id, ServerEvent::Joined {
                status: "joined".to_string(),
                room_id: room.room_id,
            }).await;
        }
        ClientEvent::LeaveRoom { other_user_id } => {
            let room_id = canonical_room_id(user.id, other_user_id);
            state.sessions.leave_room(user.id, connection_id, &room_id).await;
            state.sessions.send_to_user(user.id, ServerEvent::Left {
                status: "left".to_string(),
                room_id,
            }).await;
        }
        ClientEvent::SendMessage { content, receiver_id } => {
            ChatService::send_message(state.clone(), user.id, receiver_id, &content).await?;
        }
        ClientEvent::GetUsers => {
            let chats = ChatService::get_user_chats(state.clone(), user.id).await?;
            state.sessions.send_to_user(user.id, ServerEvent::Chats { chats }).await;
        }
    }
    Ok(())
}
