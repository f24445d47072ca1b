use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::EntityMeta;
use crate::users::model::UserSummary;

/// Stable key for an unordered user pair, identical regardless of who asks.
/// This is what makes room lookup idempotent without a join table.
pub fn canonical_room_id(a: i64, b: i64) -> String {
    format!("room_{}_{}", a.min(b), a.max(b))
}

/// A two-party room. Participants are stored in canonical order
/// (`user_a_id` is the smaller id).
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub room_id: String,
    pub user_a_id: i64,
    pub user_b_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageEntity {
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub room_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub is_read: bool,
}

impl ChatMessageEntity {
    pub fn to_dto(&self, room_id: String, sender: UserSummary, receiver: UserSummary) -> ChatMessageDto {
        ChatMessageDto {
            id: self.meta.id,
            room_id,
            sender,
            receiver,
            content: self.content.clone(),
            is_read: self.is_read,
            created_at: self.meta.created_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: i64,
    pub room_id: String,
    pub sender: UserSummary,
    pub receiver: UserSummary,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message page row with both profiles joined in.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub is_read: bool,
    pub sender_id: i64,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_profile_picture: Option<String>,
    pub receiver_id: i64,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_profile_picture: Option<String>,
}

impl MessageRow {
    pub fn to_dto(&self, room_id: &str) -> ChatMessageDto {
        ChatMessageDto {
            id: self.id,
            room_id: room_id.to_string(),
            sender: UserSummary {
                id: self.sender_id,
                name: self.sender_name.clone(),
                email: self.sender_email.clone(),
                profile_picture: self.sender_profile_picture.clone(),
            },
            receiver: UserSummary {
                id: self.receiver_id,
                name: self.receiver_name.clone(),
                email: self.receiver_email.clone(),
                profile_picture: self.receiver_profile_picture.clone(),
            },
            content: self.content.clone(),
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

/// Chat list row: one per room with at least one message.
#[derive(Debug, Clone, FromRow)]
pub struct ChatListRow {
    pub room_id: String,
    pub other_id: i64,
    pub other_name: String,
    pub other_email: String,
    pub other_profile_picture: Option<String>,
    pub latest_content: String,
    pub latest_created_at: DateTime<Utc>,
    pub latest_is_read: bool,
    pub unread_count: i64,
}

impl ChatListRow {
    pub fn to_dto(&self) -> ChatListItem {
        ChatListItem {
            room_id: self.room_id.clone(),
            other_user: UserSummary {
                id: self.other_id,
                name: self.other_name.clone(),
                email: self.other_email.clone(),
                profile_picture: self.other_profile_picture.clone(),
            },
            latest_message: LatestMessage {
                content: self.latest_content.clone(),
                created_at: self.latest_created_at,
                is_read: self.latest_is_read,
            },
            unread_count: self.unread_count,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatListItem {
    pub room_id: String,
    pub other_user: UserSummary,
    pub latest_message: LatestMessage,
    pub unread_count: i64,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LatestMessage {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Frames the client sends over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { other_user_id: i64 },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { other_user_id: i64 },
    #[serde(rename_all = "camelCase")]
    SendMessage { content: String, receiver_id: i64 },
    GetUsers,
}

/// Frames the server sends. `newMessage` is room-scoped, `messageNotification`
/// is user-scoped; the rest are acknowledgments on the same channel.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    NewMessage { message: ChatMessageDto },
    MessageNotification { message: ChatMessageDto },
    #[serde(rename_all = "camelCase")]
    Joined { status: String, room_id: String },
    #[serde(rename_all = "camelCase")]
    Left { status: String, room_id: String },
    Chats { chats: Vec<ChatListItem> },
    Error { status: String, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_is_order_independent() {
        assert_eq!(canonical_room_id(7, 3), canonical_room_id(3, 7));
        assert_eq!(canonical_room_id(3, 7), "room_3_7");
        assert_eq!(canonical_room_id(5, 5), "room_5_5");
    }

    #[test]
    fn client_events_decode_from_json() {
        let event: ClientEvent = serde_json::from_str(r#"{"event":"joinRoom","data":{"otherUserId":12}}"#).unwrap();
        assert!(matches!(event, ClientEvent::JoinRoom { other_user_id: 12 }));

        let event: ClientEvent = serde_json::from_str(r#"{"event":"sendMessage","data":{"content":"hi","receiverId":4}}"#).unwrap();
        assert!(matches!(event, ClientEvent::SendMessage { receiver_id: 4, .. }));

        let event: ClientEvent = serde_json::from_str(r#"{"event":"getUsers"}"#).unwrap();
        assert!(matches!(event, ClientEvent::GetUsers));
    }
}
