use chrono::Utc;
use sqlx::{Pool, Sqlite};
use crate::chat::model::{ChatListRow, ChatMessageEntity, MessageRow, Room};

#[derive(Debug, Clone)]
pub struct ChatDatabase {
    pool: Pool<Sqlite>,
}

impl ChatDatabase {

    pub fn new(pool: Pool<Sqlite>) -> Self {
        ChatDatabase { pool }
    }

    pub async fn find_room(&self, room_id: &str) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE room_id = ?")
            .bind(room_id)
            .fetch_optional(&self.pool).await
    }

    /// Plain insert. A unique violation on `room_id` is the caller's signal
    /// that it lost the first-contact race and should re-read.
    pub async fn insert_room(&self, room_id: &str, user_a_id: i64, user_b_id: i64) -> Result<Room, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (created_at, updated_at, room_id, user_a_id, user_b_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(room_id)
        .bind(user_a_id)
        .bind(user_b_id)
        .fetch_one(&self.pool).await
    }

    pub async fn insert_message(&self, room_pk: i64, sender_id: i64, receiver_id: i64, content: &str) -> Result<ChatMessageEntity, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, ChatMessageEntity>(
            r#"
            INSERT INTO chat_messages (created_at, updated_at, room_id, sender_id, receiver_id, content, is_read)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(room_pk)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&self.pool).await
    }

    /// Bulk false -> true transition for everything addressed to the reader.
    pub async fn mark_messages_read(&self, room_pk: i64, receiver_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE chat_messages SET updated_at = ?, is_read = 1 WHERE room_id = ? AND receiver_id = ? AND is_read = 0",
        )
        .bind(Utc::now())
        .bind(room_pk)
        .bind(receiver_id)
        .execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn count_messages(&self, room_pk: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE room_id = ?")
            .bind(room_pk)
            .fetch_one(&self.pool).await
    }

    pub async fn select_message_page(&self, room_pk: i64, limit: i64, offset: i64) -> Result<Vec<MessageRow>, sqlx::Error> {
        sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.created_at, m.content, m.is_read,
                   m.sender_id, s.name AS sender_name, s.email AS sender_email, s.profile_picture AS sender_profile_picture,
                   m.receiver_id, r.name AS receiver_name, r.email AS receiver_email, r.profile_picture AS receiver_profile_picture
            FROM chat_messages m
            JOIN users s ON s.id = m.sender_id
            JOIN users r ON r.id = m.receiver_id
            WHERE m.room_id = ?
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(room_pk)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool).await
    }

    /// One row per room the user participates in that has at least one
    /// message, newest conversation first. Bare rooms stay invisible.
    pub async fn select_chat_list(&self, user_id: i64) -> Result<Vec<ChatListRow>, sqlx::Error> {
        sqlx::query_as::<_, ChatListRow>(
            r#"
            SELECT room.room_id,
                   other.id AS other_id, other.name AS other_name, other.email AS other_email,
                   other.profile_picture AS other_profile_picture,
                   latest.content AS latest_content, latest.created_at AS latest_created_at, latest.is_read AS latest_is_read,
                   (SELECT COUNT(*) FROM chat_messages c
                    WHERE c.room_id = room.id AND c.receiver_id = ? AND c.is_read = 0) AS unread_count
            FROM rooms room
            JOIN users other
              ON other.id = CASE WHEN room.user_a_id = ? THEN room.user_b_id ELSE room.user_a_id END
            JOIN chat_messages latest
              ON latest.id = (SELECT id FROM chat_messages
                              WHERE room_id = room.id
                              ORDER BY created_at DESC, id DESC LIMIT 1)
            WHERE room.user_a_id = ? OR room.user_b_id = ?
            ORDER BY latest.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool).await
    }

}
