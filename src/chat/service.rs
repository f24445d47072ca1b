use std::sync::Arc;
use log::{debug, info};
use crate::chat::model::{canonical_room_id, ChatListItem, ChatMessageDto, Room, ServerEvent};
use crate::core::AppState;
use crate::core::pagination::{Page, PageParams};
use crate::errors::AppError;

pub struct ChatService;

impl ChatService {

    /// Looks the pair's room up under its canonical id, creating it on first
    /// contact. Two racing first messages both end up with the same room: the
    /// loser's insert hits the unique index and falls back to a re-read.
    pub async fn get_or_create_room(state: Arc<AppState>, user_a: i64, user_b: i64) -> Result<Room, AppError> {
        let room_id = canonical_room_id(user_a, user_b);
        if let Some(room) = state.chat_repository.find_room(&room_id).await? {
            return Ok(room);
        }

        let (a_exists, b_exists) = tokio::try_join!( //executing 2 queries async
            state.user_repository.exists_user(user_a),
            state.user_repository.exists_user(user_b)
        )?;
        if !a_exists || !b_exists {
            return Err(AppError::NotFound("Chat partner not found.".to_string()));
        }

        let (low, high) = (user_a.min(user_b), user_a.max(user_b));
        match state.chat_repository.insert_room(&room_id, low, high).await {
            Ok(room) => {
                info!("Created room {} for users {} and {}.", room_id, low, high);
                Ok(room)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!("Lost the creation race for room {}, re-reading.", room_id);
                state.chat_repository.find_room(&room_id).await?.ok_or_else(|| {
                    AppError::DatabaseError(Box::new(err))
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persists a message and fans it out: `newMessage` to everyone joined to
    /// the room, plus a `messageNotification` to the receiver when they are
    /// online but looking elsewhere. Delivery failures never fail the send;
    /// the message is durable once the insert commits.
    pub async fn send_message(state: Arc<AppState>, sender_id: i64, receiver_id: i64, content: &str) -> Result<ChatMessageDto, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::ValidationError("Message content must not be empty.".to_string()));
        }
        if sender_id == receiver_id {
            return Err(AppError::ValidationError("Cannot send a message to yourself.".to_string()));
        }

        let summaries = state.user_repository.select_summaries(&[sender_id, receiver_id]).await?;
        let sender = summaries.iter().find(|u| u.id == sender_id).cloned();
        let receiver = summaries.iter().find(|u| u.id == receiver_id).cloned();
        let (sender, receiver) = match (sender, receiver) {
            (Some(sender), Some(receiver)) => (sender, receiver),
            _ => return Err(AppError::NotFound("Sender or receiver not found.".to_string())),
        };

        let room = Self::get_or_create_room(state.clone(), sender_id, receiver_id).await?;
        let message = state.chat_repository
            .insert_message(room.meta.id, sender_id, receiver_id, content.trim())
            .await?;
        let dto = message.to_dto(room.room_id.clone(), sender, receiver);

        state.sessions
            .broadcast_to_room(&room.room_id, &ServerEvent::NewMessage { message: dto.clone() })
            .await;

        // sender sees their own message even before joining the room
        if !state.sessions.is_joined(sender_id, &room.room_id).await {
            state.sessions.send_to_user(sender_id, ServerEvent::NewMessage { message: dto.clone() }).await;
        }
        if state.sessions.is_connected(receiver_id).await
            && !state.sessions.is_joined(receiver_id, &room.room_id).await
        {
            state.sessions
                .send_to_user(receiver_id, ServerEvent::MessageNotification { message: dto.clone() })
                .await;
        }

        Ok(dto)
    }

    /// Opens the conversation from the reader's side: everything addressed to
    /// them becomes read, then the newest page comes back. No room yet means
    /// an empty page, not an error.
    pub async fn get_messages(state: Arc<AppState>, user_id: i64, other_user_id: i64, params: PageParams) -> Result<Page<ChatMessageDto>, AppError> {
        let room_id = canonical_room_id(user_id, other_user_id);
        let Some(room) = state.chat_repository.find_room(&room_id).await? else {
            return Ok(Page::empty(&params));
        };

        let marked = state.chat_repository.mark_messages_read(room.meta.id, user_id).await?;
        if marked > 0 {
            debug!("User {} read {} messages in {}.", user_id, marked, room_id);
        }

        let (rows, total) = tokio::try_join!( //executing 2 queries async
            state.chat_repository.select_message_page(room.meta.id, params.limit(), params.offset()),
            state.chat_repository.count_messages(room.meta.id)
        )?;
        let items = rows.iter().map(|row| row.to_dto(&room_id)).collect();
        Ok(Page::new(items, total, &params))
    }

    pub async fn get_user_chats(state: Arc<AppState>, user_id: i64) -> Result<Vec<ChatListItem>, AppError> {
        let rows = state.chat_repository.select_chat_list(user_id).await?;
        Ok(rows.iter().map(|row| row.to_dto()).collect())
    }

}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use crate::core::test_support::{seed_user, test_state};
    use crate::friends::model::FriendRequestStatus;
    use crate::friends::service::FriendService;

    #[tokio::test]
    async fn room_creation_is_idempotent() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let first = ChatService::get_or_create_room(state.clone(), a, b).await.unwrap();
        let second = ChatService::get_or_create_room(state.clone(), b, a).await.unwrap();
        assert_eq!(first.meta.id, second.meta.id);
        assert_eq!(first.room_id, canonical_room_id(a, b));

        // concurrent callers converge on the same room too
        let (left, right) = tokio::join!(
            ChatService::get_or_create_room(state.clone(), a, b),
            ChatService::get_or_create_room(state.clone(), b, a)
        );
        assert_eq!(left.unwrap().meta.id, right.unwrap().meta.id);
    }

    #[tokio::test]
    async fn message_to_missing_user_is_not_found() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;

        let result = ChatService::send_message(state, a, 9999, "hello").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn room_with_missing_user_is_not_found() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;

        // a join targeting an unknown user must not hit the insert at all
        let result = ChatService::get_or_create_room(state.clone(), a, 9999).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let rooms = ChatService::get_user_chats(state, a).await.unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let result = ChatService::send_message(state, a, b, "   ").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn reading_marks_messages_and_pages_newest_first() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        ChatService::send_message(state.clone(), a, b, "one").await.unwrap();
        ChatService::send_message(state.clone(), a, b, "two").await.unwrap();
        ChatService::send_message(state.clone(), b, a, "three").await.unwrap();

        let page = ChatService::get_messages(state.clone(), b, a, PageParams::default()).await.unwrap();
        assert_eq!(page.meta.total_items, 3);
        assert_eq!(page.items[0].content, "three");
        assert_eq!(page.items[2].content, "one");
        // messages addressed to b are read now, b's own message is untouched
        assert!(page.items[1].is_read);
        assert!(page.items[2].is_read);
        assert!(!page.items[0].is_read);

        // a's unread counter for the conversation is independent
        let chats = ChatService::get_user_chats(state, a).await.unwrap();
        assert_eq!(chats[0].unread_count, 1);
    }

    #[tokio::test]
    async fn missing_conversation_is_an_empty_page() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let page = ChatService::get_messages(state, a, b, PageParams::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_items, 0);
    }

    #[tokio::test]
    async fn chat_list_skips_empty_rooms_and_sorts_by_latest() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;
        let c = seed_user(&state, "Carol", "carol@example.org").await;
        let d = seed_user(&state, "Dave", "dave@example.org").await;

        // room with no messages stays invisible
        ChatService::get_or_create_room(state.clone(), a, d).await.unwrap();

        ChatService::send_message(state.clone(), a, b, "to bob").await.unwrap();
        ChatService::send_message(state.clone(), c, a, "from carol").await.unwrap();

        let chats = ChatService::get_user_chats(state, a).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].other_user.id, c);
        assert_eq!(chats[0].latest_message.content, "from carol");
        assert_eq!(chats[0].unread_count, 1);
        assert_eq!(chats[1].other_user.id, b);
        assert_eq!(chats[1].unread_count, 0);
    }

    #[tokio::test]
    async fn offline_receiver_gets_no_notification_but_message_persists() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let dto = ChatService::send_message(state.clone(), a, b, "hello").await.unwrap();
        assert!(!dto.is_read);

        let page = ChatService::get_messages(state, b, a, PageParams::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].content, "hello");
    }

    #[tokio::test]
    async fn first_contact_flow_from_request_to_read() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let request = FriendService::send_friend_request(state.clone(), a, b).await.unwrap();
        FriendService::respond_to_friend_request(state.clone(), request.id, b, FriendRequestStatus::Accepted).await.unwrap();

        ChatService::send_message(state.clone(), a, b, "hello").await.unwrap();
        let chats = ChatService::get_user_chats(state.clone(), b).await.unwrap();
        assert_eq!(chats[0].unread_count, 1);

        let page = ChatService::get_messages(state.clone(), b, a, PageParams::default()).await.unwrap();
        assert!(page.items[0].is_read);

        let chats = ChatService::get_user_chats(state, b).await.unwrap();
        assert_eq!(chats[0].unread_count, 0);
    }

    #[tokio::test]
    async fn notification_goes_to_connected_receiver_outside_the_room() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let (tx, mut rx) = unbounded_channel();
        state.sessions.connect(b, tx).await;

        ChatService::send_message(state.clone(), a, b, "ping").await.unwrap();
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, ServerEvent::MessageNotification { .. }));

        // once joined to the room, the receiver gets the message itself instead
        let room = ChatService::get_or_create_room(state.clone(), a, b).await.unwrap();
        let (tx2, mut rx2) = unbounded_channel();
        let conn = state.sessions.connect(b, tx2).await;
        state.sessions.join_room(b, conn, &room.room_id).await;

        ChatService::send_message(state, a, b, "pong").await.unwrap();
        let event = rx2.try_recv().unwrap();
        assert!(matches!(event, ServerEvent::NewMessage { .. }));
        assert!(rx2.try_recv().is_err());
    }
}
