use std::sync::Arc;
use log::info;
use crate::core::AppState;
use crate::core::pagination::{Page, PageParams};
use crate::errors::AppError;
use crate::friends::model::{FriendRequestDto, FriendRequestQueryParams, FriendRequestListItem, FriendRequestStatus};
use crate::users::model::UserSummary;

pub struct FriendService;

impl FriendService {

    /// Creates a PENDING edge. Blocked by a self-request, an open request in
    /// either direction, or an existing friendship. The friendship check goes
    /// through the friends sets, not the request history, so resolved history
    /// never blocks a legitimate new request.
    pub async fn send_friend_request(state: Arc<AppState>, sender_id: i64, receiver_id: i64) -> Result<FriendRequestDto, AppError> {
        if sender_id == receiver_id {
            return Err(AppError::ValidationError("Cannot send friend request to yourself.".to_string()));
        }

        if state.friend_repository.find_pending_between(sender_id, receiver_id).await?.is_some() {
            return Err(AppError::ValidationError("Friend request already exists.".to_string()));
        }

        let (sender, receiver) = tokio::try_join!( //executing 2 queries async
            state.user_repository.find_by_id(sender_id),
            state.user_repository.find_by_id(receiver_id)
        )?;
        let (sender, receiver) = match (sender, receiver) {
            (Some(sender), Some(receiver)) => (sender, receiver),
            _ => return Err(AppError::NotFound("Sender or receiver not found.".to_string())),
        };

        if sender.is_friend_of(receiver_id) || receiver.is_friend_of(sender_id) {
            return Err(AppError::ValidationError("Users are already friends.".to_string()));
        }

        let request = state.friend_repository.insert_request(sender_id, receiver_id).await?;
        info!("User {} sent a friend request to user {}.", sender_id, receiver_id);
        Ok(request.to_dto())
    }

    /// Resolves a PENDING request. Only the receiver may respond, and only
    /// once. Acceptance updates both friends sets inside the same transaction
    /// as the status write, so a crash can never leave a one-sided
    /// friendship.
    pub async fn respond_to_friend_request(
        state: Arc<AppState>,
        request_id: i64,
        responder_id: i64,
        new_status: FriendRequestStatus,
    ) -> Result<FriendRequestDto, AppError> {
        if new_status == FriendRequestStatus::Pending {
            return Err(AppError::ValidationError("Response must be accepted or rejected.".to_string()));
        }

        let mut tx = state.friend_repository.start_transaction().await?;

        let request = state.friend_repository
            .find_pending_for_receiver(&mut tx, request_id, responder_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Friend request not found.".to_string()))?;

        let updated = state.friend_repository.update_status(&mut tx, request_id, new_status).await?;

        if new_status == FriendRequestStatus::Accepted {
            add_mutual_friends(&state, &mut tx, request.sender_id, request.receiver_id).await?;
        }

        tx.commit().await?;
        info!("User {} {:?} friend request {}.", responder_id, new_status, request_id);
        Ok(updated.to_dto())
    }

    pub async fn get_friends(state: Arc<AppState>, user_id: i64) -> Result<Vec<UserSummary>, AppError> {
        let user = state.user_repository.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::NotFound("User not found.".to_string())
        })?;
        let friends = state.user_repository.select_summaries(&user.friend_ids()).await?;
        Ok(friends)
    }

    pub async fn get_friend_requests(
        state: Arc<AppState>,
        user_id: i64,
        params: FriendRequestQueryParams,
    ) -> Result<Page<FriendRequestListItem>, AppError> {
        let page_params = PageParams { page: params.page, limit: params.limit };
        let (rows, total) = tokio::try_join!( //executing 2 queries async
            state.friend_repository.select_page_for_user(user_id, params.status, page_params.limit(), page_params.offset()),
            state.friend_repository.count_for_user(user_id, params.status)
        )?;
        let items = rows.iter().map(|row| row.to_dto()).collect();
        Ok(Page::new(items, total, &page_params))
    }

}

/// Both sides gain the other's id, with set semantics. Runs on the caller's
/// transaction so the two writes land together or not at all.
async fn add_mutual_friends(
    state: &Arc<AppState>,
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    sender_id: i64,
    receiver_id: i64,
) -> Result<(), AppError> {
    let sender_friends = state.user_repository.select_friends(&mut *tx, sender_id).await?.ok_or_else(|| {
        AppError::NotFound("Sender not found.".to_string())
    })?;
    let receiver_friends = state.user_repository.select_friends(&mut *tx, receiver_id).await?.ok_or_else(|| {
        AppError::NotFound("Receiver not found.".to_string())
    })?;

    let sender_json = insert_friend_id(&sender_friends, receiver_id)?;
    let receiver_json = insert_friend_id(&receiver_friends, sender_id)?;

    state.user_repository.update_friends(&mut *tx, sender_id, &sender_json).await?;
    state.user_repository.update_friends(&mut *tx, receiver_id, &receiver_json).await?;
    Ok(())
}

fn insert_friend_id(friends_json: &str, friend_id: i64) -> Result<String, AppError> {
    let mut ids: Vec<i64> = serde_json::from_str(friends_json).unwrap_or_default();
    if !ids.contains(&friend_id) {
        ids.push(friend_id);
    }
    serde_json::to_string(&ids).map_err(|err| {
        AppError::ProcessingError(format!("Can't serialize friends set: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{seed_user, test_state};

    #[tokio::test]
    async fn self_request_is_rejected() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;

        let result = FriendService::send_friend_request(state, a, a).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn crossed_pending_requests_are_rejected() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        FriendService::send_friend_request(state.clone(), a, b).await.unwrap();
        // same direction again
        let dup = FriendService::send_friend_request(state.clone(), a, b).await;
        assert!(matches!(dup, Err(AppError::ValidationError(_))));
        // crossed direction
        let crossed = FriendService::send_friend_request(state, b, a).await;
        assert!(matches!(crossed, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn request_to_missing_user_is_not_found() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;

        let result = FriendService::send_friend_request(state, a, 9999).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn accept_updates_both_friends_sets() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let request = FriendService::send_friend_request(state.clone(), a, b).await.unwrap();
        assert_eq!(request.status, FriendRequestStatus::Pending);

        let resolved = FriendService::respond_to_friend_request(state.clone(), request.id, b, FriendRequestStatus::Accepted).await.unwrap();
        assert_eq!(resolved.status, FriendRequestStatus::Accepted);

        let friends_of_a = FriendService::get_friends(state.clone(), a).await.unwrap();
        let friends_of_b = FriendService::get_friends(state.clone(), b).await.unwrap();
        assert!(friends_of_a.iter().any(|f| f.id == b));
        assert!(friends_of_b.iter().any(|f| f.id == a));

        // existing friendship now blocks a fresh request
        let again = FriendService::send_friend_request(state, a, b).await;
        assert!(matches!(again, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn interrupted_accept_leaves_no_partial_state() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let request = FriendService::send_friend_request(state.clone(), a, b).await.unwrap();

        // replay the accept's write sequence but fail after the first
        // friends-set write: dropping the transaction stands in for a crash
        {
            let mut tx = state.friend_repository.start_transaction().await.unwrap();
            state.friend_repository.find_pending_for_receiver(&mut tx, request.id, b).await.unwrap().unwrap();
            state.friend_repository.update_status(&mut tx, request.id, FriendRequestStatus::Accepted).await.unwrap();
            let friends = state.user_repository.select_friends(&mut tx, a).await.unwrap().unwrap();
            let patched = insert_friend_id(&friends, b).unwrap();
            state.user_repository.update_friends(&mut tx, a, &patched).await.unwrap();
        }

        // nothing of the half-finished accept survives
        let friends_of_a = FriendService::get_friends(state.clone(), a).await.unwrap();
        let friends_of_b = FriendService::get_friends(state.clone(), b).await.unwrap();
        assert!(friends_of_a.is_empty());
        assert!(friends_of_b.is_empty());

        // the request is still pending and resolves normally afterwards
        let resolved = FriendService::respond_to_friend_request(state.clone(), request.id, b, FriendRequestStatus::Accepted).await.unwrap();
        assert_eq!(resolved.status, FriendRequestStatus::Accepted);
        assert!(FriendService::get_friends(state, a).await.unwrap().iter().any(|f| f.id == b));
    }

    #[tokio::test]
    async fn only_the_receiver_may_respond_and_only_once() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let request = FriendService::send_friend_request(state.clone(), a, b).await.unwrap();

        // the sender cannot answer their own request
        let by_sender = FriendService::respond_to_friend_request(state.clone(), request.id, a, FriendRequestStatus::Accepted).await;
        assert!(matches!(by_sender, Err(AppError::NotFound(_))));

        FriendService::respond_to_friend_request(state.clone(), request.id, b, FriendRequestStatus::Rejected).await.unwrap();

        // terminal states never transition again
        let twice = FriendService::respond_to_friend_request(state.clone(), request.id, b, FriendRequestStatus::Accepted).await;
        assert!(matches!(twice, Err(AppError::NotFound(_))));

        // a rejected history does not block a new request
        FriendService::send_friend_request(state, b, a).await.unwrap();
    }

    #[tokio::test]
    async fn respond_to_unknown_request_is_not_found() {
        let state = test_state().await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;

        let result = FriendService::respond_to_friend_request(state, 424242, b, FriendRequestStatus::Accepted).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn request_listing_filters_by_status() {
        let state = test_state().await;
        let a = seed_user(&state, "Alice", "alice@example.org").await;
        let b = seed_user(&state, "Bob", "bob@example.org").await;
        let c = seed_user(&state, "Carol", "carol@example.org").await;

        let first = FriendService::send_friend_request(state.clone(), a, b).await.unwrap();
        FriendService::send_friend_request(state.clone(), c, b).await.unwrap();
        FriendService::respond_to_friend_request(state.clone(), first.id, b, FriendRequestStatus::Accepted).await.unwrap();

        let pending = FriendService::get_friend_requests(state.clone(), b, FriendRequestQueryParams {
            status: Some(FriendRequestStatus::Pending),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(pending.items.len(), 1);
        assert_eq!(pending.items[0].sender.id, c);

        let all = FriendService::get_friend_requests(state, b, FriendRequestQueryParams::default()).await.unwrap();
        assert_eq!(all.meta.total_items, 2);
    }
}
