use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::EntityMeta;
use crate::users::model::UserSummary;

/// PENDING is the only state a request can transition out of; ACCEPTED and
/// REJECTED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, FromRow)]
pub struct FriendRequest {
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
}

impl FriendRequest {
    pub fn to_dto(&self) -> FriendRequestDto {
        FriendRequestDto {
            id: self.meta.id,
            created_at: self.meta.created_at,
            updated_at: self.meta.updated_at,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            status: self.status,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestDto {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
}

/// Flat row with both profiles joined in, for the request listing.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRequestRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_profile_picture: Option<String>,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_profile_picture: Option<String>,
}

impl FriendRequestRow {
    pub fn to_dto(&self) -> FriendRequestListItem {
        FriendRequestListItem {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            status: self.status,
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
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestListItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: FriendRequestStatus,
    pub sender: UserSummary,
    pub receiver: UserSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestPayload {
    pub receiver_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondFriendRequestPayload {
    pub request_id: i64,
    pub status: FriendRequestStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct FriendRequestQueryParams {
    pub status: Option<FriendRequestStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
