use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::core::EntityMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
}

/// The full user row. The credential hash and the one-time/refresh tokens
/// never leave the process, so this type is deliberately not serializable.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    /// JSON array of user ids, the materialized result of accepted requests.
    pub friends: String,
}

impl User {
    pub fn friend_ids(&self) -> Vec<i64> {
        serde_json::from_str(&self.friends).unwrap_or_default()
    }

    pub fn is_friend_of(&self, user_id: i64) -> bool {
        self.friend_ids().contains(&user_id)
    }

    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: self.meta.id,
            created_at: self.meta.created_at,
            updated_at: self.meta.updated_at,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            email_verified: self.email_verified,
            phone: self.phone.clone(),
            profile_picture: self.profile_picture.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            friends: self.friend_ids(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub friends: Vec<i64>,
}

/// The short profile attached wherever another user is referenced.
#[derive(Debug, Serialize, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// Insert payload for the user repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: Option<UserStatus>,
}
