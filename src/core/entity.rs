use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Common metadata every persisted entity embeds: the auto-assigned row id,
/// the creation timestamp and an update timestamp that is refreshed on every
/// mutating write.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
