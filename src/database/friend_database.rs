use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection, Transaction};
use crate::friends::model::{FriendRequest, FriendRequestRow, FriendRequestStatus};

#[derive(Debug, Clone)]
pub struct FriendRequestDatabase {
    pool: Pool<Sqlite>,
}

impl FriendRequestDatabase {

    pub fn new(pool: Pool<Sqlite>) -> Self {
        FriendRequestDatabase { pool }
    }

    pub async fn start_transaction(&self) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(tx)
    }

    /// A pending edge blocks new requests in either direction.
    pub async fn find_pending_between(&self, user_a: i64, user_b: i64) -> Result<Option<FriendRequest>, sqlx::Error> {
        sqlx::query_as::<_, FriendRequest>(
            r#"
            SELECT * FROM friend_requests
            WHERE status = 'pending'
              AND ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?))
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_optional(&self.pool).await
    }

    pub async fn insert_request(&self, sender_id: i64, receiver_id: i64) -> Result<FriendRequest, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, FriendRequest>(
            r#"
            INSERT INTO friend_requests (created_at, updated_at, sender_id, receiver_id, status)
            VALUES (?, ?, ?, ?, 'pending')
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool).await
    }

    /// Only a PENDING request addressed to the responder is answerable.
    pub async fn find_pending_for_receiver(&self, conn: &mut SqliteConnection, request_id: i64, receiver_id: i64) -> Result<Option<FriendRequest>, sqlx::Error> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE id = ? AND receiver_id = ? AND status = 'pending'",
        )
        .bind(request_id)
        .bind(receiver_id)
        .fetch_optional(&mut *conn).await
    }

    pub async fn update_status(&self, conn: &mut SqliteConnection, request_id: i64, status: FriendRequestStatus) -> Result<FriendRequest, sqlx::Error> {
        sqlx::query_as::<_, FriendRequest>(
            "UPDATE friend_requests SET updated_at = ?, status = ? WHERE id = ? RETURNING *",
        )
        .bind(Utc::now())
        .bind(status)
        .bind(request_id)
        .fetch_one(&mut *conn).await
    }

    pub async fn count_for_user(&self, user_id: i64, status: Option<FriendRequestStatus>) -> Result<i64, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) FROM friend_requests WHERE (sender_id = ",
        );
        builder.push_bind(user_id);
        builder.push(" OR receiver_id = ");
        builder.push_bind(user_id);
        builder.push(")");
        if let Some(status) = status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        builder.build_query_scalar().fetch_one(&self.pool).await
    }

    pub async fn select_page_for_user(
        &self,
        user_id: i64,
        status: Option<FriendRequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FriendRequestRow>, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT fr.id, fr.created_at, fr.updated_at, fr.sender_id, fr.receiver_id, fr.status,
                   s.name AS sender_name, s.email AS sender_email, s.profile_picture AS sender_profile_picture,
                   r.name AS receiver_name, r.email AS receiver_email, r.profile_picture AS receiver_profile_picture
            FROM friend_requests fr
            JOIN users s ON s.id = fr.sender_id
            JOIN users r ON r.id = fr.receiver_id
            WHERE (fr.sender_id = "#,
        );
        builder.push_bind(user_id);
        builder.push(" OR fr.receiver_id = ");
        builder.push_bind(user_id);
        builder.push(")");
        if let Some(status) = status {
            builder.push(" AND fr.status = ");
            builder.push_bind(status);
        }
        builder.push(" ORDER BY fr.created_at DESC, fr.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder.build_query_as::<FriendRequestRow>().fetch_all(&self.pool).await
    }

}
