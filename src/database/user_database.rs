use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use crate::users::model::{NewUser, User, UserSummary};

#[derive(Debug, Clone)]
pub struct UserDatabase {
    pool: Pool<Sqlite>,
}

impl UserDatabase {

    pub fn new(pool: Pool<Sqlite>) -> Self {
        UserDatabase { pool }
    }

    pub async fn insert_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (created_at, updated_at, name, email, password_hash, role, status, email_verified, phone)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.status)
        .bind(new_user.email_verified)
        .bind(&new_user.phone)
        .fetch_one(&self.pool).await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool).await
    }

    pub async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE refresh_token = ?")
            .bind(refresh_token)
            .fetch_optional(&self.pool).await
    }

    /// Looks up a user by the digest of a one-time token. Expired tokens never match.
    pub async fn find_by_token_digest(&self, digest: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token = ? AND reset_expires > ?")
            .bind(digest)
            .bind(Utc::now())
            .fetch_optional(&self.pool).await
    }

    pub async fn select_user_page(&self, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool).await
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool).await
    }

    pub async fn exists_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool).await
    }

    pub async fn update_profile(&self, user: &User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET updated_at = ?, name = ?, email = ?, phone = ?, profile_picture = ?,
                latitude = ?, longitude = ?, address = ?, city = ?, country = ?, status = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.profile_picture)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(&user.address)
        .bind(&user.city)
        .bind(&user.country)
        .bind(user.status)
        .bind(user.meta.id)
        .fetch_one(&self.pool).await
    }

    /// Re-registration of an unverified account overwrites its data and puts
    /// it back into the pending state.
    pub async fn overwrite_registration(&self, id: i64, name: &str, password_hash: &str, phone: &Option<String>) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET updated_at = ?, name = ?, password_hash = ?, phone = ?, status = 'pending', email_verified = 0
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(name)
        .bind(password_hash)
        .bind(phone)
        .bind(id)
        .fetch_one(&self.pool).await
    }

    pub async fn store_one_time_token(&self, id: i64, digest: &str, expires: DateTime<Utc>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET updated_at = ?, reset_token = ?, reset_expires = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(digest)
            .bind(expires)
            .bind(id)
            .execute(&self.pool).await?;
        Ok(())
    }

    pub async fn mark_email_verified(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET updated_at = ?, email_verified = 1, status = 'active', reset_token = NULL, reset_expires = NULL WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool).await?;
        Ok(())
    }

    pub async fn update_refresh_token(&self, id: i64, refresh_token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET updated_at = ?, refresh_token = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(refresh_token)
            .bind(id)
            .execute(&self.pool).await?;
        Ok(())
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET updated_at = ?, password_hash = ?, reset_token = NULL, reset_expires = NULL WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool).await?;
        Ok(())
    }

    pub async fn select_friends(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT friends FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn).await
    }

    pub async fn update_friends(&self, conn: &mut SqliteConnection, id: i64, friends_json: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET updated_at = ?, friends = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(friends_json)
            .bind(id)
            .execute(&mut *conn).await?;
        Ok(())
    }

    pub async fn select_summaries(&self, ids: &[i64]) -> Result<Vec<UserSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, email, profile_picture FROM users WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");
        let users = builder.build_query_as::<UserSummary>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn delete_user(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

}
