use async_trait::async_trait;
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error>;

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self) -> Result<i64, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        full_name: T,
        username: T,
        email: T,
        password: T,
        otp: T,
        otp_expires_at: DateTime<Utc>,
    ) -> Result<User, sqlx::Error>;

    async fn save_owner_user(
        &self,
        full_name: String,
        username: String,
        email: String,
        password: String,
        phone_number: Option<String>,
        whatsapp_number: Option<String>,
        agent_title: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn verify_user_otp(&self, email: &str, otp: &str) -> Result<Option<User>, sqlx::Error>;

    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        full_name: Option<String>,
        username: Option<String>,
        email: Option<String>,
        phone_number: Option<String>,
        whatsapp_number: Option<String>,
        agent_title: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_avatar(&self, user_id: Uuid, avatar: &str) -> Result<User, sqlx::Error>;

    async fn apply_owner_changes(
        &self,
        user_id: Uuid,
        full_name: Option<&str>,
        username: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        whatsapp_number: Option<&str>,
        agent_title: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT
                    id, full_name, username, email, password,
                    phone_number, whatsapp_number, agent_title, avatar,
                    is_verified, otp, otp_expires_at, refresh_token,
                    created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(username) = username {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT
                    id, full_name, username, email, password,
                    phone_number, whatsapp_number, agent_title, avatar,
                    is_verified, otp, otp_expires_at, refresh_token,
                    created_at, updated_at
                FROM users
                WHERE username = $1
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT
                    id, full_name, username, email, password,
                    phone_number, whatsapp_number, agent_title, avatar,
                    is_verified, otp, otp_expires_at, refresh_token,
                    created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            FROM users
            ORDER BY created_at DESC LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        full_name: T,
        username: T,
        email: T,
        password: T,
        otp: T,
        otp_expires_at: DateTime<Utc>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, username, email, password, otp, otp_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(full_name.into())
        .bind(username.into())
        .bind(email.into())
        .bind(password.into())
        .bind(otp.into())
        .bind(otp_expires_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn save_owner_user(
        &self,
        full_name: String,
        username: String,
        email: String,
        password: String,
        phone_number: Option<String>,
        whatsapp_number: Option<String>,
        agent_title: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(username)
        .bind(email)
        .bind(password)
        .bind(phone_number)
        .bind(whatsapp_number)
        .bind(agent_title)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await
    }

    async fn verify_user_otp(&self, email: &str, otp: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                otp = NULL,
                otp_expires_at = NULL,
                updated_at = NOW()
            WHERE email = $1 AND otp = $2 AND otp_expires_at > NOW()
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(otp)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        full_name: Option<String>,
        username: Option<String>,
        email: Option<String>,
        phone_number: Option<String>,
        whatsapp_number: Option<String>,
        agent_title: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                full_name = COALESCE($2, full_name),
                username = COALESCE($3, username),
                email = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                whatsapp_number = COALESCE($6, whatsapp_number),
                agent_title = COALESCE($7, agent_title),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(username)
        .bind(email)
        .bind(phone_number)
        .bind(whatsapp_number)
        .bind(agent_title)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_avatar(&self, user_id: Uuid, avatar: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET avatar = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await
    }

    // One batched write regardless of how many owner fields changed
    async fn apply_owner_changes(
        &self,
        user_id: Uuid,
        full_name: Option<&str>,
        username: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        whatsapp_number: Option<&str>,
        agent_title: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                full_name = COALESCE($2, full_name),
                username = COALESCE($3, username),
                email = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                whatsapp_number = COALESCE($6, whatsapp_number),
                agent_title = COALESCE($7, agent_title),
                avatar = COALESCE($8, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, full_name, username, email, password,
                phone_number, whatsapp_number, agent_title, avatar,
                is_verified, otp, otp_expires_at, refresh_token,
                created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(username)
        .bind(email)
        .bind(phone_number)
        .bind(whatsapp_number)
        .bind(agent_title)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await
    }
}
