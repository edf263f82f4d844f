use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{AccessToken, NewUser, User};
use crate::db::PgStore;
use crate::error::RepositoryError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with `ConstraintViolation` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError>;

    /// Delete every token of `user_id`, then insert the new one, atomically.
    async fn replace_all(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>, RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

const INSERT_TOKEN: &str = r#"
    INSERT INTO personal_access_tokens (user_id, name, token_hash)
    VALUES ($1, $2, $3)
    RETURNING id, user_id, name, token_hash, created_at
"#;

#[async_trait]
impl TokenRepository for PgStore {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError> {
        sqlx::query_as::<_, AccessToken>(INSERT_TOKEN)
            .bind(user_id)
            .bind(name)
            .bind(token_hash)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn replace_all(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError> {
        let mut tx = self.db.begin().await?;

        sqlx::query(r#"DELETE FROM personal_access_tokens WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let token = sqlx::query_as::<_, AccessToken>(INSERT_TOKEN)
            .bind(user_id)
            .bind(name)
            .bind(token_hash)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        tx.commit().await?;
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>, RepositoryError> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            SELECT id, user_id, name, token_hash, created_at
            FROM personal_access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(token)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM personal_access_tokens WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
