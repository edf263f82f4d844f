use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::error::RepositoryError;
use crate::expenses::repo_types::{ExpenseChanges, ExpenseWithOwner, NewExpense};

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All expenses owned by `user_id`, oldest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ExpenseWithOwner>, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<ExpenseWithOwner>, RepositoryError>;

    async fn create(&self, expense: NewExpense) -> Result<ExpenseWithOwner, RepositoryError>;

    /// Applies only the supplied fields. `None` when the row does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<ExpenseWithOwner>, RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

// Every read goes through this projection so the owner is always joined in.
const SELECT_WITH_OWNER: &str = r#"
    SELECT e.id, e.user_id, e.description, e.value, e.date, e.created_at, e.updated_at,
           u.id AS owner_id, u.name AS owner_name, u.email AS owner_email
"#;

#[async_trait]
impl ExpenseRepository for PgStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ExpenseWithOwner>, RepositoryError> {
        let sql = format!(
            r#"{SELECT_WITH_OWNER}
            FROM expenses e
            JOIN users u ON u.id = e.user_id
            WHERE e.user_id = $1
            ORDER BY e.created_at ASC, e.id ASC"#
        );
        let rows = sqlx::query_as::<_, ExpenseWithOwner>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ExpenseWithOwner>, RepositoryError> {
        let sql = format!(
            r#"{SELECT_WITH_OWNER}
            FROM expenses e
            JOIN users u ON u.id = e.user_id
            WHERE e.id = $1"#
        );
        let row = sqlx::query_as::<_, ExpenseWithOwner>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, expense: NewExpense) -> Result<ExpenseWithOwner, RepositoryError> {
        let sql = format!(
            r#"WITH e AS (
                INSERT INTO expenses (user_id, description, value, date)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {SELECT_WITH_OWNER}
            FROM e
            JOIN users u ON u.id = e.user_id"#
        );
        sqlx::query_as::<_, ExpenseWithOwner>(&sql)
            .bind(expense.user_id)
            .bind(&expense.description)
            .bind(expense.value)
            .bind(expense.date)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<ExpenseWithOwner>, RepositoryError> {
        let sql = format!(
            r#"WITH e AS (
                UPDATE expenses
                SET description = COALESCE($2, description),
                    value       = COALESCE($3, value),
                    date        = COALESCE($4, date),
                    user_id     = COALESCE($5, user_id),
                    updated_at  = now()
                WHERE id = $1
                RETURNING *
            )
            {SELECT_WITH_OWNER}
            FROM e
            JOIN users u ON u.id = e.user_id"#
        );
        sqlx::query_as::<_, ExpenseWithOwner>(&sql)
            .bind(id)
            .bind(changes.description)
            .bind(changes.value)
            .bind(changes.date)
            .bind(changes.user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM expenses WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
