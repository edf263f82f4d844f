//! In-process store implementing every repository trait.
//!
//! Enforces the same constraints as the SQL schema (unique email, unique
//! token hash, expense owner must exist) so service code behaves identically
//! against either backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{TokenRepository, UserRepository};
use crate::auth::repo_types::{AccessToken, NewUser, User};
use crate::error::RepositoryError;
use crate::expenses::repo::ExpenseRepository;
use crate::expenses::repo_types::{Expense, ExpenseChanges, ExpenseWithOwner, NewExpense, Owner};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<AccessToken>,
    expenses: Vec<Expense>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn with_owner(&self, expense: &Expense) -> Result<ExpenseWithOwner, RepositoryError> {
        let owner = self.user(expense.user_id).ok_or_else(|| {
            RepositoryError::ConstraintViolation(format!(
                "expense {} references missing user {}",
                expense.id, expense.user_id
            ))
        })?;
        Ok(ExpenseWithOwner {
            expense: expense.clone(),
            owner: Owner {
                id: owner.id,
                name: owner.name.clone(),
                email: owner.email.clone(),
            },
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_token(tables: &mut Tables, user_id: Uuid, name: &str, token_hash: &str) -> Result<AccessToken, RepositoryError> {
        if tables.user(user_id).is_none() {
            return Err(RepositoryError::ConstraintViolation(format!(
                "token references missing user {user_id}"
            )));
        }
        if tables.tokens.iter().any(|t| t.token_hash == token_hash) {
            return Err(RepositoryError::ConstraintViolation(
                "duplicate token hash".into(),
            ));
        }
        let token = AccessToken {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "email {} already exists",
                user.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().user(id).cloned())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError> {
        Self::insert_token(&mut self.lock(), user_id, name, token_hash)
    }

    async fn replace_all(
        &self,
        user_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError> {
        let mut tables = self.lock();
        let kept: Vec<AccessToken> = tables
            .tokens
            .iter()
            .filter(|t| t.user_id != user_id)
            .cloned()
            .collect();
        let previous = std::mem::replace(&mut tables.tokens, kept);
        match Self::insert_token(&mut tables, user_id, name, token_hash) {
            Ok(token) => Ok(token),
            Err(e) => {
                // Roll back the deletion.
                tables.tokens = previous;
                Err(e)
            }
        }
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>, RepositoryError> {
        Ok(self
            .lock()
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tables = self.lock();
        let before = tables.tokens.len();
        tables.tokens.retain(|t| t.id != id);
        Ok(tables.tokens.len() != before)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ExpenseWithOwner>, RepositoryError> {
        let tables = self.lock();
        tables
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| tables.with_owner(e))
            .collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<ExpenseWithOwner>, RepositoryError> {
        let tables = self.lock();
        tables
            .expenses
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.with_owner(e))
            .transpose()
    }

    async fn create(&self, expense: NewExpense) -> Result<ExpenseWithOwner, RepositoryError> {
        let mut tables = self.lock();
        let now = OffsetDateTime::now_utc();
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: expense.user_id,
            description: expense.description,
            value: expense.value,
            date: expense.date,
            created_at: now,
            updated_at: now,
        };
        let row = tables.with_owner(&expense)?;
        tables.expenses.push(expense);
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<ExpenseWithOwner>, RepositoryError> {
        let mut tables = self.lock();
        let Some(index) = tables.expenses.iter().position(|e| e.id == id) else {
            return Ok(None);
        };

        let mut updated = tables.expenses[index].clone();
        if let Some(description) = changes.description {
            updated.description = description;
        }
        if let Some(value) = changes.value {
            updated.value = value;
        }
        if let Some(date) = changes.date {
            updated.date = date;
        }
        if let Some(user_id) = changes.user_id {
            updated.user_id = user_id;
        }
        updated.updated_at = OffsetDateTime::now_utc();

        let row = tables.with_owner(&updated)?;
        tables.expenses[index] = updated;
        Ok(Some(row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tables = self.lock();
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        Ok(tables.expenses.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    async fn user(store: &MemoryStore, email: &str) -> User {
        UserRepository::create(
            store,
            NewUser {
                name: "Jane".into(),
                email: email.into(),
                password_hash: "h".into(),
            },
        )
        .await
        .unwrap()
    }

    fn new_expense(user_id: Uuid) -> NewExpense {
        NewExpense {
            user_id,
            description: "Aluguel".into(),
            value: Decimal::new(150000, 2),
            date: OffsetDateTime::now_utc().date(),
        }
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryStore::new();
        user(&store, "jane@x.com").await;
        let err = UserRepository::create(
            &store,
            NewUser {
                name: "Other".into(),
                email: "jane@x.com".into(),
                password_hash: "h".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn expense_owner_must_exist() {
        let store = MemoryStore::new();
        let err = ExpenseRepository::create(&store, new_expense(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
        let jane = user(&store, "jane@x.com").await;
        assert!(store.list_for_user(jane.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_all_leaves_exactly_one_token() {
        let store = MemoryStore::new();
        let jane = user(&store, "jane@x.com").await;
        let john = user(&store, "john@x.com").await;
        TokenRepository::create(&store, jane.id, "api", "a").await.unwrap();
        TokenRepository::create(&store, jane.id, "api", "b").await.unwrap();
        TokenRepository::create(&store, john.id, "api", "c").await.unwrap();

        store.replace_all(jane.id, "api", "d").await.unwrap();

        assert!(store.find_by_hash("a").await.unwrap().is_none());
        assert!(store.find_by_hash("b").await.unwrap().is_none());
        assert!(store.find_by_hash("c").await.unwrap().is_some());
        assert_eq!(store.find_by_hash("d").await.unwrap().unwrap().user_id, jane.id);
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = MemoryStore::new();
        let jane = user(&store, "jane@x.com").await;
        let created = ExpenseRepository::create(&store, new_expense(jane.id))
            .await
            .unwrap();

        let updated = store
            .update(
                created.expense.id,
                ExpenseChanges {
                    description: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.expense.description, "x");
        assert_eq!(updated.expense.value, created.expense.value);
        assert_eq!(updated.expense.date, created.expense.date);

        assert!(store
            .update(Uuid::new_v4(), ExpenseChanges::default())
            .await
            .unwrap()
            .is_none());
    }
}
