use std::sync::Arc;

use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::auth::{repo::UserRepository, repo_types::User};
use crate::error::AppError;
use crate::expenses::{
    dto::{ExpenseInput, ExpenseResource},
    policy::{self, Ability},
    repo::ExpenseRepository,
    repo_types::{ExpenseChanges, ExpenseWithOwner, NewExpense},
    validation::{self, ExpenseFields, Presence},
};
use crate::notifications::{expense_created, Address, Notifier};
use crate::validation::ValidationErrors;

const MODEL: &str = "Expense";

/// Expense CRUD scoped to the calling user.
#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Notifier,
    mail_from: Address,
    app_url: Arc<str>,
}

impl ExpenseService {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Notifier,
        mail_from: Address,
        app_url: &str,
    ) -> Self {
        Self {
            expenses,
            users,
            notifier,
            mail_from,
            app_url: Arc::from(app_url),
        }
    }

    pub async fn list(&self, caller: &User) -> Result<Vec<ExpenseResource>, AppError> {
        let rows = self.expenses.list_for_user(caller.id).await?;
        Ok(rows.into_iter().map(ExpenseResource::from).collect())
    }

    pub async fn create(
        &self,
        caller: &User,
        input: ExpenseInput,
    ) -> Result<ExpenseResource, AppError> {
        let fields = self.validate(&input, Presence::Required).await?;
        let ExpenseFields {
            description: Some(description),
            value: Some(value),
            date: Some(date),
            user_id: Some(user_id),
        } = fields
        else {
            // Unreachable once validation passed with every field required.
            return Err(AppError::Internal(anyhow::anyhow!(
                "required expense field missing after validation"
            )));
        };

        if !policy::may_assign_owner(caller, user_id) {
            return Err(AppError::Forbidden);
        }

        let row = self
            .expenses
            .create(NewExpense {
                user_id,
                description,
                value,
                date,
            })
            .await?;
        info!(expense_id = %row.expense.id, user_id = %row.expense.user_id, "expense created");

        self.notify_created(&row);
        Ok(row.into())
    }

    pub async fn show(&self, caller: &User, id: &str) -> Result<ExpenseResource, AppError> {
        let row = self.find(id).await?;
        policy::authorize(caller, Ability::View, &row.expense)?;
        Ok(row.into())
    }

    pub async fn update(
        &self,
        caller: &User,
        id: &str,
        input: ExpenseInput,
    ) -> Result<ExpenseResource, AppError> {
        let current = self.find(id).await?;
        policy::authorize(caller, Ability::Update, &current.expense)?;

        let fields = self.validate(&input, Presence::Optional).await?;
        if let Some(owner) = fields.user_id {
            if !policy::may_assign_owner(caller, owner) {
                return Err(AppError::Forbidden);
            }
        }

        let id = current.expense.id;
        let row = self
            .expenses
            .update(
                id,
                ExpenseChanges {
                    description: fields.description,
                    value: fields.value,
                    date: fields.date,
                    user_id: fields.user_id,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found(MODEL, id))?;
        info!(expense_id = %id, "expense updated");
        Ok(row.into())
    }

    pub async fn destroy(&self, caller: &User, id: &str) -> Result<(), AppError> {
        let row = self.find(id).await?;
        policy::authorize(caller, Ability::Delete, &row.expense)?;

        if !self.expenses.delete(row.expense.id).await? {
            return Err(AppError::not_found(MODEL, row.expense.id));
        }
        info!(expense_id = %row.expense.id, "expense deleted");
        Ok(())
    }

    /// Existence is resolved before any authorization check.
    async fn find(&self, raw_id: &str) -> Result<ExpenseWithOwner, AppError> {
        let Ok(id) = Uuid::parse_str(raw_id) else {
            return Err(AppError::not_found(MODEL, raw_id));
        };
        self.expenses
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(MODEL, id))
    }

    async fn validate(
        &self,
        input: &ExpenseInput,
        presence: Presence,
    ) -> Result<ExpenseFields, AppError> {
        let (fields, mut errors) = validation::check(input, presence, today());
        if let Some(user_id) = fields.user_id {
            if self.users.find_by_id(user_id).await?.is_none() {
                validation::invalid_user(&mut errors);
            }
        }
        into_result(fields, errors)
    }

    fn notify_created(&self, row: &ExpenseWithOwner) {
        let message = expense_created::render(row, self.mail_from.clone(), &self.app_url);
        self.notifier.dispatch(message);
    }
}

fn into_result(fields: ExpenseFields, errors: ValidationErrors) -> Result<ExpenseFields, AppError> {
    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
