use rust_decimal::Decimal;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub value: Decimal,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Public part of the owning user, loaded together with every expense.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Owner {
    #[sqlx(rename = "owner_id")]
    pub id: Uuid,
    #[sqlx(rename = "owner_name")]
    pub name: String,
    #[sqlx(rename = "owner_email")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ExpenseWithOwner {
    #[sqlx(flatten)]
    pub expense: Expense,
    #[sqlx(flatten)]
    pub owner: Owner,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub description: String,
    pub value: Decimal,
    pub date: Date,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub date: Option<Date>,
    pub user_id: Option<Uuid>,
}
