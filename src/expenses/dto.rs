use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::expenses::format::{format_date, format_value};
use crate::expenses::repo_types::ExpenseWithOwner;

/// Raw body of store and update requests. Fields stay untyped so that
/// type mismatches are reported per field instead of rejecting the body.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseResource {
    pub id: Uuid,
    pub description: String,
    pub value: String,
    pub date: String,
    pub user: UserSummary,
}

impl From<ExpenseWithOwner> for ExpenseResource {
    fn from(row: ExpenseWithOwner) -> Self {
        Self {
            id: row.expense.id,
            value: format_value(&row.expense.value),
            date: format_date(&row.expense.date),
            description: row.expense.description,
            user: UserSummary {
                id: row.owner.id,
                name: row.owner.name,
                email: row.owner.email,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expenses::repo_types::{Expense, Owner};
    use rust_decimal::Decimal;
    use time::{macros::date, OffsetDateTime};

    #[test]
    fn resource_shape() {
        let now = OffsetDateTime::now_utc();
        let owner_id = Uuid::new_v4();
        let row = ExpenseWithOwner {
            expense: Expense {
                id: Uuid::new_v4(),
                user_id: owner_id,
                description: "Conta de luz".into(),
                value: Decimal::new(12050, 2),
                date: date!(2024 - 10 - 08),
                created_at: now,
                updated_at: now,
            },
            owner: Owner {
                id: owner_id,
                name: "Jane Doe".into(),
                email: "janedoe@example.com".into(),
            },
        };

        let json = serde_json::to_value(DataEnvelope::new(ExpenseResource::from(row))).unwrap();
        let data = &json["data"];
        assert_eq!(data["description"], "Conta de luz");
        assert_eq!(data["value"], "120,50");
        assert_eq!(data["date"], "2024-10-08");
        assert_eq!(data["user"]["id"], owner_id.to_string());
        assert_eq!(data["user"]["email"], "janedoe@example.com");
        assert!(data.get("user_id").is_none());
    }

    #[test]
    fn input_fields_default_to_absent() {
        let input: ExpenseInput = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert!(input.description.is_some());
        assert!(input.value.is_none());
        assert!(input.date.is_none());
        assert!(input.user_id.is_none());
    }
}
