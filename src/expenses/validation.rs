use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::expenses::dto::ExpenseInput;
use crate::validation::ValidationErrors;

pub const DESCRIPTION_MAX_CHARS: usize = 191;
pub const VALUE_MAX_SCALE: u32 = 2;

/// Upper bound of a `NUMERIC(10,2)` column.
pub fn value_max() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Whether absent fields are errors (store) or simply unchanged (update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Typed, rule-checked fields. A field is `None` when it was absent or invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFields {
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub date: Option<Date>,
    pub user_id: Option<Uuid>,
}

/// Applies every rule that does not need storage. The caller still has to
/// check that `user_id` refers to an existing user.
pub fn check(
    input: &ExpenseInput,
    presence: Presence,
    today: Date,
) -> (ExpenseFields, ValidationErrors) {
    let mut errors = ValidationErrors::new();
    let fields = ExpenseFields {
        description: present(&input.description, "description", presence, &mut errors)
            .and_then(|v| description(v, &mut errors)),
        value: present(&input.value, "value", presence, &mut errors)
            .and_then(|v| value(v, &mut errors)),
        date: present(&input.date, "date", presence, &mut errors)
            .and_then(|v| date(v, today, &mut errors)),
        user_id: present(&input.user_id, "user_id", presence, &mut errors)
            .and_then(|v| user_id(v, &mut errors)),
    };
    (fields, errors)
}

pub fn invalid_user(errors: &mut ValidationErrors) {
    errors.add("user_id", "The selected user id is invalid.");
}

fn present<'a>(
    raw: &'a Option<Value>,
    field: &str,
    presence: Presence,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    let blank = match raw {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if blank {
        if presence == Presence::Required {
            errors.required(field);
        }
        None
    } else {
        raw.as_ref()
    }
}

fn description(raw: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add("description", "The description field must be a string.");
            return None;
        }
    };
    if text.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.add(
            "description",
            format!(
                "The description field must not be greater than {} characters.",
                DESCRIPTION_MAX_CHARS
            ),
        );
        return None;
    }
    Some(text)
}

fn value(raw: &Value, errors: &mut ValidationErrors) -> Option<Decimal> {
    let parsed = match raw {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    let Some(value) = parsed else {
        errors.add("value", "The value field must be a number.");
        return None;
    };
    if value <= Decimal::ZERO {
        errors.add("value", "The value field must be greater than 0.");
        return None;
    }
    let value = value.normalize();
    if value.scale() > VALUE_MAX_SCALE {
        errors.add("value", "The value field must have 0-2 decimal places.");
        return None;
    }
    if value > value_max() {
        errors.add(
            "value",
            format!("The value field must not be greater than {}.", value_max()),
        );
        return None;
    }
    Some(value)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn date(raw: &Value, today: Date, errors: &mut ValidationErrors) -> Option<Date> {
    let parsed = raw.as_str().map(str::trim).and_then(|s| {
        Date::parse(s, format_description!("[year]-[month]-[day]"))
            .ok()
            .or_else(|| OffsetDateTime::parse(s, &Rfc3339).ok().map(|dt| dt.date()))
    });
    let Some(date) = parsed else {
        errors.add("date", "The date field must be a valid date.");
        return None;
    };
    if date > today {
        errors.add("date", "The date field must be a date before or equal to now.");
        return None;
    }
    Some(date)
}

fn user_id(raw: &Value, errors: &mut ValidationErrors) -> Option<Uuid> {
    let parsed = raw.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok());
    if parsed.is_none() {
        invalid_user(errors);
    }
    parsed
}
