use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Field-keyed validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The common "field is required" message.
    pub fn required(&mut self, field: &str) {
        self.add(field, format!("The {} field is required.", field));
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// How a raw request field looks to the "required" and "string" rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// Absent, `null`, or a blank string.
    Missing,
    Text(&'a str),
    /// Present but not a string.
    Other,
}

impl<'a> Field<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Field::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => Field::Missing,
            Some(Value::String(s)) => Field::Text(s),
            Some(_) => Field::Other,
        }
    }

    pub fn text(self) -> Option<&'a str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Applies `required|string` and returns the text when both pass.
pub fn required_string<'a>(
    value: Option<&'a Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match Field::of(value) {
        Field::Missing => {
            errors.required(field);
            None
        }
        Field::Other => {
            errors.add(field, format!("The {} field must be a string.", field));
            None
        }
        Field::Text(s) => Some(s),
    }
}
