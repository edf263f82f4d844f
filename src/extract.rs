use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AppError;

/// JSON request body read as a field map.
///
/// The content type is not checked. A body that is empty, malformed or not a
/// JSON object yields no fields, so the handler's own rules decide the
/// response (422 for missing fields, 401 for login).
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let fields = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                debug!(kind = kind(&other), "request body is not an object; no fields read");
                Map::new()
            }
            Err(e) => {
                if !bytes.is_empty() {
                    debug!(error = %e, "request body is not JSON; no fields read");
                }
                Map::new()
            }
        };

        serde_json::from_value(Value::Object(fields))
            .map(JsonBody)
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("decode request fields: {e}")).into_response()
            })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
