use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for user registration. Fields stay untyped so that missing or
/// mistyped values are reported by validation.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
    #[serde(default)]
    pub c_password: Option<Value>,
}

/// Request body for login. Anything other than two strings fails as bad credentials.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

/// Issued token plus the display name of its owner.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPayload {
    pub token: String,
    pub name: String,
}

/// Envelope used by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: TokenPayload,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
    pub message: &'static str,
}
