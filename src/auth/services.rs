use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{LoginRequest, RegisterRequest, TokenPayload},
    password::{hash_password_blocking, verify_password_blocking},
    repo::{TokenRepository, UserRepository},
    repo_types::{NewUser, User},
    tokens::{generate_token, hash_token, API_TOKEN_NAME},
};
use crate::error::{AppError, RepositoryError};
use crate::validation::{is_valid_email, required_string, Field, ValidationErrors};

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token_id: Uuid,
}

/// Credential checks and token lifecycle.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenRepository>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<TokenPayload, AppError> {
        let mut errors = ValidationErrors::new();

        let name =
            required_string(req.name.as_ref(), "name", &mut errors).map(|n| n.trim().to_string());

        let email = match Field::of(req.email.as_ref()) {
            Field::Missing => {
                errors.required("email");
                None
            }
            Field::Other => {
                errors.add("email", "The email field must be a valid email address.");
                None
            }
            Field::Text(raw) => {
                let email = normalize_email(raw);
                if !is_valid_email(&email) {
                    errors.add("email", "The email field must be a valid email address.");
                } else if self.users.find_by_email(&email).await?.is_some() {
                    errors.add("email", "The email has already been taken.");
                }
                Some(email)
            }
        };

        let password =
            required_string(req.password.as_ref(), "password", &mut errors).map(str::to_string);

        if let Some(confirm) = required_string(req.c_password.as_ref(), "c_password", &mut errors) {
            if password.as_deref() != Some(confirm) {
                errors.add("c_password", "The c_password field must match password.");
            }
        }

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AppError::Validation(errors));
        };
        if !errors.is_empty() {
            warn!(fields = ?errors.fields().collect::<Vec<_>>(), "registration rejected");
            return Err(AppError::Validation(errors));
        }

        let password_hash = hash_password_blocking(password).await?;
        let user = match self
            .users
            .create(NewUser {
                name,
                email,
                password_hash,
            })
            .await
        {
            Ok(u) => u,
            // Lost a race against a concurrent registration.
            Err(RepositoryError::ConstraintViolation(_)) => {
                let mut errors = ValidationErrors::new();
                errors.add("email", "The email has already been taken.");
                return Err(AppError::Validation(errors));
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.issue(&user).await?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(TokenPayload {
            token,
            name: user.name,
        })
    }

    /// Verifies credentials, revokes every previous token of the user and issues one new token.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenPayload, AppError> {
        let (Some(email), Some(password)) = (
            Field::of(req.email.as_ref()).text().map(normalize_email),
            Field::of(req.password.as_ref()).text().map(str::to_string),
        ) else {
            return Err(AppError::InvalidCredentials);
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let plain = generate_token();
        self.tokens
            .replace_all(user.id, API_TOKEN_NAME, &hash_token(&plain))
            .await?;

        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(TokenPayload {
            token: plain,
            name: user.name,
        })
    }

    /// Deletes only the token that authenticated this request.
    pub async fn logout(&self, current: &CurrentUser) -> Result<(), AppError> {
        self.tokens.delete(current.token_id).await?;
        info!(user_id = %current.user.id, token_id = %current.token_id, "user logged out");
        Ok(())
    }

    pub async fn authenticate(&self, bearer: &str) -> Result<CurrentUser, AppError> {
        if bearer.is_empty() {
            return Err(AppError::Unauthenticated);
        }
        let Some(token) = self.tokens.find_by_hash(&hash_token(bearer)).await? else {
            debug!("unknown bearer token");
            return Err(AppError::Unauthenticated);
        };
        let Some(user) = self.users.find_by_id(token.user_id).await? else {
            warn!(token_id = %token.id, user_id = %token.user_id, "token owner missing");
            return Err(AppError::Unauthenticated);
        };
        Ok(CurrentUser {
            user,
            token_id: token.id,
        })
    }

    async fn issue(&self, user: &User) -> Result<String, AppError> {
        let plain = generate_token();
        self.tokens
            .create(user.id, API_TOKEN_NAME, &hash_token(&plain))
            .await?;
        debug!(user_id = %user.id, "token issued");
        Ok(plain)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
