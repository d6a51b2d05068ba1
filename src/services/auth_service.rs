//! Authentication service - Handles account creation, login and token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::token_service::TokenService;
use crate::config::TOKEN_TYPE_BEARER;
use crate::domain::{password::DUMMY_HASH, NewUser, Password, ProfileView, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Issued token together with the account it identifies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: ProfileView,
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
}

/// Validated signup data.
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in
    async fn signup(&self, input: SignupInput) -> AppResult<AuthSession>;

    /// Verify credentials, record the login and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Resolve a bearer token to the user it identifies
    async fn authenticate(&self, token: &str) -> AppResult<User>;
}

/// Lower-case and trim an e-mail address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    fn session(&self, user: User) -> AppResult<AuthSession> {
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession {
            user: ProfileView::from(user),
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.tokens.expires_in(),
        })
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn signup(&self, input: SignupInput) -> AppResult<AuthSession> {
        let email = normalize_email(&input.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User with this email"));
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name: input.name,
                phone: input.phone.filter(|p| !p.is_empty()),
                location: input.location.filter(|l| !l.is_empty()),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User signed up");
        self.session(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let email = normalize_email(&email);
        let credentials = self.users.find_credentials_by_email(&email).await?;

        // Verify against a dummy hash for unknown accounts so response
        // timing does not reveal which e-mails are registered.
        let password_valid = match &credentials {
            Some(c) => c.password.verify(&password),
            None => Password::from_hash(DUMMY_HASH.to_string()).verify(&password),
        };

        let user = match credentials {
            Some(c) if password_valid && c.user.is_active => c.user,
            _ => {
                tracing::debug!(%email, "Login rejected");
                return Err(AppError::LoginFailed);
            }
        };

        let user = self.users.touch_last_login(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let user_id: Uuid = self.tokens.verify(token)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("Access denied. User not found"))
    }
}
