//! Authentication handlers.

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::validation;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{AuthSession, SignupInput};
use crate::types::{input, ApiResponse, Created};

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Bhupesh Kumar")]
    pub name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "farmer@example.com")]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom(
            function = "validation::password_strength",
            message = "Password must contain at least one lowercase letter, one uppercase letter, and one number"
        )
    )]
    #[serde(default)]
    #[schema(example = "SecurePass1", min_length = 6)]
    pub password: String,
    #[validate(custom(function = "validation::phone", message = "Please provide a valid phone number"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "+919876543210")]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Location cannot exceed 100 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    pub location: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "farmer@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    #[schema(example = "SecurePass1")]
    pub password: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthSession),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "User already exists", body = crate::errors::ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<Created<AuthSession>> {
    let session = state
        .auth_service
        .signup(SignupInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            location: payload.location,
        })
        .await?;

    Ok(Created(ApiResponse::ok(session, "User registered successfully")))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid email or password", body = crate::errors::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::ok(session, "Login successful"))
}

/// Logout. Tokens are stateless, so the client just discards its token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout() -> ApiResponse<()> {
    ApiResponse::message("Logged out successfully")
}
