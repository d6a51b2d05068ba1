//! Profile handlers for the signed-in user.

use std::borrow::Cow;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Extension, Multipart, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::validation;
use crate::api::AppState;
use crate::config::{AVATAR_FIELD_NAME, MAX_AVATAR_BYTES, MAX_LOCATION_LENGTH};
use crate::domain::{avatar::too_large, compose_location, AvatarUpload, ProfileUpdate, ProfileView};
use crate::errors::{AppError, AppResult};
use crate::services::AvatarUploaded;
use crate::types::{input, ApiResponse};

/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const NO_FILE: &str = "No image file uploaded";

/// Profile update request. Every field is optional; address parts, when
/// present, replace `location`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "location_fits", skip_on_field_errors = false))]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "Bhupesh Kumar")]
    pub name: Option<String>,
    #[validate(custom(function = "validation::phone", message = "Please provide a valid phone number"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "+919876543210")]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Location cannot exceed 200 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    pub location: Option<String>,
    #[validate(
        length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"),
        custom(
            function = "validation::username",
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "green_acres")]
    pub username: Option<String>,
    #[validate(length(max = 100, message = "Address line cannot exceed 100 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "12 Canal Road")]
    pub address_line: Option<String>,
    #[validate(length(max = 50, message = "City name cannot exceed 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "Ludhiana")]
    pub city: Option<String>,
    #[validate(length(max = 50, message = "State name cannot exceed 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "Punjab")]
    pub state: Option<String>,
    #[validate(custom(function = "validation::pincode", message = "Pincode must be exactly 6 digits"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "141001")]
    pub pincode: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            location: req.location,
            address_line: req.address_line,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            username: req.username,
        }
    }
}

/// The location built from the address parts must fit the stored column.
fn location_fits(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    let location = compose_location(
        req.location.as_deref(),
        [
            req.address_line.as_deref(),
            req.city.as_deref(),
            req.state.as_deref(),
            req.pincode.as_deref(),
        ],
    );
    if location.map_or(true, |l| l.chars().count() <= MAX_LOCATION_LENGTH) {
        return Ok(());
    }
    let mut err = ValidationError::new("location");
    err.message = Some(Cow::from(
        "Combined address cannot exceed 200 characters",
    ));
    Err(err)
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "confirmation_matches", skip_on_field_errors = false))]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    #[serde(default)]
    pub current_password: String,
    #[validate(
        length(min = 6, message = "New password must be at least 6 characters long"),
        custom(
            function = "validation::password_strength",
            message = "New password must contain at least one lowercase letter, one uppercase letter, and one number"
        )
    )]
    #[serde(default)]
    #[schema(min_length = 6)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

fn confirmation_matches(req: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if req.confirm_password == req.new_password {
        return Ok(());
    }
    let mut err = ValidationError::new("confirmPassword");
    err.message = Some(Cow::from(
        "Password confirmation does not match new password",
    ));
    Err(err)
}

/// Account deletion request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1, message = "Password is required to delete account"))]
    #[serde(default)]
    pub password: String,
}

/// Multipart body of an avatar upload
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AvatarForm {
    /// JPEG, PNG or WebP image, up to 5MB
    #[schema(value_type = String, format = Binary)]
    avatar: Vec<u8>,
}

/// Profile payload wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileData {
    pub user: ProfileView,
}

/// Create profile routes (all require authentication)
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route(
            "/avatar",
            post(upload_avatar)
                .delete(delete_avatar)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/password", put(change_password))
        .route("/account", delete(delete_account))
}

/// Profile and account routes also served under `/api/auth`; the caller
/// mounts these behind `auth_middleware`
pub fn auth_account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/account", delete(delete_account))
}

/// Get the signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ProfileData),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileData>> {
    let user = state.profile_service.get_profile(current_user.id).await?;
    Ok(ApiResponse::ok(
        ProfileData { user },
        "Profile retrieved successfully",
    ))
}

/// Update profile fields
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ProfileData),
        (status = 400, description = "Validation error or username taken", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<ProfileData>> {
    let user = state
        .profile_service
        .update_profile(current_user.id, payload.into())
        .await?;

    Ok(ApiResponse::ok(
        ProfileData { user },
        "Profile updated successfully",
    ))
}

/// Upload a new avatar image (multipart field `avatar`)
#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body(content = AvatarForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar uploaded successfully", body = AvatarUploaded),
        (status = 400, description = "Missing, oversized or unsupported file", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn upload_avatar(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<AvatarUploaded>> {
    let mut multipart = multipart.map_err(|_| AppError::bad_request(NO_FILE))?;
    let upload = read_avatar(&mut multipart)
        .await?
        .ok_or_else(|| AppError::bad_request(NO_FILE))?;

    let uploaded = state
        .profile_service
        .upload_avatar(current_user.id, upload)
        .await?;

    Ok(ApiResponse::ok(uploaded, "Avatar uploaded successfully"))
}

async fn read_avatar(multipart: &mut Multipart) -> AppResult<Option<AvatarUpload>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD_NAME) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return AvatarUpload::accept(content_type.as_deref(), bytes.to_vec()).map(Some);
    }
    Ok(None)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::bad_request(err.body_text())
    }
}

/// Remove the avatar
#[utoipa::path(
    delete,
    path = "/api/profile/avatar",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Avatar deleted successfully", body = ProfileData),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_avatar(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileData>> {
    let user = state.profile_service.delete_avatar(current_user.id).await?;
    Ok(ApiResponse::ok(
        ProfileData { user },
        "Avatar deleted successfully",
    ))
}

/// Change password
#[utoipa::path(
    put,
    path = "/api/profile/password",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Validation error or wrong current password", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .profile_service
        .change_password(current_user.id, payload.current_password, payload.new_password)
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// Deactivate the account
#[utoipa::path(
    delete,
    path = "/api/profile/account",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted successfully"),
        (status = 400, description = "Password missing or incorrect", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DeleteAccountRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .profile_service
        .delete_account(current_user.id, payload.password)
        .await?;

    tracing::info!(user_id = %current_user.id, "Account deactivated");
    Ok(ApiResponse::message("Account deleted successfully"))
}
