//! Feedback handlers.
//!
//! Submission and the active list are public; moderation routes are
//! mounted behind authentication and the admin guard.

use axum::{
    extract::{Extension, Path, State},
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::validation;
use crate::api::AppState;
use crate::domain::{Feedback, FeedbackStats, NewFeedback};
use crate::errors::{AppError, AppResult};
use crate::types::{input, ApiResponse, Created};

/// Feedback submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitFeedbackRequest {
    #[validate(custom(function = "validation::not_blank", message = "Name is required"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Gurpreet Singh")]
    pub name: String,
    #[validate(custom(function = "validation::not_blank", message = "Occupation is required"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Farmer")]
    pub occupation: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[serde(default)]
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    #[validate(custom(function = "validation::not_blank", message = "Review is required"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Soil report arrived in three days.")]
    pub review: String,
}

impl From<SubmitFeedbackRequest> for NewFeedback {
    fn from(req: SubmitFeedbackRequest) -> Self {
        Self {
            name: req.name,
            occupation: req.occupation,
            rating: req.rating,
            review: req.review,
        }
    }
}

/// Public feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_feedback))
        .route("/active", get(active_feedback))
}

/// Moderation routes; the caller mounts these behind `auth_middleware`
pub fn feedback_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(all_feedback))
        .route("/stats", get(feedback_stats))
        .route("/:id/toggle-status", patch(toggle_feedback_status))
        .route("/:id", delete(delete_feedback))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation("id", "Invalid feedback ID"))
}

/// Submit feedback (stored inactive until moderated)
#[utoipa::path(
    post,
    path = "/api/feedback/submit",
    tag = "Feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted successfully", body = Feedback),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SubmitFeedbackRequest>,
) -> AppResult<Created<Feedback>> {
    let feedback = state.feedback_service.submit(payload.into()).await?;
    Ok(Created(ApiResponse::ok(
        feedback,
        "Feedback submitted successfully",
    )))
}

/// Moderated feedback for public display
#[utoipa::path(
    get,
    path = "/api/feedback/active",
    tag = "Feedback",
    responses(
        (status = 200, description = "Active feedback, newest first", body = Vec<Feedback>)
    )
)]
pub async fn active_feedback(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Feedback>>> {
    let feedback = state.feedback_service.list_active().await?;
    Ok(ApiResponse::list(feedback, "Feedback retrieved successfully"))
}

/// All feedback (admin only)
#[utoipa::path(
    get,
    path = "/api/feedback/all",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All feedback, newest first", body = Vec<Feedback>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse)
    )
)]
pub async fn all_feedback(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Feedback>>> {
    require_admin(&current_user)?;
    let feedback = state.feedback_service.list_all().await?;
    Ok(ApiResponse::list(feedback, "Feedback retrieved successfully"))
}

/// Activate or deactivate feedback (admin only)
#[utoipa::path(
    patch,
    path = "/api/feedback/{id}/toggle-status",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Status toggled", body = Feedback),
        (status = 400, description = "Invalid ID", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Feedback not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn toggle_feedback_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Feedback>> {
    require_admin(&current_user)?;
    let id = parse_id(&id)?;

    let feedback = state.feedback_service.toggle_status(id).await?;
    let message = if feedback.is_active {
        "Feedback activated successfully"
    } else {
        "Feedback deactivated successfully"
    };
    Ok(ApiResponse::ok(feedback, message))
}

/// Permanently delete feedback (admin only)
#[utoipa::path(
    delete,
    path = "/api/feedback/{id}",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Feedback deleted successfully"),
        (status = 400, description = "Invalid ID", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Feedback not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_feedback(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;
    let id = parse_id(&id)?;

    state.feedback_service.delete(id).await?;
    Ok(ApiResponse::message("Feedback deleted successfully"))
}

/// Rating statistics (admin only)
#[utoipa::path(
    get,
    path = "/api/feedback/stats",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Feedback statistics", body = FeedbackStats),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse)
    )
)]
pub async fn feedback_stats(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<FeedbackStats>> {
    require_admin(&current_user)?;
    let stats = state.feedback_service.stats().await?;
    Ok(ApiResponse::ok(stats, "Feedback statistics retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extractors::field_errors;

    #[test]
    fn test_missing_fields_are_reported() {
        let req: SubmitFeedbackRequest =
            serde_json::from_value(serde_json::json!({ "name": "  ", "rating": 9 })).unwrap();

        let fields: Vec<_> = field_errors(&req.validate().unwrap_err())
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["name", "occupation", "rating", "review"]);
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
