//! Soil testing handlers. Every route requires authentication; status
//! changes and deletion are admin only.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::validation;
use crate::api::AppState;
use crate::domain::{BagItem, NewSoilTestRequest, PackageType, SoilTestRequest, SoilTestStatus};
use crate::errors::{AppError, AppResult};
use crate::types::{input, ApiResponse, Created};

const PACKAGE_TYPE_MESSAGE: &str = "Package type must be either inStore or onFarm";
const STATUS_MESSAGE: &str = "Status must be one of: pending, in_progress, completed";

/// A bag in the sample kit
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BagItemBody {
    #[validate(custom(function = "validation::not_blank", message = "Bag item name is required"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Topsoil sample bag")]
    pub name: String,
    #[validate(range(min = 1, message = "Bag item quantity must be at least 1"))]
    #[serde(default)]
    #[schema(example = 2, minimum = 1)]
    pub quantity: i32,
}

/// Soil test request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoilTestBody {
    #[validate(length(min = 2, max = 50, message = "Crop name must be between 2 and 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Wheat")]
    pub crop: String,
    /// Acres, as a number or numeric string
    #[validate(required(message = "Farm area is required"))]
    #[serde(default, deserialize_with = "input::number_or_string_opt")]
    #[schema(value_type = f64, example = 2.5)]
    pub farm_area: Option<f64>,
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "SN-118/2")]
    pub survey_number: Option<String>,
    #[validate(length(min = 5, max = 100, message = "Address line must be between 5 and 100 characters"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Village Khanna, near canal")]
    pub address_line: String,
    #[validate(length(min = 2, max = 50, message = "City must be between 2 and 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Ludhiana")]
    pub city: String,
    #[validate(length(min = 2, max = 50, message = "State must be between 2 and 50 characters"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "Punjab")]
    pub state: String,
    #[validate(custom(function = "validation::pincode", message = "Pincode must be exactly 6 digits"))]
    #[serde(default, deserialize_with = "input::trimmed")]
    #[schema(example = "141401")]
    pub pincode: String,
    #[validate(custom(function = "validation::phone", message = "Please provide a valid phone number"))]
    #[serde(default, deserialize_with = "input::trimmed_opt")]
    #[schema(example = "+919876543210")]
    pub contact: Option<String>,
    #[validate(custom(function = "validation::package_type", message = "Package type must be either inStore or onFarm"))]
    #[serde(default)]
    #[schema(value_type = PackageType)]
    pub package_type: String,
    #[serde(default)]
    #[schema(example = 499.0)]
    pub package_price: Option<f64>,
    #[validate(length(min = 1, message = "At least one bag item is required"), nested)]
    #[serde(default)]
    pub bag_items: Vec<BagItemBody>,
    #[serde(default)]
    #[schema(example = 2)]
    pub total_bags: Option<i32>,
}

impl SoilTestBody {
    fn into_new(self, user_id: Uuid) -> AppResult<NewSoilTestRequest> {
        let farm_area = self
            .farm_area
            .ok_or_else(|| AppError::validation("farmArea", "Farm area is required"))?;
        let package_type = PackageType::parse(&self.package_type)
            .ok_or_else(|| AppError::validation("packageType", PACKAGE_TYPE_MESSAGE))?;

        Ok(NewSoilTestRequest {
            user_id: Some(user_id),
            crop: self.crop,
            farm_area,
            survey_number: self.survey_number.unwrap_or_default(),
            address_line: self.address_line,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            contact: self.contact,
            package_type,
            package_price: self.package_price,
            bag_items: self
                .bag_items
                .into_iter()
                .map(|item| BagItem {
                    name: item.name,
                    quantity: item.quantity.unsigned_abs(),
                })
                .collect(),
            total_bags: self.total_bags,
        })
    }
}

/// Status change body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(custom(function = "validation::soil_test_status", message = "Status must be one of: pending, in_progress, completed"))]
    #[serde(default)]
    #[schema(value_type = SoilTestStatus)]
    pub status: String,
}

/// Acknowledgement of a request forwarded to store support
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportReceipt {
    pub request_id: i32,
    pub status: SoilTestStatus,
}

/// Create soil testing routes; the caller mounts these behind `auth_middleware`
pub fn soil_test_routes() -> Router<AppState> {
    Router::new()
        .route("/send-email-support", post(send_email_support))
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/:id", get(get_request).delete(delete_request))
        .route("/requests/:id/status", patch(update_request_status))
}

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::validation("id", "Invalid request ID"))
}

/// Forward a request to store support by e-mail and record it
#[utoipa::path(
    post,
    path = "/api/soil-testing/send-email-support",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    request_body = SoilTestBody,
    responses(
        (status = 200, description = "Email sent to store support successfully", body = SupportReceipt),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    )
)]
pub async fn send_email_support(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SoilTestBody>,
) -> AppResult<ApiResponse<SupportReceipt>> {
    if payload.contact.as_deref().map_or(true, str::is_empty) {
        return Err(AppError::validation("contact", "Contact is required"));
    }

    let stored = state
        .soil_test_service
        .send_to_support(payload.into_new(current_user.id)?)
        .await?;

    Ok(ApiResponse::ok(
        SupportReceipt {
            request_id: stored.id,
            status: stored.status,
        },
        "Email sent to store support successfully",
    ))
}

/// List soil test requests
#[utoipa::path(
    get,
    path = "/api/soil-testing/requests",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Soil test requests", body = Vec<SoilTestRequest>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SoilTestRequest>>> {
    let requests = state.soil_test_service.list().await?;
    Ok(ApiResponse::list(
        requests,
        "Soil test requests retrieved successfully",
    ))
}

/// Create a soil test request
#[utoipa::path(
    post,
    path = "/api/soil-testing/requests",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    request_body = SoilTestBody,
    responses(
        (status = 201, description = "Soil test request created successfully", body = SoilTestRequest),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_request(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SoilTestBody>,
) -> AppResult<Created<SoilTestRequest>> {
    let stored = state
        .soil_test_service
        .create(payload.into_new(current_user.id)?)
        .await?;

    Ok(Created(ApiResponse::ok(
        stored,
        "Soil test request created successfully",
    )))
}

/// Get a soil test request
#[utoipa::path(
    get,
    path = "/api/soil-testing/requests/{id}",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Soil test request", body = SoilTestRequest),
        (status = 400, description = "Invalid request ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Soil test request not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SoilTestRequest>> {
    let request = state.soil_test_service.get(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(
        request,
        "Soil test request retrieved successfully",
    ))
}

/// Move a request through its lifecycle (admin only)
#[utoipa::path(
    patch,
    path = "/api/soil-testing/requests/{id}/status",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Soil test request status updated successfully", body = SoilTestRequest),
        (status = 400, description = "Invalid ID or status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Soil test request not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_request_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<SoilTestRequest>> {
    require_admin(&current_user)?;
    let id = parse_id(&id)?;
    let status = SoilTestStatus::parse(&payload.status)
        .ok_or_else(|| AppError::validation("status", STATUS_MESSAGE))?;

    let updated = state.soil_test_service.update_status(id, status).await?;
    Ok(ApiResponse::ok(
        updated,
        "Soil test request status updated successfully",
    ))
}

/// Delete a request (admin only)
#[utoipa::path(
    delete,
    path = "/api/soil-testing/requests/{id}",
    tag = "Soil Testing",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Soil test request deleted successfully"),
        (status = 400, description = "Invalid request ID", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Soil test request not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_request(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;

    state.soil_test_service.delete(parse_id(&id)?).await?;
    Ok(ApiResponse::message("Soil test request deleted successfully"))
}
