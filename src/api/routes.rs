//! Application route configuration.

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    sensitive_headers::SetSensitiveHeadersLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_account_routes, auth_routes, feedback_admin_routes, feedback_routes, profile_routes,
    soil_test_routes,
};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{REQUEST_TIMEOUT_SECONDS, UPLOADS_MOUNT};
use crate::errors::expose_details;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let authenticated = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let api = Router::new()
        .route("/health", get(health))
        // Public authentication routes, plus profile/account under /auth
        .nest(
            "/auth",
            auth_routes().merge(auth_account_routes().route_layer(authenticated())),
        )
        // Profile routes (require bearer token)
        .nest("/profile", profile_routes().route_layer(authenticated()))
        // Feedback: public submission, moderation behind auth + admin check
        .nest(
            "/feedback",
            feedback_routes().merge(feedback_admin_routes().route_layer(authenticated())),
        )
        .nest("/soil-testing", soil_test_routes().route_layer(authenticated()));

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECONDS)))
        // Keep bearer tokens out of request traces
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(root))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Uploaded avatars
        .nest_service(UPLOADS_MOUNT, ServeDir::new(&state.upload_dir))
        .layer(layers)
        .with_state(state)
}

/// Root endpoint
async fn root() -> Json<Banner> {
    Json(Banner {
        success: true,
        message: "AgriProxy API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct Banner {
    success: bool,
    message: &'static str,
    version: &'static str,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    message: &'static str,
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.database.ping().await {
        Ok(_) => ServiceStatus {
            status: "healthy",
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            ServiceStatus {
                status: "unhealthy",
                error: expose_details().then(|| e.to_string()),
            }
        }
    };

    let healthy = database.status == "healthy";
    let response = HealthResponse {
        success: healthy,
        message: if healthy {
            "Service is healthy"
        } else {
            "Service is degraded"
        },
        status: if healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
