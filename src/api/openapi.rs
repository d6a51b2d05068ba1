//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, feedback_handler, profile_handler, soil_test_handler};
use crate::domain::{
    BagItem, Feedback, FeedbackStats, PackageType, ProfileView, RatingCount, SoilTestRequest,
    SoilTestStatus, User, UserRole,
};
use crate::errors::{ErrorResponse, FieldError};
use crate::services::{AuthSession, AvatarUploaded};

/// OpenAPI documentation for the AgriProxy backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgriProxy API",
        version = "0.1.0",
        description = "Accounts, profiles, feedback and soil testing for the AgriProxy farming app",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "AgriProxy Support", email = "support@agriproxy.com")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::signup,
        auth_handler::login,
        auth_handler::logout,
        // Profile endpoints
        profile_handler::get_profile,
        profile_handler::update_profile,
        profile_handler::upload_avatar,
        profile_handler::delete_avatar,
        profile_handler::change_password,
        profile_handler::delete_account,
        // Feedback endpoints
        feedback_handler::submit_feedback,
        feedback_handler::active_feedback,
        feedback_handler::all_feedback,
        feedback_handler::toggle_feedback_status,
        feedback_handler::delete_feedback,
        feedback_handler::feedback_stats,
        // Soil testing endpoints
        soil_test_handler::send_email_support,
        soil_test_handler::list_requests,
        soil_test_handler::create_request,
        soil_test_handler::get_request,
        soil_test_handler::update_request_status,
        soil_test_handler::delete_request,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            User,
            ProfileView,
            Feedback,
            FeedbackStats,
            RatingCount,
            PackageType,
            SoilTestStatus,
            BagItem,
            SoilTestRequest,
            // Errors
            ErrorResponse,
            FieldError,
            // Auth types
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            AuthSession,
            // Profile types
            profile_handler::UpdateProfileRequest,
            profile_handler::ChangePasswordRequest,
            profile_handler::DeleteAccountRequest,
            profile_handler::AvatarForm,
            profile_handler::ProfileData,
            AvatarUploaded,
            // Feedback types
            feedback_handler::SubmitFeedbackRequest,
            // Soil testing types
            soil_test_handler::SoilTestBody,
            soil_test_handler::BagItemBody,
            soil_test_handler::UpdateStatusRequest,
            soil_test_handler::SupportReceipt,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login and logout"),
        (name = "Profile", description = "Profile, avatar, password and account of the signed-in user"),
        (name = "Feedback", description = "Customer feedback and moderation"),
        (name = "Soil Testing", description = "Soil testing requests")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_profile_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/profile",
            "/api/profile/avatar",
            "/api/profile/password",
            "/api/profile/account",
            "/api/soil-testing/requests/{id}/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }

    #[test]
    fn test_error_responses_reference_error_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert!(doc["components"]["schemas"].get("ErrorResponse").is_some());
        let reference = doc["paths"]["/api/profile"]["get"]["responses"]["401"]["content"]
            ["application/json"]["schema"]["$ref"]
            .as_str()
            .unwrap();
        assert_eq!(reference, "#/components/schemas/ErrorResponse");
    }
}
