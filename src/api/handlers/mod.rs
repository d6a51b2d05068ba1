//! HTTP request handlers.

pub mod auth_handler;
pub mod feedback_handler;
pub mod profile_handler;
pub mod soil_test_handler;

pub use auth_handler::auth_routes;
pub use feedback_handler::{feedback_admin_routes, feedback_routes};
pub use profile_handler::{auth_account_routes, profile_routes};
pub use soil_test_handler::soil_test_routes;
