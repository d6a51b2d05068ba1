//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on repository, storage and mailer
//! traits so they can be exercised without a database.

mod auth_service;
mod feedback_service;
mod profile_service;
mod soil_test_service;
mod token_service;

pub use auth_service::{normalize_email, AuthService, AuthSession, Authenticator, SignupInput};
pub use feedback_service::{FeedbackManager, FeedbackService};
pub use profile_service::{AvatarUploaded, ProfileManager, ProfileService};
pub use soil_test_service::{SoilTestManager, SoilTestService};
pub use token_service::{Claims, TokenError, TokenService};
