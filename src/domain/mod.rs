//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod avatar;
pub mod feedback;
pub mod password;
pub mod soil_test;
pub mod user;

pub use avatar::{AvatarFormat, AvatarUpload};
pub use feedback::{Feedback, FeedbackStats, NewFeedback, RatingCount};
pub use password::Password;
pub use soil_test::{BagItem, NewSoilTestRequest, PackageType, SoilTestRequest, SoilTestStatus};
pub use user::{
    compose_location, NewUser, ProfileChanges, ProfileUpdate, ProfileView, User, UserCredentials, UserRole,
};
