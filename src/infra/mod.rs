//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Avatar file storage
//! - Outbound e-mail

pub mod db;
pub mod mailer;
pub mod repositories;
pub mod storage;

pub use db::{Database, Migrator};
pub use mailer::{Email, LogMailer, Mailer, SmtpMailer};
pub use repositories::{
    FeedbackRepository, FeedbackStore, SoilTestRepository, SoilTestStore, UserRepository,
    UserStore,
};
pub use storage::{FileStorage, LocalFileStorage};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockFeedbackRepository, MockSoilTestRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockFileStorage;
