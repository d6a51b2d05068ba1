//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod feedback;
pub mod soil_test_request;
pub mod user;
