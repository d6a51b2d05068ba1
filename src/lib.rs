//! AgriProxy backend - accounts, profiles, feedback and soil testing API
//!
//! Serves the AgriProxy farming app: signup and bearer-token login, the
//! signed-in user's profile (fields, avatar image, password, account
//! deactivation), public feedback with admin moderation, and soil testing
//! requests forwarded to store support by e-mail.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, file storage, mail)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (response envelope, input normalization)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (runs pending migrations first)
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Promote an account to administrator
//! cargo run -- admin grant owner@agriproxy.com
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
