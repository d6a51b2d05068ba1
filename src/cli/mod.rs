//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `admin` - Grant or revoke administrator access

pub mod args;

pub use args::{Cli, Commands};
