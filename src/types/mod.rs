//! Shared request/response types.

pub mod input;
mod response;

pub use response::{ApiResponse, Created};
