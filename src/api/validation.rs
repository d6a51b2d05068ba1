//! Field rules shared by request bodies.
//!
//! Used through `#[validate(custom(function = "..."))]`; each attribute
//! supplies its own user-facing message.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::domain::{PackageType, SoilTestStatus};

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone regex"));
static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username regex"));
static PINCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid pincode regex"));

pub fn phone(value: &str) -> Result<(), ValidationError> {
    check(PHONE.is_match(value), "phone")
}

pub fn username(value: &str) -> Result<(), ValidationError> {
    check(USERNAME.is_match(value), "username")
}

pub fn pincode(value: &str) -> Result<(), ValidationError> {
    check(PINCODE.is_match(value), "pincode")
}

/// At least one lowercase letter, one uppercase letter and one digit.
pub fn password_strength(value: &str) -> Result<(), ValidationError> {
    let strong = value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit());
    check(strong, "password_strength")
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    check(!value.trim().is_empty(), "required")
}

pub fn package_type(value: &str) -> Result<(), ValidationError> {
    check(PackageType::parse(value).is_some(), "package_type")
}

pub fn soil_test_status(value: &str) -> Result<(), ValidationError> {
    check(SoilTestStatus::parse(value).is_some(), "status")
}

fn check(ok: bool, code: &'static str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}
