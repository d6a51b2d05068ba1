//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Password;
use crate::config::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity.
///
/// Carries no password material; verification flows load a
/// [`UserCredentials`] projection instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "farmer@example.com")]
    pub email: String,
    #[schema(example = "green_acres")]
    pub username: Option<String>,
    #[schema(example = "Bhupesh Kumar")]
    pub name: String,
    #[schema(example = "+919876543210")]
    pub phone: Option<String>,
    #[schema(example = "Village Dhuri, Ludhiana, Punjab, 141001")]
    pub location: Option<String>,
    #[schema(example = "/uploads/avatars/550e8400-e29b-41d4-a716-446655440000_1700000000000.png")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub profile_completed: bool,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Share of the profile fields (name, email, phone, location, avatar)
    /// that are filled in, as a rounded percentage.
    pub fn profile_completion(&self) -> u8 {
        let fields = [
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            self.phone.as_deref(),
            self.location.as_deref(),
            self.avatar.as_deref(),
        ];
        let filled = fields
            .iter()
            .filter(|f| f.is_some_and(|v| !v.trim().is_empty()))
            .count();

        (100.0 * filled as f64 / fields.len() as f64).round() as u8
    }
}

/// Password-bearing projection of a user, loaded only to verify a password.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password: Password,
}

/// Data needed to persist a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// Validated profile update as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub username: Option<String>,
}

impl ProfileUpdate {
    /// Resolve the submitted fields into the changes to persist.
    ///
    /// Structured address parts, when any is non-empty, replace `location`
    /// with their comma-joined form in the fixed order
    /// address line, city, state, pincode. An empty username is ignored.
    pub fn into_changes(self) -> ProfileChanges {
        let location = compose_location(
            self.location.as_deref(),
            [
                self.address_line.as_deref(),
                self.city.as_deref(),
                self.state.as_deref(),
                self.pincode.as_deref(),
            ],
        );

        ProfileChanges {
            name: self.name,
            phone: self.phone,
            location,
            username: self.username.filter(|u| !u.is_empty()),
        }
    }
}

/// Location stored for an update: the non-empty address parts joined with
/// `", "`, or the free-text `location` when no part is given.
pub fn compose_location(location: Option<&str>, parts: [Option<&str>; 4]) -> Option<String> {
    let parts: Vec<&str> = parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        location.map(str::to_string)
    } else {
        Some(parts.join(", "))
    }
}

/// Field changes applied by a profile update. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub username: Option<String>,
}

/// User as returned by the profile endpoints, with the transient
/// completion percentage.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: User,
    #[schema(example = 80)]
    pub profile_completion: u8,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        let profile_completion = user.profile_completion();
        Self {
            user,
            profile_completion,
        }
    }
}
