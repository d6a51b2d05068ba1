//! User repository implementation.
//!
//! Accounts are never hard-deleted, so lookups by id return soft-deleted
//! records as well; callers decide what an inactive account may do.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{NewUser, ProfileChanges, User, UserCredentials, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID, including soft-deleted accounts
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the holder of a username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Load the password-bearing projection by ID
    async fn find_credentials(&self, id: Uuid) -> AppResult<Option<UserCredentials>>;

    /// Load the password-bearing projection by email
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Create a new active user with the `user` role
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply profile changes and mark the profile completed
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User>;

    /// Set or clear the avatar reference
    async fn set_avatar(&self, id: Uuid, avatar: Option<String>) -> AppResult<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Record a successful login
    async fn touch_last_login(&self, id: Uuid) -> AppResult<User>;

    /// Change the role of the account holding `email`
    async fn set_role(&self, email: &str, role: UserRole) -> AppResult<User>;

    /// Deactivate the account, stamp `deleted_at` and clear the avatar
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("User")
    }
}

/// Map a unique index violation on username to `UsernameTaken`.
fn username_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("username") => {
            AppError::UsernameTaken
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_credentials(&self, id: Uuid) -> AppResult<Option<UserCredentials>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(user::Model::into_credentials))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(user::Model::into_credentials))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            username: Set(None),
            password_hash: Set(new_user.password_hash),
            name: Set(new_user.name),
            phone: Set(new_user.phone),
            location: Set(new_user.location),
            avatar: Set(None),
            role: Set(ROLE_USER.to_string()),
            is_active: Set(true),
            profile_completed: Set(false),
            email_verified: Set(false),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::conflict("User")
            } else {
                AppError::from(e)
            }
        })?;

        Ok(User::from(model))
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(location) = changes.location {
            active.location = Set(Some(location));
        }
        if let Some(username) = changes.username {
            active.username = Set(Some(username));
        }
        active.profile_completed = Set(true);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(username_conflict)?;
        Ok(User::from(model))
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<String>) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.avatar = Set(avatar);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.last_login = Set(Some(Utc::now()));

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_role(&self, email: &str, role: UserRole) -> AppResult<User> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = model.into();
        active.role = Set(role.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        let now = Utc::now();
        active.is_active = Set(false);
        active.avatar = Set(None);
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(&self.db).await?;
        Ok(())
    }
}
