//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Password, User, UserCredentials, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub profile_completed: bool,
    pub email_verified: bool,
    pub last_login: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Split into the public user view and its password hash.
    pub fn into_credentials(self) -> UserCredentials {
        let password = Password::from_hash(self.password_hash.clone());
        UserCredentials {
            user: User::from(self),
            password,
        }
    }
}

/// Convert database model to domain entity. The hash is dropped.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            username: model.username,
            name: model.name,
            phone: model.phone,
            location: model.location,
            avatar: model.avatar,
            role: UserRole::from(model.role.as_str()),
            is_active: model.is_active,
            profile_completed: model.profile_completed,
            email_verified: model.email_verified,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}
