//! Profile service - profile read/update, avatar lifecycle, password
//! change and account deletion for the signed-in user.
//!
//! Avatar files are removed best-effort: a failed unlink is logged and
//! never fails the operation that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AvatarUpload, Password, ProfileUpdate, ProfileView, UserCredentials};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{FileStorage, UserRepository};

/// Result of a successful avatar upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploaded {
    pub user: ProfileView,
    #[schema(example = "/uploads/avatars/550e8400-e29b-41d4-a716-446655440000_1700000000000.png")]
    pub avatar_url: String,
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Current profile with completion percentage. Deactivated accounts
    /// are still returned.
    async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileView>;

    /// Apply validated changes; marks the profile completed
    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<ProfileView>;

    /// Store an accepted image and make it the user's avatar
    async fn upload_avatar(&self, user_id: Uuid, upload: AvatarUpload) -> AppResult<AvatarUploaded>;

    /// Clear the avatar. Succeeds when there is none.
    async fn delete_avatar(&self, user_id: Uuid) -> AppResult<ProfileView>;

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Soft-delete the account after re-checking the password
    async fn delete_account(&self, user_id: Uuid, password: String) -> AppResult<()>;
}

pub struct ProfileManager {
    users: Arc<dyn UserRepository>,
    storage: Arc<dyn FileStorage>,
}

impl ProfileManager {
    pub fn new(users: Arc<dyn UserRepository>, storage: Arc<dyn FileStorage>) -> Self {
        Self { users, storage }
    }

    async fn credentials(&self, user_id: Uuid) -> AppResult<UserCredentials> {
        self.users
            .find_credentials(user_id)
            .await?
            .ok_or_not_found("User")
    }

    async fn discard_file(&self, reference: &str) {
        if let Err(e) = self.storage.remove(reference).await {
            tracing::warn!(%reference, error = %e, "Failed to remove avatar file");
        }
    }
}

#[async_trait]
impl ProfileService for ProfileManager {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileView> {
        let user = self.users.find_by_id(user_id).await?.ok_or_not_found("User")?;
        Ok(ProfileView::from(user))
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<ProfileView> {
        let changes = update.into_changes();

        if let Some(username) = changes.username.as_deref() {
            if let Some(holder) = self.users.find_by_username(username).await? {
                if holder.id != user_id {
                    return Err(AppError::UsernameTaken);
                }
            }
        }

        let user = self.users.update_profile(user_id, changes).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(ProfileView::from(user))
    }

    async fn upload_avatar(&self, user_id: Uuid, upload: AvatarUpload) -> AppResult<AvatarUploaded> {
        let previous = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?
            .avatar;

        let file_name = upload.file_name(user_id, Utc::now());
        let reference = self.storage.save_avatar(&file_name, upload.bytes).await?;

        let user = match self.users.set_avatar(user_id, Some(reference.clone())).await {
            Ok(user) => user,
            Err(e) => {
                self.discard_file(&reference).await;
                return Err(e);
            }
        };

        if let Some(old) = previous.filter(|old| *old != reference) {
            self.discard_file(&old).await;
        }

        tracing::info!(user_id = %user.id, %reference, "Avatar uploaded");
        Ok(AvatarUploaded {
            user: ProfileView::from(user),
            avatar_url: reference,
        })
    }

    async fn delete_avatar(&self, user_id: Uuid) -> AppResult<ProfileView> {
        let user = self.users.find_by_id(user_id).await?.ok_or_not_found("User")?;

        if let Some(reference) = user.avatar.as_deref() {
            self.discard_file(reference).await;
        }

        let user = self.users.set_avatar(user_id, None).await?;
        Ok(ProfileView::from(user))
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let credentials = self.credentials(user_id).await?;

        if !credentials.password.verify(&current_password) {
            return Err(AppError::invalid_credentials("Current password is incorrect"));
        }

        let hash = Password::new(&new_password)?.into_string();
        self.users.set_password_hash(user_id, hash).await?;

        tracing::info!(%user_id, "Password changed");
        Ok(())
    }

    async fn delete_account(&self, user_id: Uuid, password: String) -> AppResult<()> {
        let credentials = self.credentials(user_id).await?;

        if !credentials.password.verify(&password) {
            return Err(AppError::invalid_credentials("Password is incorrect"));
        }

        if let Some(reference) = credentials.user.avatar.as_deref() {
            self.discard_file(reference).await;
        }

        self.users.soft_delete(user_id).await?;
        tracing::info!(%user_id, "Account deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::fixtures::user;
    use crate::domain::{ProfileChanges, User};
    use crate::infra::{MockFileStorage, MockUserRepository};
    use mockall::predicate::eq;

    fn manager(repo: MockUserRepository, storage: MockFileStorage) -> ProfileManager {
        ProfileManager::new(Arc::new(repo), Arc::new(storage))
    }

    fn with_avatar(id: Uuid, avatar: &str) -> User {
        let mut u = user(id);
        u.avatar = Some(avatar.to_string());
        u
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = manager(repo, MockFileStorage::new())
            .get_profile(Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_update_sends_composed_location() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_update_profile()
            .withf(move |uid, changes| {
                *uid == id
                    && *changes
                        == ProfileChanges {
                            name: Some("Asha".to_string()),
                            location: Some("A, B, C, 560001".to_string()),
                            ..Default::default()
                        }
            })
            .returning(|id, _| {
                let mut u = user(id);
                u.profile_completed = true;
                Ok(u)
            });

        let view = manager(repo, MockFileStorage::new())
            .update_profile(
                id,
                ProfileUpdate {
                    name: Some("Asha".to_string()),
                    location: Some("ignored".to_string()),
                    address_line: Some("A".to_string()),
                    city: Some("B".to_string()),
                    state: Some("C".to_string()),
                    pincode: Some("560001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(view.user.profile_completed);
    }

    #[tokio::test]
    async fn test_update_username_taken_by_other() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .with(eq("taken_name"))
            .returning(|_| Ok(Some(user(Uuid::new_v4()))));
        repo.expect_update_profile().never();

        let result = manager(repo, MockFileStorage::new())
            .update_profile(
                Uuid::new_v4(),
                ProfileUpdate {
                    name: Some("New Name".to_string()),
                    username: Some("taken_name".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_update_keeps_own_username() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(move |name| {
            let mut u = user(id);
            u.username = Some(name.to_string());
            Ok(Some(u))
        });
        repo.expect_update_profile().times(1).returning(|id, _| Ok(user(id)));

        let result = manager(repo, MockFileStorage::new())
            .update_profile(
                id,
                ProfileUpdate {
                    username: Some("mine".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_file() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(with_avatar(id, "/uploads/avatars/old.png"))));
        repo.expect_set_avatar()
            .returning(|id, avatar| Ok(with_avatar(id, avatar.as_deref().unwrap())));

        let mut storage = MockFileStorage::new();
        storage
            .expect_save_avatar()
            .returning(|name, _| Ok(format!("/uploads/avatars/{}", name)));
        storage
            .expect_remove()
            .with(eq("/uploads/avatars/old.png"))
            .times(1)
            .returning(|_| Ok(()));

        let upload = AvatarUpload::accept(Some("image/png"), vec![1, 2, 3]).unwrap();
        let uploaded = manager(repo, storage).upload_avatar(id, upload).await.unwrap();

        assert!(uploaded.avatar_url.starts_with(&format!("/uploads/avatars/{}_", id)));
        assert!(uploaded.avatar_url.ends_with(".png"));
        assert_eq!(uploaded.user.user.avatar.as_deref(), Some(uploaded.avatar_url.as_str()));
    }

    #[tokio::test]
    async fn test_upload_cleans_up_when_user_vanishes() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        repo.expect_set_avatar()
            .returning(|_, _| Err(AppError::not_found("User")));

        let mut storage = MockFileStorage::new();
        storage
            .expect_save_avatar()
            .returning(|name, _| Ok(format!("/uploads/avatars/{}", name)));
        storage.expect_remove().times(1).returning(|_| Ok(()));

        let upload = AvatarUpload::accept(Some("image/jpeg"), vec![1]).unwrap();
        let result = manager(repo, storage).upload_avatar(Uuid::new_v4(), upload).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_avatar_tolerates_unlink_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(with_avatar(id, "/uploads/avatars/gone.png"))));
        repo.expect_set_avatar()
            .with(mockall::predicate::always(), eq(None::<String>))
            .returning(|id, _| Ok(user(id)));

        let mut storage = MockFileStorage::new();
        storage
            .expect_remove()
            .returning(|_| Err(std::io::Error::other("permission denied").into()));

        let view = manager(repo, storage)
            .delete_avatar(Uuid::new_v4())
            .await
            .unwrap();
        assert!(view.user.avatar.is_none());
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().returning(|id| {
            Ok(Some(UserCredentials {
                user: user(id),
                password: Password::new("OldPass123").unwrap(),
            }))
        });
        repo.expect_set_password_hash().never();

        let err = manager(repo, MockFileStorage::new())
            .change_password(Uuid::new_v4(), "Nope1234".to_string(), "NewPass123".to_string())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Current password is incorrect");
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_change_password_stores_new_hash() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().returning(|id| {
            Ok(Some(UserCredentials {
                user: user(id),
                password: Password::new("OldPass123").unwrap(),
            }))
        });
        repo.expect_set_password_hash()
            .withf(|_, hash| Password::from_hash(hash.clone()).verify("NewPass123"))
            .times(1)
            .returning(|_, _| Ok(()));

        manager(repo, MockFileStorage::new())
            .change_password(Uuid::new_v4(), "OldPass123".to_string(), "NewPass123".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_account_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().returning(|id| {
            Ok(Some(UserCredentials {
                user: user(id),
                password: Password::new("RightPass1").unwrap(),
            }))
        });
        repo.expect_soft_delete().never();

        let err = manager(repo, MockFileStorage::new())
            .delete_account(Uuid::new_v4(), "WrongPass1".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password is incorrect");
    }

    #[tokio::test]
    async fn test_delete_account_removes_avatar() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().returning(|id| {
            Ok(Some(UserCredentials {
                user: with_avatar(id, "/uploads/avatars/me.webp"),
                password: Password::new("RightPass1").unwrap(),
            }))
        });
        repo.expect_soft_delete().times(1).returning(|_| Ok(()));

        let mut storage = MockFileStorage::new();
        storage
            .expect_remove()
            .with(eq("/uploads/avatars/me.webp"))
            .times(1)
            .returning(|_| Ok(()));

        manager(repo, storage)
            .delete_account(Uuid::new_v4(), "RightPass1".to_string())
            .await
            .unwrap();
    }
}
