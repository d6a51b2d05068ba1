//! In-memory doubles shared by the integration tests.
//!
//! These stand in for the SeaORM stores, the upload directory and SMTP so
//! services and the router can be exercised without infrastructure.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use agriproxy::api::AppState;
use agriproxy::domain::{
    Feedback, NewFeedback, NewSoilTestRequest, NewUser, Password, ProfileChanges, SoilTestRequest,
    SoilTestStatus, User, UserCredentials, UserRole,
};
use agriproxy::errors::{AppError, AppResult};
use agriproxy::infra::{
    Database, Email, FeedbackRepository, FileStorage, Mailer, SoilTestRepository, UserRepository,
};
use agriproxy::services::{
    Authenticator, FeedbackManager, ProfileManager, SoilTestManager, TokenService,
};

pub const JWT_SECRET: &[u8] = b"integration-test-secret-at-least-32-chars";
pub const PASSWORD: &str = "Harvest2024";

// =============================================================================
// Users
// =============================================================================

#[derive(Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, StoredUser>>,
}

impl InMemoryUsers {
    /// Insert an active account with the given password.
    pub fn seed(&self, email: &str, name: &str, password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: None,
            name: name.to_string(),
            phone: None,
            location: None,
            avatar: None,
            role: UserRole::User,
            is_active: true,
            profile_completed: false,
            email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let password_hash = Password::new(password)
            .expect("hash test password")
            .into_string();

        self.users.lock().unwrap().insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        user
    }

    /// Mutate a stored user directly.
    pub fn edit(&self, id: Uuid, f: impl FnOnce(&mut User)) {
        let mut users = self.users.lock().unwrap();
        let stored = users.get_mut(&id).expect("seeded user");
        f(&mut stored.user);
    }

    pub fn get(&self, id: Uuid) -> User {
        self.users.lock().unwrap()[&id].user.clone()
    }

    pub fn password_hash(&self, id: Uuid) -> String {
        self.users.lock().unwrap()[&id].password_hash.clone()
    }

    fn modify<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut StoredUser) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User"))?;
        let result = f(stored)?;
        stored.user.updated_at = Utc::now();
        Ok(result)
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<StoredUser> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|s| predicate(&s.user))
            .cloned()
    }
}

fn credentials(stored: StoredUser) -> UserCredentials {
    UserCredentials {
        user: stored.user,
        password: Password::from_hash(stored.password_hash),
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.find(|u| u.email == email).map(|s| s.user))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .find(|u| u.username.as_deref() == Some(username))
            .map(|s| s.user))
    }

    async fn find_credentials(&self, id: Uuid) -> AppResult<Option<UserCredentials>> {
        Ok(self.users.lock().unwrap().get(&id).cloned().map(credentials))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        Ok(self.find(|u| u.email == email).map(credentials))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        if self.find(|u| u.email == new_user.email).is_some() {
            return Err(AppError::conflict("User"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            username: None,
            name: new_user.name,
            phone: new_user.phone,
            location: new_user.location,
            avatar: None,
            role: UserRole::User,
            is_active: true,
            profile_completed: false,
            email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.users.lock().unwrap().insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        if let Some(username) = changes.username.as_deref() {
            if self
                .find(|u| u.id != id && u.username.as_deref() == Some(username))
                .is_some()
            {
                return Err(AppError::UsernameTaken);
            }
        }

        self.modify(id, |stored| {
            let user = &mut stored.user;
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(phone) = changes.phone {
                user.phone = Some(phone);
            }
            if let Some(location) = changes.location {
                user.location = Some(location);
            }
            if let Some(username) = changes.username {
                user.username = Some(username);
            }
            user.profile_completed = true;
            Ok(user.clone())
        })
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<String>) -> AppResult<User> {
        self.modify(id, |stored| {
            stored.user.avatar = avatar;
            Ok(stored.user.clone())
        })
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        self.modify(id, |stored| {
            stored.password_hash = password_hash;
            Ok(())
        })
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<User> {
        self.modify(id, |stored| {
            stored.user.last_login = Some(Utc::now());
            Ok(stored.user.clone())
        })
    }

    async fn set_role(&self, email: &str, role: UserRole) -> AppResult<User> {
        let id = self
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::not_found("User"))?
            .user
            .id;
        self.modify(id, |stored| {
            stored.user.role = role;
            Ok(stored.user.clone())
        })
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        self.modify(id, |stored| {
            stored.user.is_active = false;
            stored.user.avatar = None;
            stored.user.deleted_at = Some(Utc::now());
            Ok(())
        })
    }
}

// =============================================================================
// File storage
// =============================================================================

/// Records saved and removed avatar references.
#[derive(Default)]
pub struct InMemoryStorage {
    files: Mutex<HashSet<String>>,
    removed: Mutex<Vec<String>>,
}

impl InMemoryStorage {
    /// Pretend a file already exists under `reference`.
    pub fn put(&self, reference: &str) {
        self.files.lock().unwrap().insert(reference.to_string());
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.files.lock().unwrap().contains(reference)
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl FileStorage for InMemoryStorage {
    async fn save_avatar(&self, file_name: &str, _bytes: Vec<u8>) -> AppResult<String> {
        let reference = format!("/uploads/avatars/{}", file_name);
        self.files.lock().unwrap().insert(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> AppResult<()> {
        self.files.lock().unwrap().remove(reference);
        self.removed.lock().unwrap().push(reference.to_string());
        Ok(())
    }
}

// =============================================================================
// Mail
// =============================================================================

/// Captures outgoing mail; can be switched to fail every send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        if self.failing {
            return Err(AppError::internal("SMTP unavailable"));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

// =============================================================================
// Feedback and soil tests
// =============================================================================

#[derive(Default)]
pub struct InMemoryFeedback {
    items: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedback {
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let mut items = self.items.lock().unwrap();
        // Strictly increasing timestamps keep "newest first" deterministic.
        let now = Utc::now() + Duration::milliseconds(items.len() as i64);
        let stored = Feedback {
            id: Uuid::new_v4(),
            name: feedback.name,
            occupation: feedback.occupation,
            rating: feedback.rating,
            review: feedback.review,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        items.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Feedback>> {
        let mut items: Vec<_> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|f| !active_only || f.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Feedback>> {
        Ok(self.items.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Feedback> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::not_found("Feedback"))?;
        item.is_active = is_active;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| f.id != id);
        Ok(items.len() != before)
    }
}

#[derive(Default)]
pub struct InMemorySoilTests {
    requests: Mutex<BTreeMap<i32, SoilTestRequest>>,
}

#[async_trait]
impl SoilTestRepository for InMemorySoilTests {
    async fn create(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest> {
        let mut requests = self.requests.lock().unwrap();
        let id = requests.keys().next_back().copied().unwrap_or(0) + 1;
        let now = Utc::now();
        let stored = SoilTestRequest {
            id,
            user_id: request.user_id,
            crop: request.crop,
            farm_area: request.farm_area,
            survey_number: request.survey_number,
            address_line: request.address_line,
            city: request.city,
            state: request.state,
            pincode: request.pincode,
            contact: request.contact,
            package_type: request.package_type,
            package_price: request.package_price,
            bag_items: request.bag_items,
            total_bags: request.total_bags,
            status: SoilTestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> AppResult<Vec<SoilTestRequest>> {
        Ok(self.requests.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<SoilTestRequest>> {
        Ok(self.requests.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: i32,
        status: SoilTestStatus,
    ) -> AppResult<Option<SoilTestRequest>> {
        let mut requests = self.requests.lock().unwrap();
        Ok(requests.get_mut(&id).map(|r| {
            r.status = status;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.requests.lock().unwrap().remove(&id).is_some())
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Everything a router test needs to arrange state and inspect effects.
pub struct TestApp {
    pub state: AppState,
    pub users: Arc<InMemoryUsers>,
    pub storage: Arc<InMemoryStorage>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let storage = Arc::new(InMemoryStorage::default());
        let mailer = Arc::new(mailer);

        let state = AppState::new(
            Arc::new(Authenticator::new(users.clone(), tokens())),
            Arc::new(ProfileManager::new(users.clone(), storage.clone())),
            Arc::new(FeedbackManager::new(
                Arc::new(InMemoryFeedback::default()),
                mailer.clone(),
                Some("admin@agriproxy.com".to_string()),
            )),
            Arc::new(SoilTestManager::new(
                Arc::new(InMemorySoilTests::default()),
                mailer.clone(),
                "support@agriproxy.com",
            )),
            Arc::new(Database::from_connection(DatabaseConnection::Disconnected)),
            PathBuf::from("uploads"),
        );

        Self {
            state,
            users,
            storage,
            mailer,
            tokens: tokens(),
        }
    }

    /// Seed a user and return it with a valid bearer token.
    pub fn signed_in(&self, email: &str) -> (User, String) {
        let user = self.users.seed(email, "Test Farmer", PASSWORD);
        let token = self.tokens.issue(user.id).expect("issue token");
        (user, token)
    }

    pub fn signed_in_admin(&self, email: &str) -> (User, String) {
        let (user, token) = self.signed_in(email);
        self.users.edit(user.id, |u| u.role = UserRole::Admin);
        (self.users.get(user.id), token)
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(JWT_SECRET, Duration::hours(1))
}
