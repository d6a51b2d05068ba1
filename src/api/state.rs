//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::infra::{
    Database, FeedbackStore, FileStorage, LocalFileStorage, Mailer, SoilTestStore, UserRepository,
    UserStore,
};
use crate::services::{
    AuthService, Authenticator, FeedbackManager, FeedbackService, ProfileManager, ProfileService,
    SoilTestManager, SoilTestService, TokenService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Signup, login and bearer token resolution
    pub auth_service: Arc<dyn AuthService>,
    /// Profile operations for the signed-in user
    pub profile_service: Arc<dyn ProfileService>,
    pub feedback_service: Arc<dyn FeedbackService>,
    pub soil_test_service: Arc<dyn SoilTestService>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
    /// Directory served under `/uploads`
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Wire the store-backed services from a database connection and config.
    pub fn from_config(database: Arc<Database>, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        let connection = database.get_connection();

        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(connection.clone()));
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(config.upload_dir.clone()));

        Self {
            auth_service: Arc::new(Authenticator::new(
                users.clone(),
                TokenService::from_config(config),
            )),
            profile_service: Arc::new(ProfileManager::new(users, storage)),
            feedback_service: Arc::new(FeedbackManager::new(
                Arc::new(FeedbackStore::new(connection.clone())),
                mailer.clone(),
                config.mail.admin_email.clone(),
            )),
            soil_test_service: Arc::new(SoilTestManager::new(
                Arc::new(SoilTestStore::new(connection)),
                mailer,
                config.mail.store_support_email.clone(),
            )),
            database,
            upload_dir: config.upload_dir.clone(),
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        profile_service: Arc<dyn ProfileService>,
        feedback_service: Arc<dyn FeedbackService>,
        soil_test_service: Arc<dyn SoilTestService>,
        database: Arc<Database>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            auth_service,
            profile_service,
            feedback_service,
            soil_test_service,
            database,
            upload_dir: upload_dir.into(),
        }
    }
}
