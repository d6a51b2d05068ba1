//! Feedback repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::feedback::{self, ActiveModel, Entity as FeedbackEntity};
use crate::domain::{Feedback, NewFeedback};
use crate::errors::{AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Store new feedback, inactive until moderated
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback>;

    /// Newest first; `active_only` hides unmoderated entries
    async fn list(&self, active_only: bool) -> AppResult<Vec<Feedback>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Feedback>>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Feedback>;

    /// Hard delete. Returns false when nothing matched.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct FeedbackStore {
    db: DatabaseConnection,
}

impl FeedbackStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedbackRepository for FeedbackStore {
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(feedback.name),
            occupation: Set(feedback.occupation),
            rating: Set(feedback.rating),
            review: Set(feedback.review),
            is_active: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Feedback::from(model))
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Feedback>> {
        let mut query = FeedbackEntity::find();
        if active_only {
            query = query.filter(feedback::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_desc(feedback::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Feedback::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Feedback>> {
        let result = FeedbackEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Feedback::from))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Feedback> {
        let model = FeedbackEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Feedback")?;

        let mut active: ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Feedback::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = FeedbackEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
