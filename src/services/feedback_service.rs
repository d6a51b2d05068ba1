//! Feedback service - public submission and admin moderation.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Feedback, FeedbackStats, NewFeedback};
use crate::errors::{AppError, AppResult};
use crate::infra::{Email, FeedbackRepository, Mailer};

#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Store new (inactive) feedback and notify the administrator
    async fn submit(&self, feedback: NewFeedback) -> AppResult<Feedback>;

    /// Moderated feedback for public display, newest first
    async fn list_active(&self) -> AppResult<Vec<Feedback>>;

    /// Everything, newest first
    async fn list_all(&self) -> AppResult<Vec<Feedback>>;

    async fn toggle_status(&self, id: Uuid) -> AppResult<Feedback>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn stats(&self) -> AppResult<FeedbackStats>;
}

pub struct FeedbackManager {
    feedback: Arc<dyn FeedbackRepository>,
    mailer: Arc<dyn Mailer>,
    admin_email: Option<String>,
}

impl FeedbackManager {
    pub fn new(
        feedback: Arc<dyn FeedbackRepository>,
        mailer: Arc<dyn Mailer>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            feedback,
            mailer,
            admin_email,
        }
    }

    async fn notify_admin(&self, feedback: &Feedback) {
        let Some(to) = self.admin_email.as_deref() else {
            tracing::debug!("ADMIN_EMAIL not set, skipping feedback notification");
            return;
        };

        let email = Email::html(
            to,
            format!("New Feedback Received - {} Stars", feedback.rating),
            notification_html(feedback),
        );
        if let Err(e) = self.mailer.send(email).await {
            tracing::error!(feedback_id = %feedback.id, error = %e, "Feedback notification failed");
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn notification_html(feedback: &Feedback) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #28a745; text-align: center;">New Feedback Received!</h2>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>Occupation:</strong> {occupation}</p>
  <p><strong>Rating:</strong> {stars} ({rating}/5)</p>
  <h3>Review:</h3>
  <p style="line-height: 1.6;">{review}</p>
  <p style="color: #6c757d; font-size: 14px;">Submitted on: {submitted}</p>
</div>"#,
        name = escape_html(&feedback.name),
        occupation = escape_html(&feedback.occupation),
        stars = feedback.stars(),
        rating = feedback.rating,
        review = escape_html(&feedback.review),
        submitted = feedback.created_at.format("%d %b %Y, %H:%M UTC"),
    )
}

#[async_trait]
impl FeedbackService for FeedbackManager {
    async fn submit(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let feedback = self.feedback.create(feedback).await?;
        tracing::info!(feedback_id = %feedback.id, rating = feedback.rating, "Feedback submitted");

        self.notify_admin(&feedback).await;
        Ok(feedback)
    }

    async fn list_active(&self) -> AppResult<Vec<Feedback>> {
        self.feedback.list(true).await
    }

    async fn list_all(&self) -> AppResult<Vec<Feedback>> {
        self.feedback.list(false).await
    }

    async fn toggle_status(&self, id: Uuid) -> AppResult<Feedback> {
        let current = self
            .feedback
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Feedback"))?;

        self.feedback.set_active(id, !current.is_active).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.feedback.delete(id).await? {
            return Err(AppError::not_found("Feedback"));
        }
        Ok(())
    }

    async fn stats(&self) -> AppResult<FeedbackStats> {
        let all = self.feedback.list(false).await?;
        Ok(FeedbackStats::from_feedback(&all))
    }
}
