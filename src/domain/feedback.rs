//! Customer feedback entity and moderation statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A piece of customer feedback. Hidden from the public list until an
/// administrator activates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    #[schema(example = "Gurpreet Singh")]
    pub name: String,
    #[schema(example = "Wheat farmer")]
    pub occupation: String,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    #[schema(example = "The soil report doubled my yield.")]
    pub review: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Rating rendered as five filled/empty stars.
    pub fn stars(&self) -> String {
        let filled = self.rating.clamp(0, 5) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

/// Data for a new, not yet moderated feedback entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub name: String,
    pub occupation: String,
    pub rating: i32,
    pub review: String,
}

/// Number of feedback entries carrying a given rating.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingCount {
    #[schema(example = 5)]
    pub rating: i32,
    #[schema(example = 12)]
    pub count: u64,
}

/// Aggregate view over all feedback.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total_feedbacks: u64,
    pub active_feedbacks: u64,
    pub inactive_feedbacks: u64,
    /// Mean rating rounded to two decimals, 0 when there is no feedback
    #[schema(example = 4.25)]
    pub average_rating: f64,
    /// Sorted by rating, ascending
    pub rating_distribution: Vec<RatingCount>,
}

impl FeedbackStats {
    pub fn from_feedback(feedback: &[Feedback]) -> Self {
        let total = feedback.len() as u64;
        let active = feedback.iter().filter(|f| f.is_active).count() as u64;

        let average_rating = if feedback.is_empty() {
            0.0
        } else {
            let sum: i64 = feedback.iter().map(|f| f.rating as i64).sum();
            let mean = sum as f64 / feedback.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        let mut buckets: BTreeMap<i32, u64> = BTreeMap::new();
        for entry in feedback {
            *buckets.entry(entry.rating).or_default() += 1;
        }

        Self {
            total_feedbacks: total,
            active_feedbacks: active,
            inactive_feedbacks: total - active,
            average_rating,
            rating_distribution: buckets
                .into_iter()
                .map(|(rating, count)| RatingCount { rating, count })
                .collect(),
        }
    }
}
