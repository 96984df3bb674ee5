//! Review models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{coerce_number, timestamp_now};

/// Rating stored when a review is created without a usable one.
pub const DEFAULT_RATING: i32 = 5;

/// A review as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Job the review refers to (not checked against the jobs collection).
    pub job_id: Option<String>,
    /// Owner identity; only this email may update or delete the review.
    pub user_email: String,
    /// Display name.
    pub name: String,
    pub rating: i32,
    pub text: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Create-review request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Loosely typed: numbers and numeric strings are both accepted.
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
}

impl NewReview {
    /// Build the stored record for an author already verified to own `user_email`.
    ///
    /// The display name falls back to `fallback_names` in order, skipping
    /// empty values.
    pub fn into_review<'a>(
        self,
        user_email: String,
        fallback_names: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Review {
        let name = self.name.filter(|n| !n.is_empty()).unwrap_or_else(|| {
            fallback_names
                .into_iter()
                .flatten()
                .find(|n| !n.is_empty())
                .unwrap_or_default()
                .to_string()
        });

        let rating = self
            .rating
            .as_ref()
            .and_then(rating_from_value)
            .filter(|r| *r != 0)
            .unwrap_or(DEFAULT_RATING);

        Review {
            job_id: self.job_id,
            user_email,
            name,
            rating,
            text: self.text.unwrap_or_default(),
            created_at: timestamp_now(),
        }
    }
}

/// Update-review request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
}

/// Field changes applied to an existing review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChanges {
    /// New text; `None` keeps the stored text.
    pub text: Option<String>,
    /// New rating; `None` keeps the stored rating.
    pub rating: Option<i32>,
    /// RFC 3339 modification timestamp.
    pub updated_at: String,
}

impl From<ReviewUpdate> for ReviewChanges {
    fn from(update: ReviewUpdate) -> Self {
        Self {
            text: update.text,
            rating: update.rating.as_ref().and_then(rating_from_value),
            updated_at: timestamp_now(),
        }
    }
}

/// Exact-match filters for listing reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilter {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

fn rating_from_value(value: &Value) -> Option<i32> {
    let number = coerce_number(value)?.round();
    if number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number as i32)
}
