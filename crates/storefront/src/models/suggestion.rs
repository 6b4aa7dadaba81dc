//! Feedback submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message left through the feedback form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Unix millis at submission, bumped past ids already stored.
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    pub created_at: DateTime<Utc>,
}
