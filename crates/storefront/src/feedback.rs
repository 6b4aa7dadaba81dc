//! Feedback form submissions.

use chrono::Utc;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::models::{Suggestion, keys};
use crate::store::{JsonStore, StoreError};

/// Append-only list of suggestions left by shoppers.
#[derive(Debug, Clone)]
pub struct FeedbackBox {
    store: JsonStore,
}

impl FeedbackBox {
    #[must_use]
    pub const fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Record a suggestion and return it.
    ///
    /// Fields are stored trimmed; nothing is validated. The id is the
    /// submission time in unix millis, bumped past any id already stored.
    /// Stored entries this build cannot read are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails.
    #[instrument(skip_all)]
    pub fn submit(&self, name: &str, email: &str, message: &str) -> Result<Suggestion> {
        let now = Utc::now();
        let mut stored: Vec<Value> = self.store.load(keys::SUGGESTIONS, Vec::new());
        let taken: Vec<i64> = stored
            .iter()
            .filter_map(|entry| entry.get("id").and_then(Value::as_i64))
            .collect();

        let suggestion = Suggestion {
            id: next_id(now.timestamp_millis(), &taken),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
            created_at: now,
        };

        stored.push(serde_json::to_value(&suggestion).map_err(StoreError::from)?);
        self.store.save(keys::SUGGESTIONS, &stored)?;

        tracing::info!(id = suggestion.id, "Suggestion received");
        Ok(suggestion)
    }

    /// Every stored suggestion, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<Suggestion> {
        let raw: Vec<Value> = self.store.load(keys::SUGGESTIONS, Vec::new());
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value::<Suggestion>(value) {
                Ok(suggestion) => Some(suggestion),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable stored suggestion");
                    None
                }
            })
            .collect()
    }
}

fn next_id(now_millis: i64, taken: &[i64]) -> i64 {
    let mut id = now_millis;
    while taken.contains(&id) {
        id += 1;
    }
    id
}
