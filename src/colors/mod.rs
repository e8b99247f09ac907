//! Color → action configuration stored on the backend.

mod table;
mod types;

pub use table::{ColorTable, RowEdit, TableError};
pub use types::{ColorName, ColorRule};

use crate::client::{endpoints, ApiClient, ClientError};
use std::sync::Arc;
use types::{ColorsResponse, SaveResponse};

/// Result of a save, reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Loads and saves the full rule set.
pub struct ColorClient {
    api: Arc<ApiClient>,
}

impl ColorClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// All stored rules, in backend order.
    pub async fn try_load(&self) -> Result<Vec<ColorRule>, ClientError> {
        let response = self.api.get_json::<ColorsResponse>(endpoints::COLORS).await?;
        Ok(response.colors.into_iter().map(ColorRule::from).collect())
    }

    /// All stored rules, in backend order. Empty on any failure.
    pub async fn load(&self) -> Vec<ColorRule> {
        match self.try_load().await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load color configuration");
                Vec::new()
            }
        }
    }

    /// Replace the stored rule set with `rules`.
    pub async fn save(&self, rules: &[ColorRule]) -> SaveOutcome {
        let outcome = match self
            .api
            .post_json::<_, SaveResponse>(endpoints::COLORS, rules)
            .await
        {
            Ok(response) => match response.status.as_deref() {
                Some("success") => SaveOutcome::Saved,
                other => SaveOutcome::Failed(format!(
                    "backend answered status {}",
                    other.unwrap_or("missing")
                )),
            },
            Err(e) => SaveOutcome::Failed(e.to_string()),
        };

        match &outcome {
            SaveOutcome::Saved => tracing::info!(rules = rules.len(), "Saved color configuration"),
            SaveOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "Failed to save color configuration")
            }
        }
        outcome
    }
}
