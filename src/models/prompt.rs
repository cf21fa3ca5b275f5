//! The global assistant prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::string_or_number;

/// The single prompt the assistant runs with.
///
/// At most one exists per deployment. It is created once and updated
/// afterwards; it is never deleted from the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for both create and update calls
#[derive(Debug, Clone, Serialize)]
pub struct PromptPayload {
    pub prompt: String,
}

impl PromptPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            prompt: text.into(),
        }
    }
}

/// Envelope returned by every prompt endpoint
#[derive(Debug, Deserialize)]
pub struct PromptEnvelope {
    pub prompt: Prompt,
}
