//! `/admin/prompt` endpoints.

use reqwest::Method;

use super::{AdminClient, ClientError};
use crate::models::{Prompt, PromptEnvelope, PromptPayload};

impl AdminClient {
    /// A 404 here is the normal "not created yet" state and maps to `None`.
    pub(super) async fn fetch_prompt(&self) -> Result<Option<Prompt>, ClientError> {
        match self.get::<PromptEnvelope>(self.url(&["admin", "prompt"])).await {
            Ok(envelope) => Ok(Some(envelope.prompt)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST creates the prompt, PUT replaces its text.
    pub(super) async fn write_prompt(&self, method: Method, text: &str) -> Result<Prompt, ClientError> {
        let payload = PromptPayload::new(text);
        let envelope: PromptEnvelope = self
            .send(method, self.url(&["admin", "prompt"]), Some(&payload))
            .await?;
        Ok(envelope.prompt)
    }
}
