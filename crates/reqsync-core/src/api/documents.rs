//! Document (DRS) generation endpoint
//!
//! Generation runs server-side and can take minutes. The document's shape
//! is owned by the service, so it stays raw JSON end to end; the workspace
//! layer enforces the client deadline and the non-empty check.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Request generation of the requirements document for one project
    ///
    /// The per-request timeout is widened to the configured generation
    /// deadline so the transport does not cut the call short; the caller
    /// owns the authoritative race.
    pub async fn generate_document(&self, project_id: &str) -> Result<Value> {
        debug!(project_id = %project_id, "requesting document generation");

        let response = self
            .request(Method::POST, &format!("/requisitos/gerar_drs/{}", project_id))
            .timeout(self.generation_timeout())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }
}
