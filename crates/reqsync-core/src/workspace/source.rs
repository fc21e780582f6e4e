//! Transport seam for the project workspace
//!
//! The workspace only needs the requirement-scoped slice of the service
//! contract. Abstracting it behind a trait lets the synchronization logic
//! be exercised against in-process fakes with controlled timing.

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, HistoryEntry, Requirement, RequirementDraft, RequirementState};
use crate::error::Result;

/// The service calls the workspace depends on
#[async_trait]
pub trait RequirementSource: Send + Sync {
    /// Fetch the requirements belonging to one project
    async fn list_requirements(&self, project_id: &str) -> Result<Vec<Requirement>>;

    /// Create a requirement in the draft's project
    async fn create_requirement(&self, draft: &RequirementDraft) -> Result<()>;

    /// Replace a requirement's fields
    async fn update_requirement(&self, id: &str, draft: &RequirementDraft) -> Result<()>;

    /// Delete a requirement
    async fn delete_requirement(&self, id: &str) -> Result<()>;

    /// Move a requirement to a new state, returning the updated record
    async fn set_requirement_state(
        &self,
        id: &str,
        state: RequirementState,
    ) -> Result<Requirement>;

    /// Fetch a requirement's change history
    async fn requirement_history(&self, id: &str) -> Result<Vec<HistoryEntry>>;

    /// Request document generation for one project
    async fn generate_document(&self, project_id: &str) -> Result<Value>;
}

#[async_trait]
impl RequirementSource for ApiClient {
    async fn list_requirements(&self, project_id: &str) -> Result<Vec<Requirement>> {
        ApiClient::list_requirements(self, project_id).await
    }

    async fn create_requirement(&self, draft: &RequirementDraft) -> Result<()> {
        ApiClient::create_requirement(self, draft).await
    }

    async fn update_requirement(&self, id: &str, draft: &RequirementDraft) -> Result<()> {
        ApiClient::update_requirement(self, id, draft).await
    }

    async fn delete_requirement(&self, id: &str) -> Result<()> {
        ApiClient::delete_requirement(self, id).await
    }

    async fn set_requirement_state(
        &self,
        id: &str,
        state: RequirementState,
    ) -> Result<Requirement> {
        ApiClient::set_requirement_state(self, id, state).await
    }

    async fn requirement_history(&self, id: &str) -> Result<Vec<HistoryEntry>> {
        ApiClient::requirement_history(self, id).await
    }

    async fn generate_document(&self, project_id: &str) -> Result<Value> {
        ApiClient::generate_document(self, project_id).await
    }
}
