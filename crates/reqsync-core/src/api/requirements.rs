//! Requirement endpoints
//!
//! Requirements are always scoped to a project; the list call takes the
//! owning project id and mutations carry it in the payload. State
//! transitions go through a dedicated endpoint and the server decides which
//! transitions are legal.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiClient;
use crate::error::Result;

/// Lifecycle state of a requirement
///
/// The variants carry the service's wire values; `parse` also accepts the
/// English names for command-line use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementState {
    #[serde(rename = "Proposto")]
    Proposed,
    #[serde(rename = "Aprovado")]
    Approved,
    #[serde(rename = "Rejeitado")]
    Rejected,
    #[serde(rename = "Implementado")]
    Implemented,
    #[serde(rename = "Em Produção")]
    InProduction,
}

impl RequirementState {
    /// Every state the service knows about
    pub const ALL: [RequirementState; 5] = [
        RequirementState::Proposed,
        RequirementState::Approved,
        RequirementState::Rejected,
        RequirementState::Implemented,
        RequirementState::InProduction,
    ];

    /// Wire value for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementState::Proposed => "Proposto",
            RequirementState::Approved => "Aprovado",
            RequirementState::Rejected => "Rejeitado",
            RequirementState::Implemented => "Implementado",
            RequirementState::InProduction => "Em Produção",
        }
    }

    /// Parse from a wire value or an English alias
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "proposto" | "proposed" => Some(RequirementState::Proposed),
            "aprovado" | "approved" => Some(RequirementState::Approved),
            "rejeitado" | "rejected" => Some(RequirementState::Rejected),
            "implementado" | "implemented" => Some(RequirementState::Implemented),
            "em produção" | "em producao" | "in production" | "in-production" => {
                Some(RequirementState::InProduction)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RequirementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requirement record owned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "versao")]
    pub version: String,
    #[serde(rename = "estado")]
    pub state: RequirementState,
    #[serde(rename = "data_criacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "projeto_id")]
    pub project_id: String,
}

/// Payload for creating or updating a requirement
#[derive(Debug, Clone, Serialize)]
pub struct RequirementDraft {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "versao")]
    pub version: String,
    #[serde(rename = "projeto_id")]
    pub project_id: String,
}

/// One immutable entry in a requirement's change history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "estado_anterior", default)]
    pub previous_state: Option<RequirementState>,
    #[serde(rename = "estado_novo")]
    pub new_state: RequirementState,
    #[serde(rename = "data_alteracao")]
    pub changed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StateChangeRequest {
    novo_estado: RequirementState,
}

impl ApiClient {
    /// List the requirements belonging to one project
    pub async fn list_requirements(&self, project_id: &str) -> Result<Vec<Requirement>> {
        let response = self
            .request(Method::GET, "/requisitos")
            .query(&[("projeto_id", project_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }

    /// Create a requirement in the draft's project
    pub async fn create_requirement(&self, draft: &RequirementDraft) -> Result<()> {
        debug!(title = %draft.title, project_id = %draft.project_id, "creating requirement");

        let response = self
            .request(Method::POST, "/requisitos")
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Replace a requirement's fields
    pub async fn update_requirement(&self, id: &str, draft: &RequirementDraft) -> Result<()> {
        debug!(requirement_id = %id, "updating requirement");

        let response = self
            .request(Method::PUT, &format!("/requisitos/{}", id))
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Delete a requirement
    pub async fn delete_requirement(&self, id: &str) -> Result<()> {
        debug!(requirement_id = %id, "deleting requirement");

        let response = self
            .request(Method::DELETE, &format!("/requisitos/{}", id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Move a requirement to a new state
    ///
    /// No transition check happens client-side; the server owns the rules
    /// and replies with the updated record.
    pub async fn set_requirement_state(
        &self,
        id: &str,
        state: RequirementState,
    ) -> Result<Requirement> {
        debug!(requirement_id = %id, state = %state, "changing requirement state");

        let response = self
            .request(Method::PUT, &format!("/requisitos/{}/estado", id))
            .json(&StateChangeRequest { novo_estado: state })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }

    /// Fetch a requirement's change history
    pub async fn requirement_history(&self, id: &str) -> Result<Vec<HistoryEntry>> {
        let response = self
            .request(Method::GET, &format!("/requisitos/{}/historico", id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }
}
