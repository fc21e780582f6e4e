//! Project endpoints
//!
//! The service's wire fields are Portuguese; the client maps them onto
//! English names at the serde boundary and nowhere else.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiClient;
use crate::error::Result;

/// A project record owned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "escopo")]
    pub scope: String,
    #[serde(rename = "perspectiva", default)]
    pub perspective: Option<String>,
    #[serde(rename = "funcoes", default)]
    pub functions: Option<String>,
    #[serde(rename = "restricoes", default)]
    pub constraints: Option<String>,
}

/// Payload for creating or updating a project
///
/// Name, description, and scope are the required form fields; the rest may
/// be left empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "escopo")]
    pub scope: String,
    #[serde(rename = "perspectiva")]
    pub perspective: Option<String>,
    #[serde(rename = "funcoes")]
    pub functions: Option<String>,
    #[serde(rename = "restricoes")]
    pub constraints: Option<String>,
}

impl From<Project> for ProjectDraft {
    fn from(p: Project) -> Self {
        Self {
            name: p.name,
            description: p.description,
            scope: p.scope,
            perspective: p.perspective,
            functions: p.functions,
            constraints: p.constraints,
        }
    }
}

impl ApiClient {
    /// List all projects visible to the current user
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let response = self.request(Method::GET, "/projetos").send().await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(response.json().await?)
    }

    /// Create a project
    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<()> {
        debug!(name = %draft.name, "creating project");

        let response = self
            .request(Method::POST, "/projetos")
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Replace a project's fields
    pub async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<()> {
        debug!(project_id = %id, "updating project");

        let response = self
            .request(Method::PUT, &format!("/projetos/{}", id))
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }

    /// Delete a project
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        debug!(project_id = %id, "deleting project");

        let response = self
            .request(Method::DELETE, &format!("/projetos/{}", id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.error_response(status, response).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_wire_names() {
        let json = r#"{
            "id": "p1",
            "nome": "Billing",
            "descricao": "Billing rework",
            "escopo": "Invoices only",
            "perspectiva": "Finance team",
            "funcoes": "Issue, void",
            "restricoes": "PCI"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.name, "Billing");
        assert_eq!(project.scope, "Invoices only");
        assert_eq!(project.constraints.as_deref(), Some("PCI"));
    }

    #[test]
    fn test_project_optional_fields_default() {
        let json = r#"{"id": "p2", "nome": "X", "descricao": "d", "escopo": "s"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert!(project.perspective.is_none());
        assert!(project.functions.is_none());
    }

    #[test]
    fn test_draft_serializes_portuguese_names() {
        let draft = ProjectDraft {
            name: "Billing".to_string(),
            description: "d".to_string(),
            scope: "s".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["nome"], "Billing");
        assert_eq!(body["descricao"], "d");
        assert_eq!(body["escopo"], "s");
        assert!(body["perspectiva"].is_null());
    }

    #[test]
    fn test_draft_from_project_keeps_all_fields() {
        let project = Project {
            id: "p1".to_string(),
            name: "n".to_string(),
            description: "d".to_string(),
            scope: "s".to_string(),
            perspective: Some("p".to_string()),
            functions: None,
            constraints: Some("c".to_string()),
        };
        let draft = ProjectDraft::from(project);
        assert_eq!(draft.perspective.as_deref(), Some("p"));
        assert_eq!(draft.constraints.as_deref(), Some("c"));
    }
}
