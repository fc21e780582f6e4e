//! Selected-project workspace
//!
//! Owns the two pieces of view state everything else reads: which project
//! is selected and which requirements are shown. Both change only through
//! this type, which is what keeps them consistent: a selection change
//! invalidates the list immediately, and a resolved reload is applied only
//! if the selection that issued it is still current ("last selection
//! wins"). Requirement mutations never patch the list in place; they go to
//! the server and the list is re-fetched, so ordering always matches the
//! server's authoritative state.

mod source;

pub use source::RequirementSource;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::api::{HistoryEntry, Requirement, RequirementDraft, RequirementState};
use crate::error::{Error, Result};
use crate::session::SessionStore;

#[derive(Debug, Default)]
struct ViewState {
    selected_project: Option<String>,
    requirements: Vec<Requirement>,
    histories: HashMap<String, Vec<HistoryEntry>>,
    document: Option<Value>,
}

/// Workspace binding the selected project to its requirement list
pub struct Workspace {
    source: Arc<dyn RequirementSource>,
    store: Mutex<SessionStore>,
    view: RwLock<ViewState>,
    /// Bumped on every selection change; a reload result whose epoch no
    /// longer matches is stale and gets discarded.
    epoch: AtomicU64,
    generating: AtomicBool,
    generation_deadline: Duration,
}

impl Workspace {
    /// Build a workspace from persisted state without loading anything
    pub fn new(
        source: Arc<dyn RequirementSource>,
        store: SessionStore,
        generation_deadline: Duration,
    ) -> Self {
        let view = ViewState {
            selected_project: store.selected_project().map(str::to_string),
            document: store.last_document().cloned(),
            ..ViewState::default()
        };

        Self {
            source,
            store: Mutex::new(store),
            view: RwLock::new(view),
            epoch: AtomicU64::new(0),
            generating: AtomicBool::new(false),
            generation_deadline,
        }
    }

    /// Build a workspace and run the initial reload for the persisted
    /// selection. A failed initial load is logged and leaves the list
    /// empty; it never prevents the workspace from opening.
    pub async fn attach(
        source: Arc<dyn RequirementSource>,
        store: SessionStore,
        generation_deadline: Duration,
    ) -> Self {
        let workspace = Self::new(source, store, generation_deadline);
        if let Err(err) = workspace.reload().await {
            warn!(error = %err, "initial requirement load failed");
        }
        workspace
    }

    // ========== View accessors ==========

    /// Id of the currently selected project, if any
    pub async fn selected_project(&self) -> Option<String> {
        self.view.read().await.selected_project.clone()
    }

    /// The displayed requirement list
    pub async fn requirements(&self) -> Vec<Requirement> {
        self.view.read().await.requirements.clone()
    }

    /// Change history for one listed requirement, if loaded
    pub async fn history_for(&self, requirement_id: &str) -> Option<Vec<HistoryEntry>> {
        self.view.read().await.histories.get(requirement_id).cloned()
    }

    /// The last successfully generated document
    pub async fn document(&self) -> Option<Value> {
        self.view.read().await.document.clone()
    }

    /// Whether a document-generation request is in flight
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    // ========== Selection ==========

    /// Change the selected project and reload its requirements
    ///
    /// `None` clears the selection and the list without contacting the
    /// server. The previous project's data is dropped before the reload is
    /// issued so the view never shows requirements under the wrong
    /// selection, not even transiently.
    pub async fn select_project(&self, id: Option<&str>) -> Result<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut view = self.view.write().await;
            view.selected_project = id.map(str::to_string);
            view.requirements.clear();
            view.histories.clear();
        }

        {
            let mut store = self.store.lock().await;
            store.set_selected_project(id.map(str::to_string))?;
        }

        info!(project_id = ?id, "project selection changed");
        self.reload_epoch(epoch).await
    }

    // ========== Requirement list ==========

    /// Re-fetch the requirement list for the current selection
    pub async fn reload(&self) -> Result<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.reload_epoch(epoch).await
    }

    async fn reload_epoch(&self, epoch: u64) -> Result<()> {
        let project_id = { self.view.read().await.selected_project.clone() };
        let Some(project_id) = project_id else {
            // nothing selected, nothing to fetch
            return Ok(());
        };

        match self.source.list_requirements(&project_id).await {
            Ok(list) => {
                let mut view = self.view.write().await;
                if self.epoch.load(Ordering::SeqCst) != epoch
                    || view.selected_project.as_deref() != Some(project_id.as_str())
                {
                    debug!(project_id = %project_id, "discarding stale requirement list");
                    return Ok(());
                }
                debug!(project_id = %project_id, count = list.len(), "requirement list loaded");
                view.requirements = list;
                Ok(())
            }
            Err(err) => {
                // previous list stays as it was
                warn!(project_id = %project_id, error = %err, "failed to load requirements");
                Err(err)
            }
        }
    }

    // ========== Requirement mutations ==========

    /// Create a requirement in the selected project, then re-fetch the list
    pub async fn create_requirement(
        &self,
        title: String,
        description: String,
        version: String,
    ) -> Result<()> {
        let project_id = self
            .selected_project()
            .await
            .ok_or(Error::NoProjectSelected)?;

        let draft = RequirementDraft {
            title,
            description,
            version,
            project_id,
        };
        self.source.create_requirement(&draft).await?;
        self.reload().await
    }

    /// Update a requirement, then re-fetch the list
    ///
    /// Unspecified fields keep their current values, taken from the loaded
    /// list the same way the edit form pre-filled its inputs.
    pub async fn update_requirement(
        &self,
        id: &str,
        title: Option<String>,
        description: Option<String>,
        version: Option<String>,
    ) -> Result<()> {
        let (project_id, existing) = {
            let view = self.view.read().await;
            let project_id = view
                .selected_project
                .clone()
                .ok_or(Error::NoProjectSelected)?;
            let existing = view.requirements.iter().find(|r| r.id == id).cloned();
            (project_id, existing)
        };
        let existing = existing.ok_or_else(|| Error::RequirementNotFound(id.to_string()))?;

        let draft = RequirementDraft {
            title: title.unwrap_or(existing.title),
            description: description.unwrap_or(existing.description),
            version: version.unwrap_or(existing.version),
            project_id,
        };
        self.source.update_requirement(id, &draft).await?;
        self.reload().await
    }

    /// Delete a requirement, then re-fetch the list
    pub async fn delete_requirement(&self, id: &str) -> Result<()> {
        self.source.delete_requirement(id).await?;
        self.reload().await
    }

    /// Transition a requirement's state, then re-fetch the list
    pub async fn set_requirement_state(
        &self,
        id: &str,
        state: RequirementState,
    ) -> Result<Requirement> {
        let updated = self.source.set_requirement_state(id, state).await?;
        self.reload().await?;
        Ok(updated)
    }

    // ========== History ==========

    /// Load the change history of every listed requirement
    ///
    /// One independent request per requirement, merged into the history map
    /// keyed by requirement id. Entries fail independently: a single bad
    /// fetch is logged and skipped. If the selection changed while the
    /// batch was in flight the whole batch is discarded.
    pub async fn load_histories(&self) -> Result<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let ids: Vec<String> = {
            self.view
                .read()
                .await
                .requirements
                .iter()
                .map(|r| r.id.clone())
                .collect()
        };
        if ids.is_empty() {
            return Ok(());
        }

        let fetches = ids.into_iter().map(|id| {
            let source = Arc::clone(&self.source);
            async move {
                let result = source.requirement_history(&id).await;
                (id, result)
            }
        });
        let results = join_all(fetches).await;

        let mut view = self.view.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding history batch for a superseded selection");
            return Ok(());
        }
        for (id, result) in results {
            match result {
                Ok(entries) => {
                    view.histories.insert(id, entries);
                }
                Err(err) => {
                    warn!(requirement_id = %id, error = %err, "failed to load history");
                }
            }
        }
        Ok(())
    }

    // ========== Document generation ==========

    /// Generate the requirements document for the selected project
    ///
    /// The request races the configured deadline; on timeout the in-flight
    /// request is dropped, which aborts it, and no retry happens. An empty
    /// payload counts as failure. Only a successful, non-empty document
    /// replaces the cached one.
    pub async fn generate_document(&self) -> Result<Value> {
        let project_id = self
            .selected_project()
            .await
            .ok_or(Error::NoProjectSelected)?;

        let deadline = self.generation_deadline;
        self.generating.store(true, Ordering::SeqCst);
        let outcome =
            tokio::time::timeout(deadline, self.source.generate_document(&project_id)).await;
        self.generating.store(false, Ordering::SeqCst);

        let document = match outcome {
            Err(_) => {
                warn!(project_id = %project_id, deadline_secs = deadline.as_secs(), "document generation timed out");
                return Err(Error::GenerationTimeout(deadline.as_secs()));
            }
            Ok(Err(Error::Network(err))) if err.is_timeout() => {
                warn!(project_id = %project_id, deadline_secs = deadline.as_secs(), "document generation timed out");
                return Err(Error::GenerationTimeout(deadline.as_secs()));
            }
            Ok(Err(err)) => {
                warn!(project_id = %project_id, error = %err, "document generation failed");
                return Err(err);
            }
            Ok(Ok(document)) => document,
        };

        if is_empty_document(&document) {
            warn!(project_id = %project_id, "document generation returned an empty payload");
            return Err(Error::EmptyDocument);
        }

        info!(project_id = %project_id, "document generated");
        {
            let mut view = self.view.write().await;
            view.document = Some(document.clone());
        }
        {
            let mut store = self.store.lock().await;
            store.set_last_document(document.clone())?;
        }
        Ok(document)
    }
}

/// An absent, null, or element-free payload counts as no document at all.
fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
