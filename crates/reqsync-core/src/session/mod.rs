//! Persisted client-side session state
//!
//! The service owns all durable data. The client keeps only what the web
//! pages kept in browser storage: the bearer token, the selected project id,
//! and the last generated document. State is read once at startup and
//! written back on every change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};

/// File name next to the config file
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_document: Option<Value>,
}

/// File-backed session state
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    state: SessionState,
}

impl SessionStore {
    /// Open the session store at the default location
    pub fn open() -> Result<Self> {
        let dir = Config::config_dir().map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::at(dir.join(SESSION_FILE)))
    }

    /// Open the session store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::read_state(&path);
        Self { path, state }
    }

    /// A missing or unreadable state file is an empty session, never an error.
    fn read_state(path: &Path) -> SessionState {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return SessionState::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "session file is corrupt, starting empty");
                SessionState::default()
            }
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.state)
            .map_err(|e| Error::Other(format!("Failed to serialize session state: {}", e)))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========== Token ==========

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    /// The stored bearer token, or `AuthRequired` if there is none
    pub fn require_token(&self) -> Result<&str> {
        self.state.token.as_deref().ok_or(Error::AuthRequired)
    }

    pub fn set_token(&mut self, token: impl Into<String>) -> Result<()> {
        self.state.token = Some(token.into());
        self.save()
    }

    /// Logout clears the token only. The selected project and the cached
    /// document stay behind, matching what the original client did.
    pub fn clear_token(&mut self) -> Result<()> {
        self.state.token = None;
        self.save()
    }

    // ========== Project selection ==========

    pub fn selected_project(&self) -> Option<&str> {
        self.state.selected_project.as_deref()
    }

    pub fn set_selected_project(&mut self, id: Option<String>) -> Result<()> {
        self.state.selected_project = id;
        self.save()
    }

    // ========== Cached document ==========

    pub fn last_document(&self) -> Option<&Value> {
        self.state.last_document.as_ref()
    }

    pub fn set_last_document(&mut self, document: Value) -> Result<()> {
        self.state.last_document = Some(document);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::at(dir.path().join(SESSION_FILE))
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut store = store_in(&dir);
        store.set_token("tok-123").unwrap();
        store.set_selected_project(Some("p1".to_string())).unwrap();
        store.set_last_document(json!({"title": "DRS"})).unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.token(), Some("tok-123"));
        assert_eq!(reloaded.selected_project(), Some("p1"));
        assert_eq!(reloaded.last_document(), Some(&json!({"title": "DRS"})));
    }

    #[test]
    fn test_missing_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.token().is_none());
        assert!(store.selected_project().is_none());
        assert!(store.last_document().is_none());
    }

    #[test]
    fn test_corrupt_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::at(&path);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_require_token() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(matches!(store.require_token(), Err(Error::AuthRequired)));

        store.set_token("tok").unwrap();
        assert_eq!(store.require_token().unwrap(), "tok");
    }

    #[test]
    fn test_logout_clears_only_the_token() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_token("tok").unwrap();
        store.set_selected_project(Some("p1".to_string())).unwrap();
        store.set_last_document(json!({"k": "v"})).unwrap();

        store.clear_token().unwrap();

        let reloaded = store_in(&dir);
        assert!(reloaded.token().is_none());
        assert_eq!(reloaded.selected_project(), Some("p1"));
        assert!(reloaded.last_document().is_some());
    }

    #[test]
    fn test_clearing_selection_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_selected_project(Some("p1".to_string())).unwrap();
        store.set_selected_project(None).unwrap();

        let reloaded = store_in(&dir);
        assert!(reloaded.selected_project().is_none());
    }
}
