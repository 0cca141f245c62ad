//! Sidecar persistence for overlays.
//!
//! Favorites and delete markers are kept in a JSON file separate from the
//! conversation exports, keyed by a conversation key (the CLI uses the
//! canonical path of the export file).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Overlay, OverlayHooks};
use crate::error::{Result, ViewerError};
use crate::util::atomic_write;

/// Overlay storage filename.
const OVERLAY_FILENAME: &str = "overlays.json";

/// All persisted overlays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayStore {
    /// Version of the store format.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Overlays keyed by conversation key.
    #[serde(default)]
    pub conversations: BTreeMap<String, Overlay>,
}

fn default_version() -> u32 {
    1
}

impl OverlayStore {
    /// Load the store from a path; a missing file is an empty store.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                version: default_version(),
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::io(format!("Failed to read overlay file: {}", path.display()), e)
        })?;

        serde_json::from_str(&content).map_err(|e| ViewerError::InvalidConfig {
            message: format!("Invalid overlay file: {e}"),
        })
    }

    /// Save the store to a path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            ViewerError::SerializationError {
                context: "Failed to serialize overlays".to_string(),
                source: e,
            }
        })?;
        atomic_write(path, content.as_bytes())
    }

    /// Overlay for a conversation (empty if none stored).
    #[must_use]
    pub fn overlay(&self, key: &str) -> Overlay {
        self.conversations.get(key).cloned().unwrap_or_default()
    }

    /// Mutable overlay for a conversation, created if needed.
    pub fn overlay_mut(&mut self, key: &str) -> &mut Overlay {
        self.conversations.entry(key.to_string()).or_default()
    }

    /// Drop empty overlays.
    pub fn cleanup(&mut self) {
        self.conversations.retain(|_, overlay| !overlay.is_empty());
    }
}

/// Get the default overlay store path.
pub fn default_overlay_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| ViewerError::Unsupported {
        feature: "data directory discovery".to_string(),
    })?;

    Ok(data_dir.join("chain-viewer").join(OVERLAY_FILENAME))
}

/// Shared record of the first failed write of a [`StoreHooks`].
///
/// Hooks cannot return errors, so callers that must know whether intent
/// reached disk keep a handle and check it after the session calls.
#[derive(Debug, Clone, Default)]
pub struct PersistStatus(Arc<Mutex<Option<ViewerError>>>);

impl PersistStatus {
    fn record(&self, error: ViewerError) {
        if let Ok(mut slot) = self.0.lock() {
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }

    /// Take the recorded failure, if any, as an error.
    pub fn check(&self) -> Result<()> {
        match self.0.lock().ok().and_then(|mut slot| slot.take()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Hooks that write every event through to an [`OverlayStore`] file.
///
/// Failures to persist are logged and kept in the [`PersistStatus`].
#[derive(Debug, Clone)]
pub struct StoreHooks {
    path: PathBuf,
    key: String,
    status: PersistStatus,
}

impl StoreHooks {
    /// Persist events for conversation `key` into the store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            status: PersistStatus::default(),
        }
    }

    /// Handle on the persistence outcome, shared with these hooks.
    #[must_use]
    pub fn status(&self) -> PersistStatus {
        self.status.clone()
    }

    fn update(&self, apply: impl FnOnce(&mut Overlay)) {
        let result = OverlayStore::load_from(&self.path).and_then(|mut store| {
            apply(store.overlay_mut(&self.key));
            store.cleanup();
            store.save_to(&self.path)
        });
        match result {
            Ok(()) => debug!(path = %self.path.display(), key = %self.key, "overlay persisted"),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to persist overlay");
                self.status.record(e);
            }
        }
    }
}

impl OverlayHooks for StoreHooks {
    fn on_toggle_favorite(&mut self, id: &str, favorite: bool) {
        self.update(|overlay| {
            if favorite {
                overlay.favorites.insert(id.to_string());
            } else {
                overlay.favorites.remove(id);
            }
        });
    }

    fn on_delete(&mut self, id: &str) {
        self.update(|overlay| {
            overlay.mark_deleted(id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = OverlayStore::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(store.version, 1);
        assert!(store.conversations.is_empty());
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(OVERLAY_FILENAME);

        let mut store = OverlayStore::default();
        store.overlay_mut("conv").toggle_favorite("n1");
        store.overlay_mut("empty");
        store.cleanup();
        store.save_to(&path).unwrap();

        let loaded = OverlayStore::load_from(&path).unwrap();
        assert!(loaded.overlay("conv").is_favorite("n1"));
        assert!(!loaded.conversations.contains_key("empty"));
    }

    #[test]
    fn test_store_hooks_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERLAY_FILENAME);
        let mut hooks = StoreHooks::new(&path, "conv");

        hooks.on_toggle_favorite("a", true);
        hooks.on_delete("b");
        let overlay = OverlayStore::load_from(&path).unwrap().overlay("conv");
        assert!(overlay.is_favorite("a"));
        assert!(overlay.is_deleted("b"));

        hooks.on_toggle_favorite("a", false);
        let overlay = OverlayStore::load_from(&path).unwrap().overlay("conv");
        assert!(!overlay.is_favorite("a"));
    }

    #[test]
    fn test_store_hooks_report_failed_writes() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("afile");
        std::fs::write(&blocker, "").unwrap();
        let mut hooks = StoreHooks::new(blocker.join(OVERLAY_FILENAME), "conv");
        let status = hooks.status();

        assert!(status.check().is_ok());
        hooks.on_toggle_favorite("a", true);
        hooks.on_delete("b");

        assert!(matches!(status.check(), Err(ViewerError::IoError { .. })));
        // Taken once
        assert!(status.check().is_ok());
    }

    #[test]
    fn test_invalid_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERLAY_FILENAME);
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            OverlayStore::load_from(&path),
            Err(ViewerError::InvalidConfig { .. })
        ));
    }
}
