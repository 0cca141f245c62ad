//! Session-local favorite and delete annotations.
//!
//! The overlay is keyed by node id and lives next to the mapping, never
//! inside it. Projectors take it as a parameter and only read it to flag
//! rows. Deletion is advisory: a node marked deleted is still projected.
//!
//! User intent is reported to the outer layer through [`OverlayHooks`];
//! whatever persistence sits behind the hooks is up to the caller.

mod store;

pub use store::*;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Favorite and delete markers for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    /// Favorited node ids.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub favorites: BTreeSet<String>,
    /// Node ids the user asked to delete.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted: BTreeSet<String>,
}

impl Overlay {
    /// Create an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start with these favorites.
    #[must_use]
    pub fn with_favorites<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorites.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Flip favorite membership. Returns whether `id` is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.to_string());
            true
        }
    }

    /// Record delete intent. Returns false if it was already recorded.
    pub fn mark_deleted(&mut self, id: &str) -> bool {
        self.deleted.insert(id.to_string())
    }

    /// Withdraw delete intent.
    pub fn restore(&mut self, id: &str) -> bool {
        self.deleted.remove(id)
    }

    /// Whether `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Whether `id` is marked deleted.
    #[must_use]
    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted.contains(id)
    }

    /// Number of favorites.
    #[must_use]
    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    /// Check if there are no markers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.deleted.is_empty()
    }

    /// Flags for one node.
    #[must_use]
    pub fn flags(&self, id: &str) -> OverlayFlags {
        OverlayFlags {
            favorite: self.is_favorite(id),
            deleted: self.is_deleted(id),
        }
    }
}

/// Overlay state of a single node, as attached to projected rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayFlags {
    /// Node is a favorite.
    pub favorite: bool,
    /// Node is marked deleted.
    pub deleted: bool,
}

/// Callbacks invoked on user intent.
///
/// Both default to doing nothing. Implementations wire them to whatever
/// store backs the conversation.
pub trait OverlayHooks {
    /// The user toggled the favorite marker of `id`; `favorite` is the new state.
    fn on_toggle_favorite(&mut self, id: &str, favorite: bool) {
        let _ = (id, favorite);
    }

    /// The user asked to delete `id`.
    fn on_delete(&mut self, id: &str) {
        let _ = id;
    }
}

/// Hooks that ignore every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl OverlayHooks for NoopHooks {}

/// Hooks built from closures.
#[derive(Default)]
pub struct FnHooks {
    on_favorite: Option<Box<dyn FnMut(&str, bool)>>,
    on_delete: Option<Box<dyn FnMut(&str)>>,
}

impl FnHooks {
    /// Create hooks with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the favorite callback.
    #[must_use]
    pub fn on_favorite(mut self, f: impl FnMut(&str, bool) + 'static) -> Self {
        self.on_favorite = Some(Box::new(f));
        self
    }

    /// Builder: set the delete callback.
    #[must_use]
    pub fn on_delete(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_delete = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FnHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHooks")
            .field("on_favorite", &self.on_favorite.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}

impl OverlayHooks for FnHooks {
    fn on_toggle_favorite(&mut self, id: &str, favorite: bool) {
        if let Some(f) = self.on_favorite.as_mut() {
            f(id, favorite);
        }
    }

    fn on_delete(&mut self, id: &str) {
        if let Some(f) = self.on_delete.as_mut() {
            f(id);
        }
    }
}
