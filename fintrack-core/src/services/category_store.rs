//! Category mutations
//!
//! Categories are keyed by `(kind, name)` with names compared
//! case-insensitively; the backend issues no ids for them.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Category, EntryKind, Snapshot};
use crate::protocol::verbs;

use super::store::EntityStore;

pub type CategoryStore = EntityStore<Category>;

impl EntityStore<Category> {
    /// Create a category; the cache gains it unless an equal one is cached
    pub async fn add(&self, kind: EntryKind, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name cannot be empty"));
        }

        self.request(
            verbs::ADD_CATEGORY,
            &[kind.as_str().to_string(), name.to_string()],
        )
        .await?
        .expect_verb(verbs::OK)?;

        let category = Category::new(kind, name);
        let added = category.clone();
        self.apply(move |items| {
            if !items.iter().any(|c| c.matches(added.kind, &added.name)) {
                items.push(added);
            }
        });
        Ok(category)
    }

    /// Delete a category; every case-insensitive match leaves the cache
    pub async fn remove(&self, kind: EntryKind, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name cannot be empty"));
        }

        self.request(
            verbs::DELETE_CATEGORY,
            &[kind.as_str().to_string(), name.to_string()],
        )
        .await?
        .expect_verb(verbs::OK)?;

        let removed = Category::new(kind, name);
        let target = removed.clone();
        self.apply(move |items| items.retain(|c| !c.matches(target.kind, &target.name)));
        Ok(removed)
    }

    /// Cached category names of one kind, in cache order
    pub fn names(&self, kind: EntryKind) -> Vec<String> {
        names_of(&self.snapshot(), kind)
    }

    pub fn contains(&self, kind: EntryKind, name: &str) -> bool {
        self.snapshot().iter().any(|c| c.matches(kind, name))
    }

    /// Callback form of [`add`](Self::add)
    pub fn add_to_backend<S, E>(
        self: &Arc<Self>,
        kind: EntryKind,
        name: impl Into<String>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(Category) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let name = name.into();
        self.spawn(
            |store| async move { store.add(kind, &name).await },
            on_success,
            on_error,
        );
    }

    /// Callback form of [`remove`](Self::remove)
    pub fn remove_from_backend<S, E>(
        self: &Arc<Self>,
        kind: EntryKind,
        name: impl Into<String>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(Category) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let name = name.into();
        self.spawn(
            |store| async move { store.remove(kind, &name).await },
            on_success,
            on_error,
        );
    }
}

/// Names of one kind from a category snapshot
pub fn names_of(snapshot: &Snapshot<Category>, kind: EntryKind) -> Vec<String> {
    snapshot
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.name.clone())
        .collect()
}
