//! Collection catalog
//!
//! The saved list of canonical collections and the tool profiles, kept as
//! JSON documents in a [`KeyedStore`].

use mcpx_scanner::canonical::generate_id;
use mcpx_scanner::{default_profiles, fingerprint, CodeSnippet, FoundConfig, McpCollection, Metadata, ToolProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::storage::{keys, KeyedStore, KeyedStoreExt, StorageError};

/// A found configuration the user chose to keep
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub tool_id: String,
    pub config: FoundConfig,
}

impl Selection {
    pub fn new(tool_id: impl Into<String>, config: FoundConfig) -> Self {
        Self {
            tool_id: tool_id.into(),
            config,
        }
    }
}

/// Result of confirming scan selections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmReport {
    pub added: Vec<McpCollection>,
    /// Selections matching a collection already in the catalog or earlier
    /// in the same batch
    pub skipped_duplicates: usize,
}

/// Saved collections and tool profiles
pub struct CollectionCatalog {
    store: Arc<dyn KeyedStore>,
}

impl CollectionCatalog {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Every saved collection, in insertion order
    pub fn list(&self) -> Result<Vec<McpCollection>, StorageError> {
        Ok(self.store.read_json(keys::COLLECTIONS)?.unwrap_or_default())
    }

    /// Saved collections owned by one tool
    pub fn list_for_tool(&self, tool_id: &str) -> Result<Vec<McpCollection>, StorageError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.source_tool == tool_id)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<McpCollection>, StorageError> {
        Ok(self.list()?.into_iter().find(|c| c.id == id))
    }

    fn save(&self, collections: &[McpCollection]) -> Result<(), StorageError> {
        self.store.write_json(keys::COLLECTIONS, collections)
    }

    /// Create an empty collection for a tool
    pub fn create(&self, tool_id: &str, metadata: Metadata) -> Result<McpCollection, StorageError> {
        let collection = McpCollection::new(tool_id, metadata);
        let mut all = self.list()?;
        all.push(collection.clone());
        self.save(&all)?;
        Ok(collection)
    }

    /// Store collections, giving a fresh id to any that collides
    pub fn add_all(&self, collections: Vec<McpCollection>) -> Result<Vec<McpCollection>, StorageError> {
        let mut all = self.list()?;
        let mut ids: HashSet<String> = all.iter().map(|c| c.id.clone()).collect();
        let mut added = Vec::with_capacity(collections.len());
        for mut collection in collections {
            while !ids.insert(collection.id.clone()) {
                collection.id = generate_id();
            }
            all.push(collection.clone());
            added.push(collection);
        }
        self.save(&all)?;
        Ok(added)
    }

    fn modify<T>(
        &self,
        id: &str,
        change: impl FnOnce(&mut McpCollection) -> T,
    ) -> Result<Option<T>, StorageError> {
        let mut all = self.list()?;
        let Some(collection) = all.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        let out = change(collection);
        self.save(&all)?;
        Ok(Some(out))
    }

    /// Replace a collection's metadata; `None` if it does not exist
    pub fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<Option<McpCollection>, StorageError> {
        self.modify(id, |c| {
            c.update_metadata(metadata);
            c.clone()
        })
    }

    /// Enable or disable a collection
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool, StorageError> {
        Ok(self
            .modify(id, |c| {
                c.enabled = enabled;
                c.touch();
            })?
            .is_some())
    }

    /// Add a snippet; returns its id, which may differ from the one given
    pub fn add_snippet(&self, id: &str, snippet: CodeSnippet) -> Result<Option<String>, StorageError> {
        self.modify(id, |c| c.add_snippet(snippet))
    }

    /// Remove a snippet; `false` if the collection or snippet is unknown
    pub fn remove_snippet(&self, id: &str, snippet_id: &str) -> Result<bool, StorageError> {
        Ok(self.modify(id, |c| c.remove_snippet(snippet_id))?.unwrap_or(false))
    }

    /// Delete a collection
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut all = self.list()?;
        let before = all.len();
        all.retain(|c| c.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save(&all)?;
        Ok(true)
    }

    /// Turn selected scan findings into saved collections
    ///
    /// A selection whose fingerprint matches a saved collection, or an
    /// earlier selection, is skipped.
    pub fn confirm(&self, selections: &[Selection], enable_threshold: f64) -> Result<ConfirmReport, StorageError> {
        let mut seen: HashSet<String> = self.list()?.iter().map(fingerprint).collect();
        let mut fresh = Vec::new();
        let mut skipped_duplicates = 0;

        for selection in selections {
            let collection = selection.config.to_collection(&selection.tool_id, enable_threshold);
            if seen.insert(fingerprint(&collection)) {
                fresh.push(collection);
            } else {
                skipped_duplicates += 1;
            }
        }

        Ok(ConfirmReport {
            added: self.add_all(fresh)?,
            skipped_duplicates,
        })
    }

    /// Stored tool profiles, or the built-in ones if none were saved
    pub fn tool_profiles(&self) -> Result<Vec<ToolProfile>, StorageError> {
        Ok(self
            .store
            .read_json(keys::TOOL_PROFILES)?
            .unwrap_or_else(default_profiles))
    }

    pub fn save_profiles(&self, profiles: &[ToolProfile]) -> Result<(), StorageError> {
        self.store.write_json(keys::TOOL_PROFILES, profiles)
    }
}
