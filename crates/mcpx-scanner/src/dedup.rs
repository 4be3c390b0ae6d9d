//! Duplicate detection
//!
//! Two collections are duplicates when they belong to the same tool, carry
//! the same configuration and have the same name. Ids and timestamps are
//! ignored, so scanning an unchanged file twice always yields duplicates.
//! The analyzer only reports; callers decide what to drop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::model::McpCollection;

/// Structural fingerprint of a collection
///
/// SHA-256 over tool id, configuration and name. Collections without a
/// configuration are keyed by their snippets' content and language.
#[must_use]
pub fn fingerprint(collection: &McpCollection) -> String {
    let payload = match &collection.metadata.configuration {
        Some(config) => Value::Object(config.clone()).to_string(),
        None => Value::Array(
            collection
                .code_snippets
                .iter()
                .map(|s| Value::from(vec![s.language.clone(), s.content.clone()]))
                .collect(),
        )
        .to_string(),
    };

    let mut hasher = Sha256::new();
    hasher.update(collection.source_tool.as_bytes());
    hasher.update(b"\n");
    hasher.update(payload.as_bytes());
    hasher.update(b"\n");
    hasher.update(collection.metadata.name.as_bytes());
    hex::encode(hasher.finalize())
}

/// One set of structurally identical collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// First occurrence, in input order
    pub original: McpCollection,
    /// Later occurrences
    pub duplicates: Vec<McpCollection>,
}

/// Report of detected duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    #[serde(default)]
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    /// Check if there are any duplicates
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of collections that duplicate an earlier one
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicates.len()).sum()
    }

    /// Ids of every later occurrence
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.duplicates.iter().map(|d| d.id.as_str()))
            .collect()
    }
}

/// Groups collections by [`fingerprint`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DeduplicationAnalyzer;

impl DeduplicationAnalyzer {
    /// Report every group with more than one member, in first-seen order
    #[must_use]
    pub fn analyze(&self, collections: &[McpCollection]) -> DuplicateReport {
        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, Vec<&McpCollection>> = HashMap::new();
        for collection in collections {
            let key = fingerprint(collection);
            let bucket = buckets.entry(key.clone()).or_default();
            if bucket.is_empty() {
                order.push(key);
            }
            bucket.push(collection);
        }

        let groups = order
            .iter()
            .filter_map(|key| {
                let members = buckets.remove(key)?;
                let (first, rest) = members.split_first()?;
                if rest.is_empty() {
                    return None;
                }
                Some(DuplicateGroup {
                    original: (*first).clone(),
                    duplicates: rest.iter().map(|c| (*c).clone()).collect(),
                })
            })
            .collect();

        DuplicateReport { groups }
    }

    /// First occurrence of every fingerprint, in input order
    #[must_use]
    pub fn unique(&self, collections: &[McpCollection]) -> Vec<McpCollection> {
        let mut seen = std::collections::HashSet::new();
        collections
            .iter()
            .filter(|c| seen.insert(fingerprint(c)))
            .cloned()
            .collect()
    }
}
