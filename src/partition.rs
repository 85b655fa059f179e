//! Actor/label partitioning.
//!
//! Labels of the form `<actor>:<name>` belong to the actor entity; labels
//! without a separator belong to the default `UNLABELED` entity. Entities are
//! discovered in first-seen order so output is stable across runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::LabelMask;

/// Name of the default entity.
pub const UNLABELED: &str = "UNLABELED";

/// Default actor separator.
pub const DEFAULT_SEPARATOR: char = ':';

/// Logical entity a label belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum EntityKey {
    /// Labels without an actor prefix.
    Unlabeled,
    /// Labels sharing an actor prefix.
    Actor(String),
    /// Every label of a recording, when actor splitting is disabled.
    Recording(String),
}

impl EntityKey {
    /// Display name, used for containers and rigs.
    pub fn name(&self) -> &str {
        match self {
            Self::Unlabeled => UNLABELED,
            Self::Actor(name) | Self::Recording(name) => name,
        }
    }

    /// Label as stored under this entity (actor prefix stripped).
    pub fn local_label<'a>(&self, label: &'a str, separator: char) -> &'a str {
        match self {
            Self::Actor(name) => label
                .strip_prefix(name.as_str())
                .and_then(|rest| rest.strip_prefix(separator))
                .unwrap_or(label),
            _ => label,
        }
    }

    /// Label as written back to a recording (actor prefix restored).
    pub fn full_label(&self, local: &str, separator: char) -> String {
        match self {
            Self::Actor(name) => format!("{}{}{}", name, separator, local),
            _ => local.to_string(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits a flat label list into entity masks.
#[derive(Clone, Copy, Debug)]
pub struct Partitioner {
    separator: char,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl Partitioner {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Entity a single label belongs to.
    pub fn entity_of(&self, label: &str) -> EntityKey {
        match label.split_once(self.separator) {
            Some((actor, _)) => EntityKey::Actor(actor.to_string()),
            None => EntityKey::Unlabeled,
        }
    }

    /// Map every discovered entity to the mask of its labels.
    ///
    /// Masks are mutually exclusive and together cover every label.
    pub fn partition<S: AsRef<str>>(&self, labels: &[S]) -> IndexMap<EntityKey, LabelMask> {
        let mut entities: IndexMap<EntityKey, LabelMask> = IndexMap::new();
        for (i, label) in labels.iter().enumerate() {
            entities
                .entry(self.entity_of(label.as_ref()))
                .or_insert_with(|| LabelMask::none(labels.len()))
                .set(i, true);
        }
        entities
    }

    /// Single synthetic entity selecting all labels.
    pub fn whole(name: &str, label_count: usize) -> IndexMap<EntityKey, LabelMask> {
        let mut entities = IndexMap::new();
        entities.insert(EntityKey::Recording(name.to_string()), LabelMask::all(label_count));
        entities
    }
}
