// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for entry-patch

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// How entry blocks are delimited in source and target text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Non-greedy pattern match ending at the first `\n},`
    #[default]
    Pattern,
    /// Brace-balanced scan aware of strings, template literals and comments
    Balanced,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::Pattern => "pattern",
            MatchMode::Balanced => "balanced",
        }
    }
}

/// A single keyed block taken from the source blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    /// Everything between the opening brace and the closing `\n},`
    pub body: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
        }
    }

    /// Normalized form: `key: {<body>\n},` with no leading indentation.
    pub fn normalized(&self) -> String {
        format!("{}: {{{}\n}},", self.key, self.body)
    }

    /// Normalized form with every line prefixed by `indent`, trailing whitespace removed.
    pub fn indented(&self, indent: &str) -> String {
        let normalized = self.normalized();
        let replaced = normalized.replace('\n', &format!("\n{}", indent));
        format!("{}{}", indent, replaced).trim_end().to_string()
    }
}

/// Ordered key → entry mapping.
///
/// Keys keep the position of their first occurrence; a repeated key replaces
/// the stored body and is remembered in `duplicates`.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning true when the key was already present.
    pub fn insert(&mut self, entry: Entry) -> bool {
        match self.index.get(&entry.key) {
            Some(&slot) => {
                if !self.duplicates.contains(&entry.key) {
                    self.duplicates.push(entry.key.clone());
                }
                self.entries[slot] = entry;
                true
            }
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of trying to patch one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Replaced,
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub key: String,
    pub status: OutcomeStatus,
    /// Target block text before replacement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Indented text that was substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl EntryOutcome {
    pub fn replaced(key: &str, previous: String, replacement: String) -> Self {
        Self {
            key: key.to_string(),
            status: OutcomeStatus::Replaced,
            previous: Some(previous),
            replacement: Some(replacement),
        }
    }

    pub fn not_found(key: &str) -> Self {
        Self {
            key: key.to_string(),
            status: OutcomeStatus::NotFound,
            previous: None,
            replacement: None,
        }
    }

    /// True when a replacement happened and changed the block text
    pub fn changed(&self) -> bool {
        match (&self.previous, &self.replacement) {
            (Some(before), Some(after)) => before != after,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A validation finding attached to an entry (or the whole blob when `key` is None)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn warning(key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            key: key.map(str::to_string),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            key: key.map(str::to_string),
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Complete record of one patch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchReport {
    pub created_at: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: PathBuf,
    pub mode: MatchMode,
    pub dry_run: bool,
    pub entries_loaded: usize,
    pub keys: Vec<String>,
    #[serde(default)]
    pub duplicate_keys: Vec<String>,
    pub outcomes: Vec<EntryOutcome>,
    pub replaced: usize,
    pub not_found: usize,
    #[serde(default)]
    pub findings: Vec<Finding>,
    pub digest_before: String,
    pub digest_after: String,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

impl PatchReport {
    pub fn missing_keys(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::NotFound)
            .map(|o| o.key.as_str())
            .collect()
    }

    pub fn content_changed(&self) -> bool {
        self.digest_before != self.digest_after
    }
}
