// SPDX-License-Identifier: PMPL-1.0-or-later

//! Run driver: extract, validate, patch, persist
//!
//! [`apply_entries`] is the pure in-memory pass. [`extract`] reads and
//! validates the source; [`apply`] patches the target, handles backup and
//! report export. [`run`] chains the two. A run that misses some keys still
//! writes the replacements that succeeded.

use crate::config::PatchConfig;
use crate::diagnostics::validate_entries;
use crate::extract::extract_entries;
use crate::locate::{replace_entry, Replacement};
use crate::report::write_report;
use crate::storage;
use crate::types::*;
use anyhow::{bail, Result};

/// Patched text plus the per-key outcomes, in entry order
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub text: String,
    pub outcomes: Vec<EntryOutcome>,
}

impl PatchOutcome {
    pub fn replaced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Replaced)
            .count()
    }

    pub fn not_found(&self) -> usize {
        self.outcomes.len() - self.replaced()
    }
}

/// Replace each entry's block in `target`, one key at a time.
///
/// Later keys see the text produced by earlier replacements.
pub fn apply_entries(target: &str, entries: &EntrySet, mode: MatchMode) -> Result<PatchOutcome> {
    let mut text = target.to_string();
    let mut outcomes = Vec::with_capacity(entries.len());

    for entry in entries {
        match replace_entry(&text, entry, mode)? {
            Replacement::Replaced {
                text: patched,
                previous,
                inserted,
            } => {
                text = patched;
                outcomes.push(EntryOutcome::replaced(&entry.key, previous, inserted));
            }
            Replacement::NotFound => outcomes.push(EntryOutcome::not_found(&entry.key)),
        }
    }

    Ok(PatchOutcome { text, outcomes })
}

/// Entries read from the source file, with their validation findings
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entries: EntrySet,
    pub findings: Vec<Finding>,
}

/// Read and validate the source. The target is not touched.
pub fn extract(config: &PatchConfig) -> Result<Extraction> {
    let source = storage::read_blob(&config.source)?;
    let entries = extract_entries(&source, config.mode)?;
    let findings = validate_entries(&source, &entries, config.mode)?;
    Ok(Extraction { entries, findings })
}

/// Full pass over the files named in `config`.
pub fn run(config: &PatchConfig) -> Result<PatchReport> {
    let extraction = extract(config)?;
    apply(config, extraction)
}

/// Patch and persist the target with already extracted entries.
pub fn apply(config: &PatchConfig, extraction: Extraction) -> Result<PatchReport> {
    let Extraction { entries, findings } = extraction;

    if config.strict {
        let errors: Vec<String> = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .map(|f| match &f.key {
                Some(key) => format!("{}: {}", key, f.message),
                None => f.message.clone(),
            })
            .collect();
        if !errors.is_empty() {
            bail!(
                "{} validation error(s) in {}, nothing written:\n  {}",
                errors.len(),
                config.source.display(),
                errors.join("\n  ")
            );
        }
    }

    let target = storage::read_blob(&config.target)?;
    let patched = apply_entries(&target, &entries, config.mode)?;
    let output = config.output_path().to_path_buf();

    let mut backup = None;
    if !config.dry_run {
        if config.backup {
            backup = storage::backup(&output)?;
        }
        storage::write_blob(&output, &patched.text)?;
    }

    let report = PatchReport {
        created_at: chrono::Utc::now().to_rfc3339(),
        source: config.source.clone(),
        target: config.target.clone(),
        output,
        mode: config.mode,
        dry_run: config.dry_run,
        entries_loaded: entries.len(),
        keys: entries.keys().into_iter().map(str::to_string).collect(),
        duplicate_keys: entries.duplicates().to_vec(),
        replaced: patched.replaced(),
        not_found: patched.not_found(),
        outcomes: patched.outcomes,
        findings,
        digest_before: storage::digest(&target),
        digest_after: storage::digest(&patched.text),
        written: !config.dry_run,
        backup,
    };

    if let Some(path) = &config.report {
        write_report(&report, path, config.report_format)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_application_counts() {
        let mut entries = EntrySet::new();
        entries.insert(Entry::new("foo", "\n  label: \"A\""));
        entries.insert(Entry::new("bar", "\n  label: \"B\""));
        let target = "  foo: {\n    label: \"old\"\n  },\n";

        let outcome = apply_entries(target, &entries, MatchMode::Pattern).unwrap();
        assert_eq!(outcome.replaced(), 1);
        assert_eq!(outcome.not_found(), 1);
        assert_eq!(outcome.outcomes[1].status, OutcomeStatus::NotFound);
        assert_eq!(outcome.text, "  foo: {\n    label: \"A\"\n  },\n");
    }

    #[test]
    fn test_extract_does_not_need_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("drop.txt");
        std::fs::write(&source, "foo: {\n  a: 1\n},\n").unwrap();
        let config = PatchConfig::new(&source, dir.path().join("missing.js"));

        let extraction = extract(&config).expect("target is not read during extraction");
        assert_eq!(extraction.entries.keys(), vec!["foo"]);
        assert!(apply(&config, extraction).is_err());
    }

    #[test]
    fn test_empty_entry_set_leaves_target() {
        let target = "  foo: {\n  },\n";
        let outcome = apply_entries(target, &EntrySet::new(), MatchMode::Pattern).unwrap();
        assert_eq!(outcome.text, target);
        assert!(outcome.outcomes.is_empty());
    }
}
