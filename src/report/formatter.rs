// SPDX-License-Identifier: PMPL-1.0-or-later

//! Human-readable console output
//!
//! Each section is built as plain lines first; colour is added when printing.

use crate::report::diff::format_entry_diff;
use crate::types::*;
use colored::*;

pub struct ReportFormatter {
    quiet: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn print_loaded(&self, entries: &EntrySet) {
        if self.quiet {
            return;
        }
        for line in loaded_lines(entries) {
            println!("{}", line);
        }
    }

    /// Findings always go to stderr, even when quiet.
    pub fn print_findings(&self, findings: &[Finding]) {
        for (finding, line) in findings.iter().zip(finding_lines(findings)) {
            let text = match finding.severity {
                Severity::Warning => line.yellow(),
                Severity::Error => line.red(),
            };
            eprintln!("{}", text);
        }
    }

    pub fn print_outcomes(&self, outcomes: &[EntryOutcome]) {
        if self.quiet {
            return;
        }
        for (outcome, line) in outcomes.iter().zip(outcome_lines(outcomes)) {
            match outcome.status {
                OutcomeStatus::Replaced => println!("{}", line.green()),
                OutcomeStatus::NotFound => println!("{}", line.red().bold()),
            }
        }
    }

    pub fn print_summary(&self, report: &PatchReport) {
        if self.quiet {
            return;
        }
        for line in summary_lines(report) {
            println!("{}", line);
        }
    }

    pub fn print_diff(&self, report: &PatchReport) {
        let diff = format_entry_diff(&report.outcomes);
        if diff.is_empty() {
            println!("{}", "No block changes".green());
            return;
        }
        println!();
        for line in diff.lines() {
            if line.starts_with("@@") {
                println!("{}", line.cyan());
            } else if line.starts_with('-') {
                println!("{}", line.red());
            } else if line.starts_with('+') {
                println!("{}", line.green());
            } else {
                println!("{}", line);
            }
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn loaded_lines(entries: &EntrySet) -> Vec<String> {
    vec![
        format!("Loaded {} entries", entries.len()),
        format!("Entries: {}", entries.keys().join(", ")),
    ]
}

pub fn finding_lines(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| {
            let tag = match finding.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            match &finding.key {
                Some(key) => format!("{}: {}: {}", tag, key, finding.message),
                None => format!("{}: {}", tag, finding.message),
            }
        })
        .collect()
}

pub fn outcome_lines(outcomes: &[EntryOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| match outcome.status {
            OutcomeStatus::Replaced => format!("Replaced: {}", outcome.key),
            OutcomeStatus::NotFound => format!("NOT FOUND: {}", outcome.key),
        })
        .collect()
}

pub fn summary_lines(report: &PatchReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Replaced {} entries out of {}",
            report.replaced, report.entries_loaded
        ),
    ];
    if let Some(backup) = &report.backup {
        lines.push(format!("Backup saved to: {}", backup.display()));
    }
    if report.written {
        lines.push(format!("Updated {}", report.output.display()));
    } else if report.dry_run {
        let note = if report.content_changed() {
            ""
        } else {
            " (no changes)"
        };
        lines.push(format!(
            "Dry run: {} not written{}",
            report.output.display(),
            note
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(outcomes: Vec<EntryOutcome>, written: bool) -> PatchReport {
        let replaced = outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Replaced)
            .count();
        PatchReport {
            created_at: "2026-10-17T00:00:00+00:00".to_string(),
            source: PathBuf::from("drop.txt"),
            target: PathBuf::from("zh.js"),
            output: PathBuf::from("zh.js"),
            mode: MatchMode::Pattern,
            dry_run: !written,
            entries_loaded: outcomes.len(),
            keys: outcomes.iter().map(|o| o.key.clone()).collect(),
            duplicate_keys: vec![],
            not_found: outcomes.len() - replaced,
            replaced,
            outcomes,
            findings: vec![],
            digest_before: "a".to_string(),
            digest_after: "b".to_string(),
            written,
            backup: None,
        }
    }

    #[test]
    fn test_loaded_lines() {
        let mut entries = EntrySet::new();
        entries.insert(Entry::new("foo", "\n  label: \"A\""));
        entries.insert(Entry::new("bar", "\n  label: \"B\""));
        assert_eq!(
            loaded_lines(&entries),
            vec!["Loaded 2 entries", "Entries: foo, bar"]
        );
    }

    #[test]
    fn test_found_and_missing_outcome_lines() {
        let outcomes = vec![
            EntryOutcome::replaced("foo", "old".to_string(), "new".to_string()),
            EntryOutcome::not_found("bar"),
        ];
        assert_eq!(
            outcome_lines(&outcomes),
            vec!["Replaced: foo", "NOT FOUND: bar"]
        );
    }

    #[test]
    fn test_summary_after_write() {
        let outcomes = vec![
            EntryOutcome::replaced("foo", "old".to_string(), "new".to_string()),
            EntryOutcome::not_found("bar"),
        ];
        assert_eq!(
            summary_lines(&report(outcomes, true)),
            vec!["", "Replaced 1 entries out of 2", "Updated zh.js"]
        );
    }

    #[test]
    fn test_summary_for_dry_run() {
        let outcomes = vec![EntryOutcome::not_found("bar")];
        let lines = summary_lines(&report(outcomes, false));
        assert_eq!(lines[1], "Replaced 0 entries out of 1");
        assert_eq!(lines[2], "Dry run: zh.js not written");
    }

    #[test]
    fn test_finding_lines() {
        let findings = vec![
            Finding::error(Some("foo"), "block closes early"),
            Finding::warning(None, "no entries found in source"),
        ];
        assert_eq!(
            finding_lines(&findings),
            vec![
                "error: foo: block closes early",
                "warning: no entries found in source"
            ]
        );
    }
}
