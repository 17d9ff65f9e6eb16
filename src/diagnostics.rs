// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pre-mutation validation and the `check` command

use crate::config::PatchConfig;
use crate::extract::{self, scanner, ENTRY_PATTERN};
use crate::locate;
use crate::storage;
use crate::types::{EntrySet, Finding, MatchMode, Severity};
use anyhow::{anyhow, Context, Result};
use colored::*;
use regex::Regex;

/// Inspect extracted entries for signs of bad block boundaries.
///
/// Errors mark entries whose text is probably wrong (truncated or unbalanced);
/// warnings mark suspicious but usable input.
pub fn validate_entries(
    source: &str,
    entries: &EntrySet,
    mode: MatchMode,
) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();

    if entries.is_empty() {
        findings.push(Finding::warning(None, "no entries found in source"));
    }

    for key in entries.duplicates() {
        findings.push(Finding::warning(
            Some(key.as_str()),
            "key appears more than once; the last block wins",
        ));
    }

    for entry in entries {
        match scanner::body_is_balanced(&entry.body) {
            Ok(true) => {}
            Ok(false) => findings.push(Finding::error(
                Some(entry.key.as_str()),
                "block closes before its final `},`",
            )),
            Err(e) => findings.push(Finding::error(
                Some(entry.key.as_str()),
                format!("block body is unbalanced: {}", e),
            )),
        }
    }

    if mode == MatchMode::Pattern {
        for key in orphaned_terminators(source)? {
            let already = findings
                .iter()
                .any(|f| f.key.as_deref() == Some(key.as_str()) && f.severity == Severity::Error);
            if !already {
                findings.push(Finding::error(
                    Some(key.as_str()),
                    "another `},` follows the block; body was probably cut short",
                ));
            }
        }
    }

    Ok(findings)
}

/// Keys whose match is followed by a stray `\n},` before the next match.
fn orphaned_terminators(source: &str) -> Result<Vec<String>> {
    let re = Regex::new(ENTRY_PATTERN).context("compiling entry pattern")?;
    let matches: Vec<(String, usize, usize)> = re
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps[1].to_string(), whole.start(), whole.end()))
        })
        .collect();

    let mut keys = Vec::new();
    for (i, (key, _, end)) in matches.iter().enumerate() {
        let next_start = matches.get(i + 1).map(|m| m.1).unwrap_or(source.len());
        if source[*end..next_start].contains("\n},") && !keys.contains(key) {
            keys.push(key.clone());
        }
    }
    Ok(keys)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Warn,
    Error,
}

impl Level {
    fn tag(&self) -> ColoredString {
        match self {
            Level::Ok => "OK".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERR".red().bold(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub label: String,
    pub level: Level,
    pub detail: String,
}

impl Diagnostic {
    fn new(label: impl Into<String>, level: Level, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level,
            detail: detail.into(),
        }
    }

    fn ok(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(label, Level::Ok, detail)
    }

    fn warning(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(label, Level::Warn, detail)
    }

    fn error(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(label, Level::Error, detail)
    }

    fn print(&self) {
        println!("  [{}] {:22} {}", self.level.tag(), self.label, self.detail);
    }
}

impl From<&Finding> for Diagnostic {
    fn from(finding: &Finding) -> Self {
        let label = finding.key.clone().unwrap_or_else(|| "source".to_string());
        match finding.severity {
            Severity::Warning => Diagnostic::warning(label, finding.message.clone()),
            Severity::Error => Diagnostic::error(label, finding.message.clone()),
        }
    }
}

/// Run every check without touching the target.
pub fn collect(config: &PatchConfig) -> Vec<Diagnostic> {
    let mut checks = Vec::new();

    let source = match storage::read_blob(&config.source) {
        Ok(text) => {
            checks.push(Diagnostic::ok(
                "source",
                format!("{} ({} bytes)", config.source.display(), text.len()),
            ));
            Some(text)
        }
        Err(e) => {
            checks.push(Diagnostic::error("source", format!("{:#}", e)));
            None
        }
    };

    let target = match storage::read_blob(&config.target) {
        Ok(text) => {
            checks.push(Diagnostic::ok(
                "target",
                format!("{} ({} bytes)", config.target.display(), text.len()),
            ));
            Some(text)
        }
        Err(e) => {
            checks.push(Diagnostic::error("target", format!("{:#}", e)));
            None
        }
    };

    let Some(source) = source else {
        return checks;
    };

    let entries = match extract::extract_entries(&source, config.mode) {
        Ok(entries) => {
            checks.push(Diagnostic::ok(
                "extraction",
                format!("{} entries ({} mode)", entries.len(), config.mode.as_str()),
            ));
            entries
        }
        Err(e) => {
            checks.push(Diagnostic::error("extraction", format!("{:#}", e)));
            return checks;
        }
    };

    match validate_entries(&source, &entries, config.mode) {
        Ok(findings) => checks.extend(findings.iter().map(Diagnostic::from)),
        Err(e) => checks.push(Diagnostic::error("validation", format!("{:#}", e))),
    }

    if let Some(target) = target {
        for entry in &entries {
            match locate::find_entry(&target, &entry.key, config.mode) {
                Ok(Some((start, _))) => checks.push(Diagnostic::ok(
                    entry.key.clone(),
                    format!("found at line {}", scanner::line_of(&target, start)),
                )),
                Ok(None) => checks.push(Diagnostic::warning(
                    entry.key.clone(),
                    "not found in target",
                )),
                Err(e) => checks.push(Diagnostic::error(entry.key.clone(), format!("{:#}", e))),
            }
        }
    }

    checks
}

pub fn run_check(config: &PatchConfig) -> Result<()> {
    println!("{}", "entry-patch check".bold());

    let checks = collect(config);
    println!();
    for entry in &checks {
        entry.print();
    }

    if checks.iter().any(|entry| entry.level == Level::Error) {
        Err(anyhow!("check reported issues"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings_for(source: &str) -> Vec<Finding> {
        let entries = extract::extract_entries(source, MatchMode::Pattern).unwrap();
        validate_entries(source, &entries, MatchMode::Pattern).unwrap()
    }

    #[test]
    fn test_clean_source_has_no_findings() {
        let source = "foo: {\n  label: \"A\"\n},\nbar: {\n  label: \"B\"\n},\n";
        assert!(findings_for(source).is_empty());
    }

    #[test]
    fn test_embedded_terminator_is_flagged() {
        let source = "foo: {\n  a: 1\n},\n  b: 2\n},\n";
        let findings = findings_for(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].key.as_deref(), Some("foo"));
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_unbalanced_body_is_flagged_once() {
        let source = "foo: {\n  nested: {\n    a: 1\n},\n  b: 2\n},\n";
        let findings = findings_for(source);
        let errors: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unbalanced"));
    }

    #[test]
    fn test_duplicates_and_empty_are_warnings() {
        let dup = findings_for("a: {\n  v: 1\n},\na: {\n  v: 2\n},\n");
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].severity, Severity::Warning);

        let empty = findings_for("");
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].key, None);
    }
}
