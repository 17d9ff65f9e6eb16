// SPDX-License-Identifier: PMPL-1.0-or-later

//! Entry extraction from a source blob
//!
//! Two strategies share one output type:
//!
//! * [`MatchMode::Pattern`] scans with a non-greedy multi-line pattern that
//!   ends at the first `\n},`. A body containing that sequence is truncated;
//!   [`crate::diagnostics::validate_entries`] reports such blocks.
//! * [`MatchMode::Balanced`] finds column-0 `key: {` openers and locates the
//!   closing brace with [`scanner::find_block_end`]. Malformed blocks are
//!   errors instead of silent truncation.

pub mod scanner;

use crate::types::{Entry, EntrySet, MatchMode};
use anyhow::{bail, Context, Result};
use regex::Regex;

/// Key, colon, opening brace, then the shortest body ending in `\n},`
pub const ENTRY_PATTERN: &str = r"(?s)([a-z_]+):\s*\{(.*?)\n\},";

const OPENER_PATTERN: &str = r"(?m)^([a-z_]+):\s*\{";

/// Extract every entry block from `source`.
pub fn extract_entries(source: &str, mode: MatchMode) -> Result<EntrySet> {
    match mode {
        MatchMode::Pattern => extract_with_pattern(source),
        MatchMode::Balanced => extract_balanced(source),
    }
}

fn extract_with_pattern(source: &str) -> Result<EntrySet> {
    let re = Regex::new(ENTRY_PATTERN).context("compiling entry pattern")?;
    let mut entries = EntrySet::new();

    for caps in re.captures_iter(source) {
        let key = &caps[1];
        let body = &caps[2];
        entries.insert(Entry::new(key, body));
    }

    Ok(entries)
}

fn extract_balanced(source: &str) -> Result<EntrySet> {
    let opener = Regex::new(OPENER_PATTERN).context("compiling opener pattern")?;
    let mut entries = EntrySet::new();
    let mut cursor = 0;

    while let Some(caps) = opener.captures_at(source, cursor) {
        let whole = caps.get(0).context("opener match without span")?;
        let key = &caps[1];
        let open = whole.end() - 1;

        let close = scanner::find_block_end(source, open)
            .with_context(|| format!("parsing entry `{}`", key))?;
        if source.as_bytes().get(close + 1) != Some(&b',') {
            bail!(
                "entry `{}` at line {} is not followed by `}},`",
                key,
                scanner::line_of(source, close)
            );
        }

        let inner = &source[open + 1..close];
        let body = inner.strip_suffix('\n').unwrap_or(inner);
        entries.insert(Entry::new(key, body));
        cursor = close + 2;
    }

    Ok(entries)
}

/// Count non-overlapping matches of [`ENTRY_PATTERN`], duplicates included.
pub fn count_pattern_matches(source: &str) -> Result<usize> {
    let re = Regex::new(ENTRY_PATTERN).context("compiling entry pattern")?;
    Ok(re.find_iter(source).count())
}
