// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locate an entry's existing block in the target blob and replace it

use crate::extract::scanner;
use crate::types::{Entry, MatchMode};
use anyhow::{Context, Result};
use regex::Regex;

/// Indentation of top-level entries in the target blob
pub const TARGET_INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Replaced {
        /// Patched target text
        text: String,
        /// Block that was overwritten
        previous: String,
        /// Indented entry that was inserted
        inserted: String,
    },
    NotFound,
}

/// Pattern for the first `  key: { ... \n  },` block of `key`.
pub fn locator_pattern(key: &str) -> String {
    format!(
        r"(?s){indent}{key}:\s*\{{.*?\n{indent}\}},",
        indent = TARGET_INDENT,
        key = regex::escape(key)
    )
}

/// Byte span `[start, end)` of the existing block for `key`, if any.
pub fn find_entry(target: &str, key: &str, mode: MatchMode) -> Result<Option<(usize, usize)>> {
    match mode {
        MatchMode::Pattern => {
            let re = Regex::new(&locator_pattern(key))
                .with_context(|| format!("compiling locator for `{}`", key))?;
            Ok(re.find(target).map(|m| (m.start(), m.end())))
        }
        MatchMode::Balanced => find_balanced(target, key),
    }
}

fn find_balanced(target: &str, key: &str) -> Result<Option<(usize, usize)>> {
    let opener = Regex::new(&format!(
        r"(?m)^{}{}:\s*\{{",
        TARGET_INDENT,
        regex::escape(key)
    ))
    .with_context(|| format!("compiling opener for `{}`", key))?;

    let Some(found) = opener.find(target) else {
        return Ok(None);
    };
    let open = found.end() - 1;
    let close = scanner::find_block_end(target, open)
        .with_context(|| format!("parsing target block `{}`", key))?;
    let end = if target.as_bytes().get(close + 1) == Some(&b',') {
        close + 2
    } else {
        close + 1
    };
    Ok(Some((found.start(), end)))
}

/// Replace the first block of `entry.key` in `target` with the re-indented entry.
pub fn replace_entry(target: &str, entry: &Entry, mode: MatchMode) -> Result<Replacement> {
    let Some((start, end)) = find_entry(target, &entry.key, mode)? else {
        return Ok(Replacement::NotFound);
    };

    let inserted = entry.indented(TARGET_INDENT);
    let previous = target[start..end].to_string();

    // spliced by span so `$` in translations is never expanded
    let mut text = String::with_capacity(target.len() + inserted.len());
    text.push_str(&target[..start]);
    text.push_str(&inserted);
    text.push_str(&target[end..]);

    Ok(Replacement::Replaced {
        text,
        previous,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> String {
        concat!(
            "export const zh = {\n",
            "  foo: {\n    label: \"old\"\n  },\n\n",
            "  other: {\n    label: \"keep\"\n  },\n",
            "};\n",
        )
        .to_string()
    }

    #[test]
    fn test_replace_reindents_every_line() {
        let entry = Entry::new("foo", "\n  label: \"A\"");
        let result = replace_entry(&target(), &entry, MatchMode::Pattern).unwrap();
        let Replacement::Replaced { text, previous, .. } = result else {
            panic!("foo should be found");
        };
        assert!(text.contains("  foo: {\n    label: \"A\"\n  },"));
        assert!(text.contains("  other: {\n    label: \"keep\"\n  },"));
        assert_eq!(previous, "  foo: {\n    label: \"old\"\n  },");
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let entry = Entry::new("bar", "\n  label: \"B\"");
        let result = replace_entry(&target(), &entry, MatchMode::Pattern).unwrap();
        assert_eq!(result, Replacement::NotFound);
    }

    #[test]
    fn test_dollar_signs_are_inserted_literally() {
        let entry = Entry::new("foo", "\n  fn: (s) => `${s} costs $1`");
        let Replacement::Replaced { text, .. } =
            replace_entry(&target(), &entry, MatchMode::Pattern).unwrap()
        else {
            panic!("foo should be found");
        };
        assert!(text.contains("`${s} costs $1`"));
    }

    #[test]
    fn test_only_first_occurrence_is_replaced() {
        let doubled = format!("{}{}", target(), "  foo: {\n    label: \"second\"\n  },\n");
        let entry = Entry::new("foo", "\n  label: \"A\"");
        let Replacement::Replaced { text, .. } =
            replace_entry(&doubled, &entry, MatchMode::Pattern).unwrap()
        else {
            panic!("foo should be found");
        };
        assert!(text.contains("label: \"second\""));
        assert!(!text.contains("label: \"old\""));
    }

    #[test]
    fn test_balanced_matches_pattern_result() {
        let entry = Entry::new("foo", "\n  label: \"A\"");
        let pattern = replace_entry(&target(), &entry, MatchMode::Pattern).unwrap();
        let balanced = replace_entry(&target(), &entry, MatchMode::Balanced).unwrap();
        assert_eq!(pattern, balanced);
    }

    #[test]
    fn test_balanced_ignores_deeper_indentation() {
        let nested = "  wrapper: {\n    foo: {\n      x: 1\n    },\n  },\n";
        assert_eq!(find_entry(nested, "foo", MatchMode::Balanced).unwrap(), None);
        // the pattern locator is unanchored and finds the nested block
        assert!(find_entry(nested, "foo", MatchMode::Pattern).unwrap().is_some());
    }

    #[test]
    fn test_key_is_escaped() {
        assert!(locator_pattern("a_b").contains("a_b"));
        assert!(locator_pattern("a.b").contains(r"a\.b"));
    }
}
