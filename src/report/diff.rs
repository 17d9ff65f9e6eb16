// SPDX-License-Identifier: PMPL-1.0-or-later

//! Line diff of replaced entry blocks

use crate::types::EntryOutcome;

/// Render `-`/`+` lines for every outcome whose block text changed.
///
/// Blocks are compared line by line; a common prefix and suffix are shown
/// as context once, the differing middle as removed/added lines.
pub fn format_entry_diff(outcomes: &[EntryOutcome]) -> String {
    let mut lines = Vec::new();

    for outcome in outcomes.iter().filter(|o| o.changed()) {
        let (Some(before), Some(after)) = (&outcome.previous, &outcome.replacement) else {
            continue;
        };
        lines.push(format!("@@ {} @@", outcome.key));
        lines.extend(diff_block(before, after));
    }

    lines.join("\n")
}

fn diff_block(before: &str, after: &str) -> Vec<String> {
    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();

    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = Vec::new();
    out.extend(old[..prefix].iter().map(|l| format!(" {}", l)));
    out.extend(old[prefix..old.len() - suffix].iter().map(|l| format!("-{}", l)));
    out.extend(new[prefix..new.len() - suffix].iter().map(|l| format!("+{}", l)));
    out.extend(old[old.len() - suffix..].iter().map(|l| format!(" {}", l)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_lines_only() {
        let outcome = EntryOutcome::replaced(
            "foo",
            "  foo: {\n    label: \"old\"\n  },".to_string(),
            "  foo: {\n    label: \"A\"\n  },".to_string(),
        );
        let diff = format_entry_diff(&[outcome]);
        assert_eq!(
            diff,
            "@@ foo @@\n   foo: {\n-    label: \"old\"\n+    label: \"A\"\n   },"
        );
    }

    #[test]
    fn test_unchanged_and_missing_are_skipped() {
        let same = EntryOutcome::replaced("a", "x".to_string(), "x".to_string());
        let missing = EntryOutcome::not_found("b");
        assert!(format_entry_diff(&[same, missing]).is_empty());
    }
}
