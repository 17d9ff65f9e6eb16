// SPDX-License-Identifier: PMPL-1.0-or-later

//! entry-patch — apply a drop of translated entries to a localization file.
//!
//! A source file holds blocks of the form `key: { ... },`. Each block is
//! extracted, matched by key against the target file's two-space indented
//! blocks, and substituted in place, re-indented to the target's layout.
//!
//! PIPELINE:
//! 1. **Extract**: pattern or brace-balanced block discovery (`extract`).
//! 2. **Validate**: flag truncated, unbalanced or duplicate blocks (`diagnostics`).
//! 3. **Patch**: locate and replace each key in order (`locate`, `patcher`).
//! 4. **Persist**: write back, with optional backup and run report (`storage`, `report`).

pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod locate;
pub mod patcher;
pub mod report;
pub mod storage;
pub mod types;
