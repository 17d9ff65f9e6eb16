// SPDX-License-Identifier: PMPL-1.0-or-later

//! Run configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line overrides. Relative paths in the file are resolved against
//! the file's own directory.

use crate::report::ReportOutputFormat;
use crate::types::MatchMode;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Fully resolved settings for one patch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchConfig {
    /// File supplying the new entries
    pub source: PathBuf,
    /// File whose entries are replaced
    pub target: PathBuf,
    /// Where the patched text goes (the target when unset)
    pub output: Option<PathBuf>,
    pub mode: MatchMode,
    pub dry_run: bool,
    /// Abort before mutation when validation reports errors
    pub strict: bool,
    /// Copy the output file aside before overwriting it
    pub backup: bool,
    pub report: Option<PathBuf>,
    pub report_format: ReportOutputFormat,
}

impl PatchConfig {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            output: None,
            mode: MatchMode::default(),
            dry_run: false,
            strict: false,
            backup: false,
            report: None,
            report_format: ReportOutputFormat::Json,
        }
    }

    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.target)
    }
}

/// On-disk form; every field optional so CLI flags can fill gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: Option<MatchMode>,
    pub dry_run: Option<bool>,
    pub strict: Option<bool>,
    pub backup: Option<bool>,
    pub report: Option<PathBuf>,
    pub report_format: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut file: ConfigFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for slot in [
            &mut file.source,
            &mut file.target,
            &mut file.output,
            &mut file.report,
        ] {
            if let Some(p) = slot.take() {
                *slot = Some(if p.is_relative() { base.join(p) } else { p });
            }
        }
        Ok(file)
    }
}

/// Command-line values; `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: Option<MatchMode>,
    pub dry_run: bool,
    pub strict: bool,
    pub backup: bool,
    pub report: Option<PathBuf>,
    pub report_format: Option<ReportOutputFormat>,
}

/// Merge an optional config file with CLI overrides.
pub fn resolve(file: Option<ConfigFile>, cli: Overrides) -> Result<PatchConfig> {
    let file = file.unwrap_or_default();

    let source = cli.source.or(file.source).ok_or_else(|| {
        anyhow!("no source file given (pass SOURCE or set `source` in the config)")
    })?;
    let target = cli.target.or(file.target).ok_or_else(|| {
        anyhow!("no target file given (pass TARGET or set `target` in the config)")
    })?;

    let report_format = match (cli.report_format, file.report_format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => ReportOutputFormat::parse(name)
            .ok_or_else(|| anyhow!("unknown report format `{}` in config", name))?,
        (None, None) => ReportOutputFormat::Json,
    };

    Ok(PatchConfig {
        source,
        target,
        output: cli.output.or(file.output),
        mode: cli.mode.or(file.mode).unwrap_or_default(),
        dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
        strict: cli.strict || file.strict.unwrap_or(false),
        backup: cli.backup || file.backup.unwrap_or(false),
        report: cli.report.or(file.report),
        report_format,
    })
}
