// SPDX-License-Identifier: PMPL-1.0-or-later

//! entry-patch: replace keyed entry blocks in a localization file

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::*;
use entry_patch::config::{self, ConfigFile, Overrides, PatchConfig};
use entry_patch::report::{ReportFormatter, ReportOutputFormat};
use entry_patch::types::MatchMode;
use entry_patch::{diagnostics, extract, patcher, storage};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "entry-patch")]
#[command(version)]
#[command(about = "Replace keyed entry blocks in a localization file")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch TARGET with every entry found in SOURCE
    Apply {
        #[command(flatten)]
        files: FileArgs,

        /// Write the patched text here instead of over TARGET
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do everything except writing the output file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Refuse to patch when validation finds malformed blocks
        #[arg(long)]
        strict: bool,

        /// Keep a timestamped copy of the output file before overwriting
        #[arg(short, long)]
        backup: bool,

        /// Print a line diff of every changed block
        #[arg(short, long)]
        diff: bool,

        /// Save a run report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<ReportOutputFormat>,

        /// Only print warnings and errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the entries found in SOURCE
    List {
        /// Translation drop to read
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Block matching strategy
        #[arg(short, long, value_enum, default_value = "pattern")]
        mode: ModeArg,
    },

    /// Validate SOURCE and look up every key in TARGET without writing
    Check {
        #[command(flatten)]
        files: FileArgs,
    },
}

#[derive(Args)]
struct FileArgs {
    /// Translation drop supplying the new entries
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Localization file to patch
    #[arg(value_name = "TARGET")]
    target: Option<PathBuf>,

    /// Block matching strategy
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// YAML file with defaults for any of these options
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// CLI argument types
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Pattern,
    Balanced,
}

impl From<ModeArg> for MatchMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Pattern => MatchMode::Pattern,
            ModeArg::Balanced => MatchMode::Balanced,
        }
    }
}

fn resolve_config(files: FileArgs, overrides: Overrides) -> Result<PatchConfig> {
    let file = match &files.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => None,
    };
    config::resolve(
        file,
        Overrides {
            source: files.source,
            target: files.target,
            mode: files.mode.map(Into::into),
            ..overrides
        },
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            files,
            output,
            dry_run,
            strict,
            backup,
            diff,
            report,
            format,
            quiet,
        } => {
            let config = resolve_config(
                files,
                Overrides {
                    output,
                    dry_run,
                    strict,
                    backup,
                    report,
                    report_format: format,
                    ..Default::default()
                },
            )?;

            let formatter = if quiet {
                ReportFormatter::quiet()
            } else {
                ReportFormatter::new()
            };

            let extraction = patcher::extract(&config)?;
            formatter.print_loaded(&extraction.entries);
            formatter.print_findings(&extraction.findings);

            let run_report = patcher::apply(&config, extraction)?;
            formatter.print_outcomes(&run_report.outcomes);
            formatter.print_summary(&run_report);

            if diff {
                formatter.print_diff(&run_report);
            }
            if let Some(path) = &config.report {
                if !quiet {
                    println!("Report saved to: {}", path.display());
                }
            }
        }

        Commands::List { source, mode } => {
            let mode: MatchMode = mode.into();
            let text = storage::read_blob(&source)?;
            let entries = extract::extract_entries(&text, mode)?;
            let findings = diagnostics::validate_entries(&text, &entries, mode)?;

            println!(
                "{} ({} entries from {} blocks, {} mode)",
                source.display().to_string().bold(),
                entries.len(),
                extract::count_pattern_matches(&text)?,
                mode.as_str()
            );
            for entry in &entries {
                println!(
                    "  {:<32} {:>4} lines",
                    entry.key,
                    entry.normalized().lines().count()
                );
            }
            ReportFormatter::new().print_findings(&findings);
        }

        Commands::Check { files } => {
            let config = resolve_config(files, Overrides::default())?;
            diagnostics::run_check(&config)?;
        }
    }

    Ok(())
}
