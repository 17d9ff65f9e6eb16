// SPDX-License-Identifier: PMPL-1.0-or-later

//! Console and file output for patch runs

pub mod diff;
pub mod formatter;
pub mod output;

pub use formatter::ReportFormatter;
pub use output::{write_report, ReportOutputFormat};
