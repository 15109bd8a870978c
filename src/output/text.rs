//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per update group with a colored semver label
//! - Member packages of multi-package groups
//! - Skipped dependencies with reasons (verbose mode)
//! - A closing summary line

use crate::domain::{SemverLabel, UpdateGroup};
use crate::orchestrator::RunResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn label(&self, label: SemverLabel) -> String {
        let text = label.to_string();
        if !self.color {
            return text;
        }
        match label {
            SemverLabel::Major => text.red().bold().to_string(),
            SemverLabel::Minor => text.yellow().to_string(),
            SemverLabel::Patch => text.green().to_string(),
            SemverLabel::Unchanged => text.dimmed().to_string(),
        }
    }

    fn format_group(
        &self,
        group: &UpdateGroup,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", group.display_name, width = name_width);
        let current = group.group_current_version.as_str();
        let latest = group.group_latest_version.as_str();

        if self.color {
            writeln!(
                writer,
                "  {} {} {} {} [{}] {}",
                name.bold(),
                current.dimmed(),
                "→".dimmed(),
                latest.bright_white().bold(),
                self.label(group.semver_label),
                group.identifier.dimmed()
            )?;
        } else {
            writeln!(
                writer,
                "  {} {} → {} [{}] {}",
                name,
                current,
                latest,
                self.label(group.semver_label),
                group.identifier
            )?;
        }

        if group.packages.len() > 1 || self.verbosity == Verbosity::Verbose {
            for package in &group.packages {
                writeln!(writer, "      {}", package)?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &RunResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let groups = &result.matrix.include;

        if groups.is_empty() {
            if self.verbosity != Verbosity::Quiet {
                writeln!(writer, "All dependencies are up to date.")?;
            }
        } else {
            let name_width = groups
                .iter()
                .map(|g| g.display_name.len())
                .max()
                .unwrap_or(0);
            for group in groups {
                self.format_group(group, name_width, writer)?;
            }
        }

        if self.verbosity == Verbosity::Verbose && !result.skipped.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Skipped:")?;
            for skip in &result.skipped {
                let line = format!("  {} {} ({})", skip.name, skip.declared, skip.reason);
                if self.color {
                    writeln!(writer, "{}", line.dimmed())?;
                } else {
                    writeln!(writer, "{}", line)?;
                }
            }
        }

        if self.verbosity != Verbosity::Quiet {
            writeln!(writer)?;
            let mut summary = format!(
                "{} update group(s) from {} dependencies",
                groups.len(),
                result.scanned
            );
            if result.excluded > 0 {
                summary.push_str(&format!(", {} excluded", result.excluded));
            }
            if result.truncated > 0 {
                summary.push_str(&format!(", {} beyond limit", result.truncated));
            }
            writeln!(writer, "{}", summary)?;
        }

        Ok(())
    }
}
