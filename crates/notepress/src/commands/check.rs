//! `notepress check` command implementation.
//!
//! Runs publication-readiness checks on a note without touching the network
//! and writes a JSON report next to the summary printed on the terminal.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Args;
use notepress_config::{CliSettings, Config};
use notepress_renderer::{ImageResolver, Metadata, split_front_matter};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;

/// Image files larger than this trigger a warning (bytes).
const LARGE_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Assumed reading speed in words per minute.
const READING_WPM: usize = 200;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the note to check.
    note: PathBuf,

    /// Where to write the JSON report.
    #[arg(long, default_value = "quality_report.json")]
    report: PathBuf,

    /// Vault root directory (overrides config).
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover notepress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Serialize)]
struct Issue {
    severity: Severity,
    category: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct Statistics {
    characters: usize,
    words: usize,
    reading_time_minutes: usize,
    images: usize,
    links: usize,
}

#[derive(Debug, Serialize)]
struct QualityReport {
    note: String,
    checked_at: String,
    passed: bool,
    issues: Vec<Issue>,
    statistics: Statistics,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read or the report cannot be
    /// written. Check findings are reported, not raised.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            vault_root: self.vault.clone(),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let text = fs::read_to_string(&self.note)?;
        let report = run_checks(&text, &self.note, &config.vault_resolved.root);

        fs::write(&self.report, serde_json::to_string_pretty(&report)?)?;
        print_summary(&output, &report, &self.report);

        if report.passed {
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} error(s) found",
                report
                    .issues
                    .iter()
                    .filter(|i| i.severity == Severity::Error)
                    .count()
            )))
        }
    }
}

/// Run all checks over one note.
fn run_checks(text: &str, note_path: &Path, vault_root: &Path) -> QualityReport {
    let (metadata, body) = split_front_matter(text);

    let mut issues = Vec::new();
    check_metadata(&metadata, &mut issues);
    let images = check_images(body, note_path, vault_root, &mut issues);
    check_format(body, &mut issues);

    let words = body.split_whitespace().count();
    let statistics = Statistics {
        characters: body.chars().count(),
        words,
        reading_time_minutes: words.div_ceil(READING_WPM).max(1),
        images,
        links: body.matches("](").count(),
    };

    let passed = !issues.iter().any(|i| i.severity == Severity::Error);
    QualityReport {
        note: note_path.display().to_string(),
        checked_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        passed,
        issues,
        statistics,
    }
}

/// Front matter checks: recommended fields and the date format.
fn check_metadata(metadata: &Metadata, issues: &mut Vec<Issue>) {
    for key in ["title", "param_category", "param_tags"] {
        if metadata.str_value(key).is_none_or(|v| v.trim().is_empty()) {
            issues.push(Issue {
                severity: Severity::Warning,
                category: "metadata",
                message: format!("missing front matter field '{key}'"),
            });
        }
    }

    if let Some(created) = metadata.str_value("param_created")
        && NaiveDate::parse_from_str(created.trim(), "%Y-%m-%d").is_err()
    {
        issues.push(Issue {
            severity: Severity::Error,
            category: "metadata",
            message: format!("param_created '{created}' is not a YYYY-MM-DD date"),
        });
    }
}

/// Image checks: every directive resolves, and resolved files are not huge.
/// Returns the number of directives found.
fn check_images(body: &str, note_path: &Path, vault_root: &Path, issues: &mut Vec<Issue>) -> usize {
    let directive_count = body.matches("![[").count();
    let resolver = ImageResolver::new(vault_root);
    let resolved = resolver.extract_images(body, note_path);

    let missing = directive_count.saturating_sub(resolved.len());
    if missing > 0 {
        issues.push(Issue {
            severity: Severity::Error,
            category: "images",
            message: format!("{missing} image directive(s) do not resolve to a file"),
        });
    }

    for image in &resolved {
        if let Ok(meta) = fs::metadata(&image.resolved_path)
            && meta.len() > LARGE_IMAGE_BYTES
        {
            issues.push(Issue {
                severity: Severity::Warning,
                category: "images",
                message: format!(
                    "'{}' is {:.1} MB; consider resizing before publishing",
                    image.raw_filename,
                    meta.len() as f64 / (1024.0 * 1024.0)
                ),
            });
        }
    }

    directive_count
}

/// Formatting checks: a top-level heading and no big blank gaps.
fn check_format(body: &str, issues: &mut Vec<Issue>) {
    if !body.lines().any(|line| line.starts_with("# ")) {
        issues.push(Issue {
            severity: Severity::Warning,
            category: "format",
            message: "no level-1 heading in the body".to_owned(),
        });
    }

    let mut blank_run = 0usize;
    let mut max_blank_run = 0usize;
    for line in body.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            max_blank_run = max_blank_run.max(blank_run);
        } else {
            blank_run = 0;
        }
    }
    if max_blank_run >= 3 {
        issues.push(Issue {
            severity: Severity::Warning,
            category: "format",
            message: format!("{max_blank_run} consecutive blank lines"),
        });
    }
}

fn print_summary(output: &Output, report: &QualityReport, report_path: &Path) {
    output.highlight(&format!("Quality check: {}", report.note));

    for issue in &report.issues {
        let line = format!("  [{}] {}", issue.category, issue.message);
        match issue.severity {
            Severity::Error => output.error(&line),
            Severity::Warning => output.warning(&line),
        }
    }

    output.info(&format!(
        "  {} words, {} image(s), {} link(s), ~{} min read",
        report.statistics.words,
        report.statistics.images,
        report.statistics.links,
        report.statistics.reading_time_minutes
    ));
    output.info(&format!("  Report written to {}", report_path.display()));

    if report.passed {
        output.success("  PASSED");
    } else {
        output.error("  FAILED");
    }
}
