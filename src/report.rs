//! Output formatting for docweave results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;
use std::path::Path;

use crate::analysis::StructureDesc;
use crate::pipeline::{BatchReport, FileOutcome, FileStatus};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report of an `apply` run.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub path: String,
    pub config: String,
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_updated: usize,
    pub files_failed: usize,
    pub summaries_generated: usize,
    pub summaries_preserved: usize,
    pub files: Vec<JsonFile<'a>>,
}

/// Per-file entry of the JSON report.
#[derive(Serialize)]
pub struct JsonFile<'a> {
    pub path: String,
    pub status: FileStatus,
    pub structures: usize,
    pub methods: usize,
    pub generated: usize,
    pub preserved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

/// JSON form of the merged model, as printed by `docweave model`.
#[derive(Serialize)]
pub struct JsonModel<'a> {
    pub version: &'static str,
    pub path: String,
    pub files: Vec<JsonModelFile<'a>>,
}

#[derive(Serialize)]
pub struct JsonModelFile<'a> {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub structures: &'a [StructureDesc],
}

/// Build the JSON report of an `apply` run.
pub fn build_json_report<'a>(
    base_path: &Path,
    config_path: &str,
    report: &'a BatchReport,
) -> JsonReport<'a> {
    let files = report
        .files
        .iter()
        .map(|f| JsonFile {
            path: make_relative_path(&f.path, base_path),
            status: f.status,
            structures: f.structures.len(),
            methods: f.structures.iter().map(|s| s.methods.len()).sum(),
            generated: f.generated,
            preserved: f.preserved,
            error: f.error.as_ref().map(|e| e.message.as_str()),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        path: base_path.to_string_lossy().to_string(),
        config: config_path.to_string(),
        dry_run: report.dry_run,
        files_scanned: report.files.len(),
        files_updated: report.updated_count(),
        files_failed: report.failed_count(),
        summaries_generated: report.generated_count(),
        summaries_preserved: report.preserved_count(),
        files,
    }
}

/// Write an `apply` report in JSON format.
pub fn write_json(base_path: &Path, config_path: &str, report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_report(base_path, config_path, report))?;
    println!("{}", json);
    Ok(())
}

/// Build the JSON model export.
pub fn build_json_model<'a>(base_path: &Path, report: &'a BatchReport) -> JsonModel<'a> {
    JsonModel {
        version: env!("CARGO_PKG_VERSION"),
        path: base_path.to_string_lossy().to_string(),
        files: report
            .files
            .iter()
            .map(|f| JsonModelFile {
                path: make_relative_path(&f.path, base_path),
                error: f.error.as_ref().map(|e| e.message.as_str()),
                structures: &f.structures,
            })
            .collect(),
    }
}

/// Write the merged model in JSON format.
pub fn write_model_json(base_path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_model(base_path, report))?;
    println!("{}", json);
    Ok(())
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // Single file run: just the filename
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write an `apply` report as colored terminal output.
pub fn write_pretty(base_path: &Path, config_path: &str, report: &BatchReport) {
    // Header
    println!();
    print!("  ");
    print!("{}", "docweave".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Path:   ".dimmed());
    println!("{}", base_path.display());
    print!("  {}", "Config: ".dimmed());
    println!("{}", config_path);
    if report.dry_run {
        println!("  {}", "dry run, no files written".yellow());
    }
    println!();

    write_files(base_path, &report.files);
    println!();

    write_summary(report);
    println!();
}

fn write_files(base_path: &Path, files: &[FileOutcome]) {
    println!("  {} ({}):", "Files".bold(), files.len());
    println!();

    for f in files {
        write_status_tag(f.status);
        print!("  {}", make_relative_path(&f.path, base_path).blue());

        match &f.error {
            Some(error) => {
                println!();
                println!("            {}", error.message.red());
            }
            None => {
                let methods: usize = f.structures.iter().map(|s| s.methods.len()).sum();
                println!(
                    "  {}",
                    format!(
                        "{} types, {} methods, {} generated, {} kept",
                        f.structures.len(),
                        methods,
                        f.generated,
                        f.preserved
                    )
                    .dimmed()
                );
            }
        }
    }
}

fn write_status_tag(status: FileStatus) {
    match status {
        FileStatus::Updated => print!("    {}", "UPDATED  ".green()),
        FileStatus::Unchanged => print!("    {}", "UNCHANGED".dimmed()),
        FileStatus::Failed => print!("    {}", "FAILED   ".red()),
    }
}

fn write_summary(report: &BatchReport) {
    let verb = if report.dry_run { "would update" } else { "updated" };
    print!(
        "  {} files, {} {}",
        report.files.len(),
        verb,
        report.updated_count()
    );
    print!(
        ", {} summaries generated, {} kept",
        report.generated_count(),
        report.preserved_count()
    );

    if report.has_failures() {
        print!("  {}", format!("{} FAILED", report.failed_count()).red());
    } else {
        print!("  {}", "OK".green());
    }
    println!();
}
