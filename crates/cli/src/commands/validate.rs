//! Validate a spreadsheet and print the ingestion report.
//!
//! Exits non-zero when any row carries a hard error; warnings alone do not fail.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use pipeline_sync_core::{BatchValidation, IngestionReport, validate_rows};

use crate::sheet::read_project_records;

pub(crate) fn run(file: &Path, sheet: Option<&str>, json: bool) -> Result<ExitCode> {
    let rows = read_project_records(file, sheet)?;
    tracing::info!(file = %file.display(), rows = rows.len(), "read spreadsheet");

    let batch = validate_rows(&rows);
    let report = batch.report();

    if json {
        let projects: Vec<_> = batch.accepted().collect();
        let body = serde_json::json!({
            "rows": rows.len(),
            "accepted": batch.accepted_count(),
            "rejected": batch.rejected_count(),
            "errors": report.errors,
            "warnings": report.warnings,
            "projects": projects,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_text(&batch, &report);
    }

    Ok(if report.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn print_text(batch: &BatchValidation, report: &IngestionReport) {
    println!(
        "{} row(s): {} accepted, {} rejected, {} warning(s)",
        batch.outcomes.len(),
        batch.accepted_count(),
        batch.rejected_count(),
        report.warnings.len()
    );
    if !report.errors.is_empty() {
        println!("\nErrors:");
        for line in &report.errors {
            println!("  {line}");
        }
    }
    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for line in &report.warnings {
            println!("  {line}");
        }
    }
}
