//! Spreadsheet source reader.
//!
//! The first row of the used range is the header row; every following
//! non-blank row becomes a [`SourceRow`] numbered by its physical position in
//! the worksheet, so gaps left by skipped rows stay visible in reports.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use pipeline_sync_core::{CellValue, ProjectRecord, SourceRow};

/// Read project rows from `path` (xlsx, xlsm, xlsb, xls or ods).
/// Uses the worksheet named `sheet`, or the first worksheet.
pub(crate) fn read_project_records(path: &Path, sheet: Option<&str>) -> Result<Vec<SourceRow>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let name = match sheet {
        Some(name) => name.to_owned(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .with_context(|| format!("workbook {} has no worksheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("failed to read worksheet {name:?}"))?;
    let rows = records_from_range(&range);
    tracing::debug!(sheet = %name, rows = rows.len(), "parsed worksheet");
    Ok(rows)
}

/// Map a used range onto numbered records. Empty ranges yield no rows.
pub(crate) fn records_from_range(range: &Range<Data>) -> Vec<SourceRow> {
    let Some((start_row, _)) = range.start() else {
        return Vec::new();
    };
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> =
        header.iter().map(|cell| cell_value(cell).as_text().unwrap_or_default()).collect();

    // calamine rows are relative to the range start; worksheet rows are 1-based.
    let header_row = start_row as usize + 1;

    rows.enumerate()
        .filter(|(_, cells)| !cells.iter().all(|cell| cell_value(cell).is_blank()))
        .map(|(offset, cells)| {
            let record = ProjectRecord::from_fields(
                headers.iter().map(String::as_str).zip(cells.iter().map(cell_value)),
            );
            SourceRow::new(header_row + 1 + offset, record)
        })
        .collect()
}

#[allow(clippy::cast_precision_loss, reason = "spreadsheet numbers are f64 anyway")]
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) | Data::Error(_) => {
            CellValue::Text(cell.to_string())
        },
    }
}
