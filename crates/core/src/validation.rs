//! Per-row validation and normalization of ingested project records.
//!
//! Validation never fails as control flow: every row yields a [`ValidationOutcome`]
//! holding hard errors (row must not be persisted) and soft warnings (row is kept
//! but flagged for review).

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::constants::{SCORE_MAX, SCORE_MIN};
use crate::iso::IsoCode;
use crate::record::{NumericCell, ProjectRecord, SourceRow};
use crate::report::IngestionReport;

/// Hard failure: the row is not eligible for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Missing Project Name or Codename")]
    MissingName,

    /// Capacity present but negative or not a number.
    #[error("Invalid capacity value")]
    InvalidCapacity,
}

/// Soft anomaly: the row is persisted but flagged.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarning {
    #[error("Unusual ISO value \"{0}\"")]
    UnusualIso(String),

    #[error("Score {0} outside typical range 0-5")]
    ScoreOutOfRange(f64),
}

/// Cleaned values of a row that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProject {
    pub row_index: usize,
    pub name: String,
    pub capacity_mw: Option<f64>,
    pub iso: Option<IsoCode>,
    pub overall_score: Option<f64>,
}

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    /// Physical spreadsheet row, header included. Used for reporting only.
    pub row_index: usize,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    /// Present exactly when `errors` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<NormalizedProject>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate one record against the import rules.
///
/// Capacity and score are read asymmetrically: an unparseable capacity is an
/// error, while an unparseable score skips the range check entirely.
#[must_use]
pub fn validate(record: &ProjectRecord, row_index: usize) -> ValidationOutcome {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let name = record.name();
    if name.is_none() {
        errors.push(ValidationError::MissingName);
    }

    let capacity_mw = match record.capacity_mw.parse_number() {
        NumericCell::Absent => None,
        NumericCell::Value(mw) if mw >= 0.0 => Some(mw),
        NumericCell::Value(_) | NumericCell::Unparseable => {
            errors.push(ValidationError::InvalidCapacity);
            None
        },
    };

    let iso = record.iso.as_text().map(|raw| IsoCode::classify(&raw));
    if let Some(IsoCode::Unrecognized(raw)) = &iso {
        warnings.push(ValidationWarning::UnusualIso(raw.clone()));
    }

    let overall_score = match record.overall_score.parse_number() {
        NumericCell::Value(score) => {
            if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
                warnings.push(ValidationWarning::ScoreOutOfRange(score));
            }
            Some(score)
        },
        NumericCell::Absent | NumericCell::Unparseable => None,
    };

    let normalized = match name {
        Some(name) if errors.is_empty() => Some(NormalizedProject {
            row_index,
            name,
            capacity_mw,
            iso,
            overall_score,
        }),
        _ => None,
    };

    ValidationOutcome { row_index, errors, warnings, normalized }
}

/// Outcomes of one import batch, in source row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchValidation {
    pub outcomes: Vec<ValidationOutcome>,
}

impl BatchValidation {
    /// Normalized rows eligible for persistence.
    pub fn accepted(&self) -> impl Iterator<Item = &NormalizedProject> {
        self.outcomes.iter().filter_map(|o| o.normalized.as_ref())
    }

    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }

    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.outcomes.len() - self.accepted_count()
    }

    #[must_use]
    pub fn report(&self) -> IngestionReport {
        IngestionReport::aggregate(&self.outcomes)
    }
}

/// Validate rows in parallel. The outcome order always matches `rows`.
#[must_use]
pub fn validate_rows(rows: &[SourceRow]) -> BatchValidation {
    let outcomes: Vec<ValidationOutcome> =
        rows.par_iter().map(|row| validate(&row.record, row.row_index)).collect();
    tracing::debug!(
        rows = outcomes.len(),
        rejected = outcomes.iter().filter(|o| !o.is_accepted()).count(),
        "validated import batch"
    );
    BatchValidation { outcomes }
}

/// Validate records that start at the first data row and have no gaps.
#[must_use]
pub fn validate_batch(records: &[ProjectRecord]) -> BatchValidation {
    validate_rows(&SourceRow::numbered(records.iter().cloned()))
}

#[cfg(test)]
mod tests;
