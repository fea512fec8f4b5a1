//! Batch-level aggregation of validation outcomes.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationOutcome;

/// Flattened, row-prefixed messages for one import batch.
///
/// Only reports facts; whether errors block the import is the caller's call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl IngestionReport {
    /// Flatten outcomes in the order given, without sorting or deduplication.
    #[must_use]
    pub fn aggregate(outcomes: &[ValidationOutcome]) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            let row = outcome.row_index;
            report.errors.extend(outcome.errors.iter().map(|e| format!("Row {row}: {e}")));
            report.warnings.extend(outcome.warnings.iter().map(|w| format!("Row {row}: {w}")));
        }
        report
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
