//! Outcome of a schema-extension run, as reported to callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A column observed in the schema catalog after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedColumn {
    pub name: String,
    pub data_type: String,
}

/// Why a migration run did not commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection could not be acquired or was lost before commit.
    Connection,
    /// Transient DDL race (serialization failure, deadlock, catalog unique index).
    Conflict,
    /// An existing column has a different type than the artifact declares.
    TypeConflict,
    /// Any other database error inside the transaction.
    Database,
    /// Schema name or artifact rejected before touching the database.
    InvalidInput,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Connection => "connection",
            Self::Conflict => "conflict",
            Self::TypeConflict => "type_conflict",
            Self::Database => "database",
            Self::InvalidInput => "invalid_input",
        }
    }

    /// Only transient conflicts are worth one more attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one migration invocation.
///
/// `succeeded` is strictly the transaction commit outcome. Verification runs
/// after commit and only feeds `columns_verified` and `columns_missing`; a
/// failed verification query is recorded in `verification_error` without
/// flipping `succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRunResult {
    pub schema: String,
    pub table: String,
    pub spec_version: u32,
    pub succeeded: bool,
    pub columns_expected: usize,
    pub columns_added: Vec<String>,
    /// Whole column family found in the catalog, undeclared columns included.
    pub columns_verified: Vec<VerifiedColumn>,
    /// Declared columns absent from the catalog. `None` until verification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_missing: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_error: Option<String>,
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MigrationRunResult {
    /// Fresh, not-yet-finished result for a run against `schema.table`.
    pub fn begin(schema: &str, table: &str, spec_version: u32, columns_expected: usize) -> Self {
        let now = Utc::now();
        Self {
            schema: schema.to_owned(),
            table: table.to_owned(),
            spec_version,
            succeeded: false,
            columns_expected,
            columns_added: Vec::new(),
            columns_verified: Vec::new(),
            columns_missing: None,
            failure_kind: None,
            failure_reason: None,
            verification_error: None,
            attempts: 1,
            started_at: now,
            finished_at: now,
        }
    }

    /// Mark the run committed.
    #[must_use]
    pub fn committed(mut self, columns_added: Vec<String>) -> Self {
        self.succeeded = true;
        self.columns_added = columns_added;
        self.failure_kind = None;
        self.failure_reason = None;
        self.finished_at = Utc::now();
        self
    }

    /// Mark the run failed. For connection failures the reason is the fixed
    /// string `connection`; otherwise it carries the underlying cause.
    #[must_use]
    pub fn failed(mut self, kind: FailureKind, cause: impl fmt::Display) -> Self {
        self.succeeded = false;
        self.columns_added.clear();
        self.failure_kind = Some(kind);
        self.failure_reason = Some(match kind {
            FailureKind::Connection => FailureKind::Connection.as_str().to_owned(),
            _ => cause.to_string(),
        });
        self.finished_at = Utc::now();
        self
    }

    /// Record the catalog listing and which of the `declared` names it lacks.
    #[must_use]
    pub fn with_verification<'a>(
        mut self,
        declared: impl IntoIterator<Item = &'a str>,
        columns: Vec<VerifiedColumn>,
    ) -> Self {
        let missing = declared
            .into_iter()
            .filter(|name| !columns.iter().any(|c| c.name == *name))
            .map(str::to_owned)
            .collect();
        self.columns_missing = Some(missing);
        self.columns_verified = columns;
        self
    }

    /// Declared columns confirmed by verification; zero when it did not run.
    #[must_use]
    pub fn columns_present(&self) -> usize {
        self.columns_missing
            .as_ref()
            .map_or(0, |missing| self.columns_expected.saturating_sub(missing.len()))
    }

    /// Whether the catalog shows every declared column by name.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.succeeded && self.columns_missing.as_ref().is_some_and(Vec::is_empty)
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !self.succeeded && self.failure_kind.is_some_and(|k| k.is_retryable())
    }

    /// One-line human summary for operators.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.succeeded {
            let head = format!(
                "migration v{} on {}.{} committed: {} column(s) added",
                self.spec_version,
                self.schema,
                self.table,
                self.columns_added.len(),
            );
            match &self.columns_missing {
                None => format!("{head}, not verified"),
                Some(missing) if missing.is_empty() => format!(
                    "{head}, {} of {} declared column(s) present",
                    self.columns_present(),
                    self.columns_expected
                ),
                Some(missing) => format!(
                    "{head}, {} of {} declared column(s) present, missing {}",
                    self.columns_present(),
                    self.columns_expected,
                    missing.join(", ")
                ),
            }
        } else {
            format!(
                "migration v{} on {}.{} failed after {} attempt(s): {}",
                self.spec_version,
                self.schema,
                self.table,
                self.attempts,
                self.failure_reason.as_deref().unwrap_or("unknown"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified(name: &str) -> VerifiedColumn {
        VerifiedColumn { name: name.to_owned(), data_type: "numeric".to_owned() }
    }

    #[test]
    fn test_connection_failure_reason_is_fixed() {
        let result = MigrationRunResult::begin("pipeline_dashboard", "projects", 1, 13)
            .failed(FailureKind::Connection, "pool timed out while waiting for an open connection");
        assert!(!result.succeeded);
        assert_eq!(result.failure_reason.as_deref(), Some("connection"));
        assert!(!result.is_retryable());
    }

    #[test]
    fn test_failure_carries_cause() {
        let result = MigrationRunResult::begin("s", "projects", 1, 13)
            .failed(FailureKind::Conflict, "deadlock detected");
        assert_eq!(result.failure_reason.as_deref(), Some("deadlock detected"));
        assert!(result.is_retryable());
        assert!(result.summary().contains("failed after 1 attempt(s): deadlock detected"));
    }

    #[test]
    fn test_committed_summary_counts() {
        let result = MigrationRunResult::begin("s", "projects", 1, 2)
            .committed(vec!["ma_irr".to_owned()])
            .with_verification(["ma_irr", "ma_moic"], vec![verified("ma_irr"), verified("ma_moic")]);
        assert!(result.is_complete());
        assert_eq!(result.columns_missing, Some(Vec::new()));
        assert_eq!(
            result.summary(),
            "migration v1 on s.projects committed: 1 column(s) added, 2 of 2 declared column(s) present"
        );
    }

    #[test]
    fn test_undeclared_family_columns_do_not_mask_a_missing_one() {
        let declared = ["ma_investment", "ma_irr", "ma_moic"];
        let found = vec![verified("ma_irr"), verified("ma_moic"), verified("ma_tier"), verified("ma_tier_id")];
        let result = MigrationRunResult::begin("s", "projects", 1, declared.len())
            .committed(Vec::new())
            .with_verification(declared, found);

        assert_eq!(result.columns_verified.len(), 4);
        assert_eq!(result.columns_missing, Some(vec!["ma_investment".to_owned()]));
        assert_eq!(result.columns_present(), 2);
        assert!(!result.is_complete());
        assert_eq!(
            result.summary(),
            "migration v1 on s.projects committed: 0 column(s) added, 2 of 3 declared column(s) present, missing ma_investment"
        );
    }

    #[test]
    fn test_unverified_commit_is_not_complete() {
        let result = MigrationRunResult::begin("s", "projects", 1, 1).committed(Vec::new());
        assert!(!result.is_complete());
        assert_eq!(result.columns_present(), 0);
        assert!(result.summary().ends_with("0 column(s) added, not verified"));
    }

    #[test]
    fn test_failure_is_never_complete() {
        let result = MigrationRunResult::begin("s", "projects", 1, 1)
            .failed(FailureKind::Database, "boom")
            .with_verification(["ma_irr"], vec![verified("ma_irr")]);
        assert!(!result.is_complete());
    }
}
