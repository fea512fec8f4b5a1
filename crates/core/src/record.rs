//! Raw project records as read from a spreadsheet row.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FIRST_DATA_ROW, HEADER_CAPACITY_MW, HEADER_ISO, HEADER_OVERALL_SCORE, HEADER_PROJECT_CODENAME,
    HEADER_PROJECT_NAME,
};

/// One spreadsheet cell, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Result of reading a cell as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Empty cell or whitespace-only text.
    Absent,
    Value(f64),
    /// Present but not a finite decimal number.
    Unparseable,
}

impl CellValue {
    /// Empty cell or text made only of whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// Trimmed textual form, `None` when blank.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            },
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    /// Locale-insensitive numeric reading: `.` is the only decimal separator,
    /// surrounding whitespace is ignored, and non-finite values do not count.
    #[must_use]
    pub fn parse_number(&self) -> NumericCell {
        match self {
            Self::Empty => NumericCell::Absent,
            Self::Number(n) if n.is_finite() => NumericCell::Value(*n),
            Self::Number(_) | Self::Bool(_) => NumericCell::Unparseable,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return NumericCell::Absent;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => NumericCell::Value(n),
                    _ => NumericCell::Unparseable,
                }
            },
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss, reason = "spreadsheet numbers are f64 anyway")]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// One ingested spreadsheet row, restricted to the columns the validator inspects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_name: CellValue,
    pub project_codename: CellValue,
    pub capacity_mw: CellValue,
    pub iso: CellValue,
    pub overall_score: CellValue,
}

impl ProjectRecord {
    /// Build a record from `(header, cell)` pairs. Unknown headers are ignored;
    /// a repeated header keeps its last value.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, CellValue)>,
    {
        let mut record = Self::default();
        for (header, value) in fields {
            match header.trim() {
                HEADER_PROJECT_NAME => record.project_name = value,
                HEADER_PROJECT_CODENAME => record.project_codename = value,
                HEADER_CAPACITY_MW => record.capacity_mw = value,
                HEADER_ISO => record.iso = value,
                HEADER_OVERALL_SCORE => record.overall_score = value,
                _ => {},
            }
        }
        record
    }

    #[must_use]
    pub fn with_project_name(mut self, value: impl Into<CellValue>) -> Self {
        self.project_name = value.into();
        self
    }

    #[must_use]
    pub fn with_project_codename(mut self, value: impl Into<CellValue>) -> Self {
        self.project_codename = value.into();
        self
    }

    #[must_use]
    pub fn with_capacity_mw(mut self, value: impl Into<CellValue>) -> Self {
        self.capacity_mw = value.into();
        self
    }

    #[must_use]
    pub fn with_iso(mut self, value: impl Into<CellValue>) -> Self {
        self.iso = value.into();
        self
    }

    #[must_use]
    pub fn with_overall_score(mut self, value: impl Into<CellValue>) -> Self {
        self.overall_score = value.into();
        self
    }

    /// Display name: "Project Name" when present, otherwise "Project Codename".
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.project_name.as_text().or_else(|| self.project_codename.as_text())
    }

    /// Whether every inspected cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.project_name.is_blank()
            && self.project_codename.is_blank()
            && self.capacity_mw.is_blank()
            && self.iso.is_blank()
            && self.overall_score.is_blank()
    }
}

/// A record paired with the physical spreadsheet row it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub row_index: usize,
    pub record: ProjectRecord,
}

impl SourceRow {
    pub fn new(row_index: usize, record: ProjectRecord) -> Self {
        Self { row_index, record }
    }

    /// Number records consecutively starting at the first data row.
    pub fn numbered(records: impl IntoIterator<Item = ProjectRecord>) -> Vec<Self> {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Self::new(i + FIRST_DATA_ROW, record))
            .collect()
    }
}
