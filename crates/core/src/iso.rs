//! Grid-operator (ISO/RTO) codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Regional grid operator a project sells into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IsoRegion {
    #[serde(rename = "PJM")]
    Pjm,
    #[serde(rename = "NYISO")]
    Nyiso,
    #[serde(rename = "ISONE")]
    Isone,
    #[serde(rename = "MISO")]
    Miso,
    #[serde(rename = "ERCOT")]
    Ercot,
    #[serde(rename = "CAISO")]
    Caiso,
    #[serde(rename = "SPP")]
    Spp,
    Other,
}

impl IsoRegion {
    pub const ALL_VARIANTS: &'static [IsoRegion] = &[
        IsoRegion::Pjm,
        IsoRegion::Nyiso,
        IsoRegion::Isone,
        IsoRegion::Miso,
        IsoRegion::Ercot,
        IsoRegion::Caiso,
        IsoRegion::Spp,
        IsoRegion::Other,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pjm => "PJM",
            Self::Nyiso => "NYISO",
            Self::Isone => "ISONE",
            Self::Miso => "MISO",
            Self::Ercot => "ERCOT",
            Self::Caiso => "CAISO",
            Self::Spp => "SPP",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for IsoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match against the known codes.
impl FromStr for IsoRegion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_VARIANTS
            .iter()
            .copied()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| CoreError::UnknownIsoRegion(s.to_owned()))
    }
}

/// ISO cell after normalization: unknown codes are kept, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IsoCode {
    Known(IsoRegion),
    Unrecognized(String),
}

impl IsoCode {
    /// Classify a trimmed, non-empty ISO value.
    pub fn classify(value: &str) -> Self {
        value.parse().map_or_else(|_| Self::Unrecognized(value.to_owned()), Self::Known)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(region) => region.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}
