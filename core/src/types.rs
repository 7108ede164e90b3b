//! Shared primitive types used across the whole dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown for the wildcard entry of every dropdown.
pub const ALL_LABEL: &str = "Todos";

/// Inclusive calendar date range.
pub type DateRange = (chrono::NaiveDate, chrono::NaiveDate);

/// One dropdown selection: the wildcard or a concrete value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    pub fn only(value: impl Into<String>) -> Self {
        Self::Only(value.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// True when this choice lets `value` through.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(v) => v == value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_LABEL),
            Self::Only(v) => f.write_str(v),
        }
    }
}
