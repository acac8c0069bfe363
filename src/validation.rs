//! Seam to the external service that checks formula text and previews its evaluation.
//!
//! This crate never validates formulas itself. A [`ValidationBoundary`] is handed the exact
//! canonical text held by the [`Coordinator`](crate::coordinator::Coordinator) and its report is
//! shown to the user verbatim.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationMessage {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationReport {
    pub valid: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub errors: Vec<ValidationMessage>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = ValidationMessage>,
    {
        Self {
            valid: false,
            errors: errors.into_iter().collect(),
        }
    }
}

pub trait ValidationBoundary {
    fn validate(&self, formula: &str) -> ValidationReport;
}

impl<F> ValidationBoundary for F
where
    F: Fn(&str) -> ValidationReport,
{
    fn validate(&self, formula: &str) -> ValidationReport {
        self(formula)
    }
}

/// Snapshot of the text to send for validation, tied to the edit it was taken after.
///
/// A request goes stale as soon as the coordinator's text changes again; completing a stale
/// request discards its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub(crate) formula: String,
    pub(crate) revision: u64,
}

impl ValidationRequest {
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
