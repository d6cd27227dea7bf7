//! Call results
//!
//! A call either runs (`Accepted`) or is turned away by a check (`Rejected`).
//! Both are ordinary replies on the bus; only a backend failure becomes a
//! bus-level error.

use thiserror::Error;

use crate::error::BackendError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Canonical return value of the command, usually the echoed reference
    Accepted(String),
    /// Message of the first failed check
    Rejected { reason: String },
}

impl Outcome {
    pub fn accepted(value: impl Into<String>) -> Self {
        Self::Accepted(value.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Text sent back to the caller
    pub fn message(&self) -> &str {
        match self {
            Self::Accepted(value) => value,
            Self::Rejected { reason } => reason,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            Self::Accepted(value) => value,
            Self::Rejected { reason } => reason,
        }
    }
}

/// A validated call failed inside the backend
#[derive(Error, Debug)]
#[error("{command} failed: {source}")]
pub struct CommandError {
    pub command: &'static str,
    #[source]
    pub source: BackendError,
}
