//! Validation support, used by tests to check the map's structural
//! invariants.

use alloc::string::String;
use core::fmt;

/// A structural invariant of a map does not hold.
#[derive(Debug)]
pub enum ValidationError {
    /// One of the two bucket tables is malformed.
    Table {
        /// Which table failed.
        name: &'static str,
        /// What is wrong with it.
        error: TableValidationError,
    },
    /// The arena, the iteration list or the cross-table linkage is
    /// inconsistent.
    General(String),
}

impl ValidationError {
    pub(crate) fn general(msg: impl Into<String>) -> Self {
        ValidationError::General(msg.into())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { name, error } => {
                write!(f, "validation error in table {}: {}", name, error)
            }
            Self::General(msg) => msg.fmt(f),
        }
    }
}

impl core::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ValidationError::Table { error, .. } => Some(error),
            ValidationError::General(_) => None,
        }
    }
}

/// A bucket table's links, bucket placement or balance are wrong.
#[derive(Debug)]
pub struct TableValidationError(String);

impl TableValidationError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        TableValidationError(msg.into())
    }
}

impl fmt::Display for TableValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl core::error::Error for TableValidationError {}
