//! Error types for the levelbook crates

use thiserror::Error;

/// Errors raised while configuring or updating an order book side
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// A price or volume could not be represented as an exact decimal
    #[error("Invalid {field} {value:?}: {reason}")]
    Format {
        /// Which input was rejected ("price" or "volume")
        field: &'static str,
        /// The text as received
        value: String,
        /// Parser message
        reason: String,
    },

    /// Construction-time configuration rejected
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl BookError {
    /// Build a format error for `field` from the rejected text
    pub fn format(field: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Format {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the book must be resynchronised from a snapshot
    ///
    /// A format error aborts a batch half way, so the side no longer matches
    /// the exchange.
    pub fn requires_resync(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Result alias for book operations
pub type BookResult<T> = Result<T, BookError>;
