//! Book side enum

use serde::{Deserialize, Serialize};

/// Which half of the order book a side holds
///
/// The side decides the sort direction: asks are best when lowest, bids are
/// best when highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    /// Buy interest, sorted high to low
    Bid,
    /// Sell interest, sorted low to high
    Ask,
}

impl BookSide {
    /// Returns the side name as used in feed messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }

    /// Returns true for the ask side (ascending order)
    pub fn is_ask(&self) -> bool {
        matches!(self, Self::Ask)
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

impl std::fmt::Display for BookSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
