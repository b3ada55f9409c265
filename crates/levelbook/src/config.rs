//! Construction-time configuration for one book side

use levelbook_types::{BookError, BookResult, BookSide};
use serde::{Deserialize, Serialize};

/// Default number of levels retained per side
pub const DEFAULT_DEPTH: usize = 10;

/// Default price precision if not specified (BTC/USD typically has 1)
pub const DEFAULT_PRICE_PRECISION: u32 = 1;

/// Default volume precision if not specified (typically 8)
pub const DEFAULT_VOLUME_PRECISION: u32 = 8;

/// Largest scale a `Decimal` can carry
pub const MAX_PRECISION: u32 = 28;

/// Configuration for an [`OrderBookSide`](crate::OrderBookSide)
///
/// Precisions must match the exchange's published values for the pair,
/// otherwise the checksum bytes will not line up with the exchange checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    /// Which half of the book
    pub side: BookSide,
    /// Maximum number of levels kept
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Fractional digits used for price keys and checksum
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,
    /// Fractional digits used for volume in checksum and rendering
    #[serde(default = "default_volume_precision")]
    pub volume_precision: u32,
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

fn default_price_precision() -> u32 {
    DEFAULT_PRICE_PRECISION
}

fn default_volume_precision() -> u32 {
    DEFAULT_VOLUME_PRECISION
}

impl SideConfig {
    /// Create a config with default depth and precisions
    pub fn new(side: BookSide) -> Self {
        Self {
            side,
            depth: DEFAULT_DEPTH,
            price_precision: DEFAULT_PRICE_PRECISION,
            volume_precision: DEFAULT_VOLUME_PRECISION,
        }
    }

    /// Ask side config
    pub fn asks() -> Self {
        Self::new(BookSide::Ask)
    }

    /// Bid side config
    pub fn bids() -> Self {
        Self::new(BookSide::Bid)
    }

    /// Set the depth
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set price and volume precision (from the pair's instrument data)
    pub fn with_precision(mut self, price_precision: u32, volume_precision: u32) -> Self {
        self.price_precision = price_precision;
        self.volume_precision = volume_precision;
        self
    }

    /// Check depth and precision bounds
    pub fn validate(&self) -> BookResult<()> {
        if self.depth == 0 {
            return Err(BookError::InvalidConfig(
                "depth must be at least 1".to_string(),
            ));
        }
        if self.price_precision > MAX_PRECISION {
            return Err(BookError::InvalidConfig(format!(
                "price precision {} exceeds {}",
                self.price_precision, MAX_PRECISION
            )));
        }
        if self.volume_precision > MAX_PRECISION {
            return Err(BookError::InvalidConfig(format!(
                "volume precision {} exceeds {}",
                self.volume_precision, MAX_PRECISION
            )));
        }
        Ok(())
    }
}
