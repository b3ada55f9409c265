//! Both sides of a single pair's book
//!
//! Pairs an ask side with a bid side sharing depth and precisions, and
//! produces the whole-book checksum bytes (asks first, then bids).

use crate::config::SideConfig;
use crate::side::OrderBookSide;
use levelbook_types::{BookResult, BookSide, Decimal, LevelUpdate};

/// Order book for one pair
#[derive(Debug)]
pub struct OrderBook {
    asks: OrderBookSide,
    bids: OrderBookSide,
}

impl OrderBook {
    /// Create an empty book
    pub fn new(depth: usize, price_precision: u32, volume_precision: u32) -> BookResult<Self> {
        let config = |side| {
            SideConfig::new(side)
                .with_depth(depth)
                .with_precision(price_precision, volume_precision)
        };
        Ok(Self {
            asks: OrderBookSide::new(config(BookSide::Ask))?,
            bids: OrderBookSide::new(config(BookSide::Bid))?,
        })
    }

    /// The ask side
    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    /// The bid side
    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    /// Side by flag
    pub fn side(&self, side: BookSide) -> &OrderBookSide {
        match side {
            BookSide::Ask => &self.asks,
            BookSide::Bid => &self.bids,
        }
    }

    /// Apply one feed message worth of updates
    ///
    /// Asks are applied first. If the ask batch fails the bid batch is not
    /// attempted.
    pub fn apply<A, B>(&self, asks: A, bids: B) -> BookResult<()>
    where
        A: IntoIterator,
        A::Item: Into<LevelUpdate>,
        B: IntoIterator,
        B::Item: Into<LevelUpdate>,
    {
        self.asks.apply_batch(asks)?;
        self.bids.apply_batch(bids)
    }

    /// Canonical bytes of the whole book: ask bytes followed by bid bytes
    pub fn checksum_bytes(&self) -> Vec<u8> {
        let mut buf = self.asks.checksum();
        buf.extend_from_slice(&self.bids.checksum());
        buf
    }

    /// Get the spread (ask - bid)
    pub fn spread(&self) -> Option<Decimal> {
        match (self.asks.best(), self.bids.best()) {
            (Some(ask), Some(bid)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Get the mid price ((ask + bid) / 2)
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.asks.best(), self.bids.best()) {
            (Some(ask), Some(bid)) => Some((ask.price + bid.price) / Decimal::TWO),
            _ => None,
        }
    }

    /// Drop all levels on both sides
    pub fn clear(&self) {
        self.asks.clear();
        self.bids.clear();
    }
}
