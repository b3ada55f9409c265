//! Depth-bounded order book side for streaming market data
//!
//! This crate keeps one side (bids or asks) of a limit order book consistent
//! while incremental `(price, volume)` updates stream in, and produces the
//! canonical bytes an exchange checksum is computed over.
//!
//! No networking and no async runtime: the feed adapter that decodes wire
//! messages and the hash applied to the checksum bytes live with the caller.
//!
//! # Example
//!
//! ```
//! use levelbook::{OrderBookSide, SideConfig};
//!
//! let bids = OrderBookSide::new(SideConfig::bids().with_depth(10).with_precision(1, 8)).unwrap();
//! bids.apply_batch([("88813.5", "0.00460208"), ("88813.0", "1.5")]).unwrap();
//!
//! assert_eq!(bids.len(), 2);
//! assert_eq!(bids.checksum(), b"888135460208888130150000000".to_vec());
//! ```

pub mod checksum;
pub mod config;
pub mod orderbook;
pub mod side;

// Re-export main types
pub use checksum::{canonical_bytes, format_for_checksum};
pub use config::{
    SideConfig, DEFAULT_DEPTH, DEFAULT_PRICE_PRECISION, DEFAULT_VOLUME_PRECISION, MAX_PRECISION,
};
pub use orderbook::OrderBook;
pub use side::OrderBookSide;
