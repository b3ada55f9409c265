//! Shared value types for the levelbook crates
//!
//! This crate has no locking and no logging. It only describes the data that
//! flows between a feed adapter and an order book side.
//!
//! # Key Types
//!
//! - [`Level`] - A price level with exact decimal price and volume
//! - [`LevelUpdate`] - Raw `(price, volume)` text as received from a feed
//! - [`BookSide`] - Bid or ask half of a book
//! - [`BookError`] - Error types

pub mod enums;
pub mod error;
pub mod level;

pub use enums::*;
pub use error::*;
pub use level::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
