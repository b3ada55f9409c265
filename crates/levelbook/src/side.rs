//! Depth-bounded, concurrently readable order book side
//!
//! Updates land in an unordered table keyed by the canonical price text.
//! After each batch the table is sorted once, truncated to the configured depth
//! and the levels past the boundary are evicted from the table as well.
//!
//! A single `RwLock` guards both the table and the sorted view, so readers
//! always see either the state before a batch or the state after it.

use crate::checksum::{canonical_bytes, format_fixed, round_to};
use crate::config::SideConfig;
use levelbook_types::{BookResult, BookSide, Decimal, Level, LevelUpdate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Mutable state behind the lock
#[derive(Debug, Default)]
struct SideState {
    /// Canonical price key -> level, unordered
    levels: HashMap<String, Level>,
    /// Best-first view, at most `depth` entries
    sorted: Vec<Level>,
}

impl SideState {
    /// Insert, replace or delete one level. Does not touch `sorted`.
    fn apply(&mut self, price_precision: u32, price: Decimal, volume: Decimal) {
        let price = round_to(price, price_precision);
        let key = price.to_string();

        if volume.is_zero() {
            self.levels.remove(&key);
        } else {
            self.levels.insert(key, Level::new(price, volume));
        }
    }

    /// Rebuild the sorted view and evict everything past `depth`
    ///
    /// Returns the number of evicted levels.
    fn rebuild(&mut self, config: &SideConfig) -> usize {
        let mut ordered: Vec<Level> = self.levels.values().cloned().collect();
        match config.side {
            BookSide::Ask => ordered.sort_unstable_by(|a, b| a.price.cmp(&b.price)),
            BookSide::Bid => ordered.sort_unstable_by(|a, b| b.price.cmp(&a.price)),
        }

        let evicted = if ordered.len() > config.depth {
            ordered.split_off(config.depth)
        } else {
            Vec::new()
        };
        for level in &evicted {
            self.levels.remove(&level.price.to_string());
        }

        self.sorted = ordered;
        evicted.len()
    }
}

/// One side (bids or asks) of a single pair's order book
///
/// Share it between a feed task and readers through `Arc`; all methods take
/// `&self`.
///
/// # Example
///
/// ```
/// use levelbook::{OrderBookSide, SideConfig};
/// use levelbook_types::LevelUpdate;
/// use rust_decimal_macros::dec;
///
/// let asks = OrderBookSide::new(SideConfig::asks().with_depth(2).with_precision(1, 0)).unwrap();
/// asks.apply_batch([
///     LevelUpdate::new("1.0", "5"),
///     LevelUpdate::new("2.0", "5"),
///     LevelUpdate::new("3.0", "5"),
/// ])
/// .unwrap();
///
/// assert_eq!(asks.len(), 2);
/// assert_eq!(asks.best().unwrap().price, dec!(1.0));
/// assert_eq!(asks.get(dec!(3.0)), None);
/// ```
#[derive(Debug)]
pub struct OrderBookSide {
    config: SideConfig,
    state: RwLock<SideState>,
}

impl OrderBookSide {
    /// Create an empty side after validating `config`
    pub fn new(config: SideConfig) -> BookResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: RwLock::new(SideState::default()),
        })
    }

    /// The immutable configuration
    pub fn config(&self) -> &SideConfig {
        &self.config
    }

    /// Which half of the book this is
    pub fn side(&self) -> BookSide {
        self.config.side
    }

    /// True for the ask side (ascending order)
    pub fn is_ask(&self) -> bool {
        self.config.side.is_ask()
    }

    /// Maximum number of retained levels
    pub fn depth(&self) -> usize {
        self.config.depth
    }

    /// Apply a single update to the level table
    ///
    /// A zero volume removes the level (absent levels are fine). The sorted
    /// view is not rebuilt and depth is not enforced until the next
    /// [`apply_batch`](Self::apply_batch).
    pub fn apply_update(&self, update: &LevelUpdate) -> BookResult<()> {
        let (price, volume) = update.parse().map_err(|e| {
            warn!("Rejected {} update: {}", self.config.side, e);
            e
        })?;
        self.state
            .write()
            .apply(self.config.price_precision, price, volume);
        Ok(())
    }

    /// Apply a batch of updates in order, then resort and evict
    ///
    /// The write lock is held for the whole batch. On the first update that
    /// fails to parse the error is returned immediately: updates before it
    /// stay applied to the level table but the sorted view is NOT rebuilt and
    /// nothing is evicted. Callers should treat that as a signal to
    /// resynchronise from a fresh snapshot.
    pub fn apply_batch<I>(&self, updates: I) -> BookResult<()>
    where
        I: IntoIterator,
        I::Item: Into<LevelUpdate>,
    {
        let mut state = self.state.write();

        let mut applied = 0usize;
        for update in updates {
            let update = update.into();
            let (price, volume) = update.parse().map_err(|e| {
                warn!(
                    "Aborting {} batch after {} updates: {}",
                    self.config.side, applied, e
                );
                e
            })?;
            state.apply(self.config.price_precision, price, volume);
            applied += 1;
        }

        let evicted = state.rebuild(&self.config);
        debug!(
            "Applied {} {} updates, evicted {}, {} visible",
            applied,
            self.config.side,
            evicted,
            state.sorted.len()
        );
        Ok(())
    }

    /// Volume resting at `price`, or `None` if there is no such level
    ///
    /// The lookup goes through the level table using the canonical key, so
    /// `unwrap_or_default()` gives the zero-volume sentinel.
    pub fn get(&self, price: Decimal) -> Option<Decimal> {
        let key = format_fixed(price, self.config.price_precision);
        self.state.read().levels.get(&key).map(|level| level.volume)
    }

    /// Visit visible levels best-first, stopping at the first error
    pub fn range<E, F>(&self, visit: F) -> Result<(), E>
    where
        F: FnMut(&Level) -> Result<(), E>,
    {
        let state = self.state.read();
        state.sorted.iter().try_for_each(visit)
    }

    /// Best level (lowest ask or highest bid), `None` before the first batch
    ///
    /// `unwrap_or_default()` yields the zero price / zero volume sentinel.
    pub fn best(&self) -> Option<Level> {
        self.state.read().sorted.first().cloned()
    }

    /// Copy of the visible levels, best-first
    pub fn levels(&self) -> Vec<Level> {
        self.state.read().sorted.clone()
    }

    /// Number of visible levels
    pub fn len(&self) -> usize {
        self.state.read().sorted.len()
    }

    /// True if no levels are visible
    pub fn is_empty(&self) -> bool {
        self.state.read().sorted.is_empty()
    }

    /// Canonical pre-hash bytes of the visible levels
    ///
    /// See [`checksum`](crate::checksum) for the format.
    pub fn checksum(&self) -> Vec<u8> {
        let state = self.state.read();
        canonical_bytes(
            &state.sorted,
            self.config.price_precision,
            self.config.volume_precision,
        )
    }

    /// Diagnostic text, one `price [ volume ]` line per visible level
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Drop every level, e.g. before loading a fresh snapshot
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.levels.clear();
        state.sorted.clear();
    }
}

/// Fixed-point text when a precision is configured, shortest text otherwise
fn display_decimal(value: Decimal, precision: u32) -> String {
    if precision > 0 {
        format_fixed(value, precision)
    } else {
        value.normalize().to_string()
    }
}

impl fmt::Display for OrderBookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        for level in &state.sorted {
            writeln!(
                f,
                "{} [ {} ]",
                display_decimal(level.price, self.config.price_precision),
                display_decimal(level.volume, self.config.volume_precision)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelbook_types::BookError;
    use rust_decimal_macros::dec;

    fn asks(depth: usize) -> OrderBookSide {
        OrderBookSide::new(SideConfig::asks().with_depth(depth).with_precision(1, 0)).unwrap()
    }

    fn bids(depth: usize) -> OrderBookSide {
        OrderBookSide::new(SideConfig::bids().with_depth(depth).with_precision(1, 0)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = OrderBookSide::new(SideConfig::asks().with_depth(0));
        assert!(matches!(result, Err(BookError::InvalidConfig(_))));
    }

    #[test]
    fn test_ask_order() {
        let book = asks(10);
        book.apply_batch([("100", "1"), ("101", "2"), ("99", "3")]).unwrap();

        let prices: Vec<_> = book.levels().into_iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(99), dec!(100), dec!(101)]);
        assert!(book.is_ask());
    }

    #[test]
    fn test_bid_order() {
        let book = bids(10);
        book.apply_batch([("100", "1"), ("101", "2"), ("99", "3")]).unwrap();

        let prices: Vec<_> = book.levels().into_iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(101), dec!(100), dec!(99)]);
        assert_eq!(book.side(), BookSide::Bid);
    }

    #[test]
    fn test_eviction_past_depth() {
        let book = asks(2);
        book.apply_batch([("1.0", "5"), ("2.0", "5"), ("3.0", "5")]).unwrap();

        assert_eq!(
            book.levels(),
            vec![
                Level::new(dec!(1.0), dec!(5)),
                Level::new(dec!(2.0), dec!(5)),
            ]
        );
        assert_eq!(book.get(dec!(3.0)), None);
        assert_eq!(book.get(dec!(3.0)).unwrap_or_default(), Decimal::ZERO);
    }

    #[test]
    fn test_bid_eviction_drops_lowest() {
        let book = bids(2);
        book.apply_batch([("1.0", "5"), ("2.0", "5"), ("3.0", "5")]).unwrap();

        assert_eq!(book.best().unwrap().price, dec!(3.0));
        assert_eq!(book.get(dec!(1.0)), None);
        assert_eq!(book.get(dec!(2.0)), Some(dec!(5)));
    }

    #[test]
    fn test_zero_volume_removes_level() {
        let book = asks(10);
        book.apply_batch([("100", "1")]).unwrap();
        assert_eq!(book.len(), 1);

        book.apply_batch([("100", "0.00000000")]).unwrap();
        assert_eq!(book.len(), 0);
        assert_eq!(book.get(dec!(100)), None);
    }

    #[test]
    fn test_zero_volume_for_absent_level_is_noop() {
        let book = asks(10);
        book.apply_batch([("100", "1")]).unwrap();
        book.apply_batch([("250", "0")]).unwrap();
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_same_price_twice_keeps_later_volume() {
        let book = asks(10);
        book.apply_batch([("100.0", "1"), ("100.00", "7")]).unwrap();

        assert_eq!(book.len(), 1);
        assert_eq!(book.get(dec!(100)), Some(dec!(7)));
    }

    #[test]
    fn test_price_rounded_to_precision_shares_key() {
        let book = asks(10);
        book.apply_batch([("100.04", "1"), ("100.01", "2")]).unwrap();

        assert_eq!(book.len(), 1);
        let best = book.best().unwrap();
        assert_eq!(best.price.to_string(), "100.0");
        assert_eq!(best.volume, dec!(2));
        assert_eq!(book.get(dec!(99.96)), Some(dec!(2)));
    }

    #[test]
    fn test_volume_kept_at_full_precision() {
        let side = OrderBookSide::new(SideConfig::asks().with_precision(1, 2)).unwrap();
        side.apply_batch([("100.0", "0.123456789")]).unwrap();
        assert_eq!(side.get(dec!(100)), Some(dec!(0.123456789)));
    }

    #[test]
    fn test_best_on_empty_side() {
        let book = bids(10);
        assert_eq!(book.best(), None);
        assert_eq!(book.best().unwrap_or_default(), Level::default());
        assert!(book.is_empty());
    }

    #[test]
    fn test_apply_update_does_not_resort() {
        let book = asks(1);
        book.apply_update(&LevelUpdate::new("100", "1")).unwrap();
        book.apply_update(&LevelUpdate::new("99", "1")).unwrap();

        // Visible only after a batch, but the table already has both
        assert!(book.is_empty());
        assert_eq!(book.get(dec!(100)), Some(dec!(1)));
        assert_eq!(book.get(dec!(99)), Some(dec!(1)));

        book.apply_batch(Vec::<LevelUpdate>::new()).unwrap();
        assert_eq!(book.levels(), vec![Level::new(dec!(99), dec!(1))]);
        assert_eq!(book.get(dec!(100)), None);
    }

    #[test]
    fn test_failed_batch_keeps_partial_updates_unsorted() {
        let book = asks(10);
        book.apply_batch([("100", "1")]).unwrap();

        let result = book.apply_batch([("99", "2"), ("bad", "1"), ("98", "3")]);
        assert!(matches!(
            result,
            Err(BookError::Format { field: "price", .. })
        ));

        // 99 landed in the table, 98 never did, sorted view is stale
        assert_eq!(book.get(dec!(99)), Some(dec!(2)));
        assert_eq!(book.get(dec!(98)), None);
        assert_eq!(book.levels(), vec![Level::new(dec!(100), dec!(1))]);
    }

    #[test]
    fn test_failed_volume_parse() {
        let book = asks(10);
        let err = book.apply_update(&LevelUpdate::new("100", "1,5")).unwrap_err();
        assert!(matches!(err, BookError::Format { field: "volume", .. }));
        assert_eq!(book.get(dec!(100)), None);
    }

    #[test]
    fn test_range_visits_best_first_and_stops() {
        let book = asks(10);
        book.apply_batch([("3", "1"), ("1", "1"), ("2", "1")]).unwrap();

        let mut seen = Vec::new();
        let result = book.range(|level| {
            seen.push(level.price);
            if level.price == dec!(2) {
                Err("stop")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("stop"));
        assert_eq!(seen, vec![dec!(1), dec!(2)]);
    }

    #[test]
    fn test_range_completes() {
        let book = bids(10);
        book.apply_batch([("3", "1"), ("1", "1")]).unwrap();

        let mut count = 0;
        let result: Result<(), ()> = book.range(|_| {
            count += 1;
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_checksum_bytes() {
        let side = OrderBookSide::new(SideConfig::asks().with_precision(5, 8)).unwrap();
        side.apply_batch([("0.05005", "0.00000500"), ("0.05010", "0.00000500")]).unwrap();

        assert_eq!(side.checksum(), b"50055005010500".to_vec());
    }

    #[test]
    fn test_checksum_price_canonicalization() {
        let side = OrderBookSide::new(SideConfig::asks().with_precision(5, 0)).unwrap();
        side.apply_batch([("0.00500", "3")]).unwrap();

        let bytes = String::from_utf8(side.checksum()).unwrap();
        assert_eq!(bytes, "5003");
        assert!(!bytes.contains("000500"));
    }

    #[test]
    fn test_reapplying_batch_is_idempotent() {
        let config = SideConfig::bids().with_depth(3).with_precision(2, 4);
        let side = OrderBookSide::new(config).unwrap();
        let batch = [("10.00", "1"), ("10.50", "2"), ("9.75", "3"), ("11.25", "4")];

        side.apply_batch(batch).unwrap();
        let levels = side.levels();
        let checksum = side.checksum();

        side.apply_batch(batch).unwrap();
        assert_eq!(side.levels(), levels);
        assert_eq!(side.checksum(), checksum);
    }

    #[test]
    fn test_render_fixed_precision() {
        let side = OrderBookSide::new(SideConfig::asks().with_precision(2, 3)).unwrap();
        side.apply_batch([("101.5", "2"), ("100", "0.25")]).unwrap();

        assert_eq!(side.render(), "100.00 [ 0.250 ]\n101.50 [ 2.000 ]\n");
    }

    #[test]
    fn test_render_natural_when_precision_zero() {
        let side = OrderBookSide::new(SideConfig::bids().with_precision(0, 0)).unwrap();
        side.apply_batch([("100", "0.2500"), ("99", "3")]).unwrap();

        assert_eq!(side.render(), "100 [ 0.25 ]\n99 [ 3 ]\n");
        assert_eq!(side.to_string(), side.render());
    }

    #[test]
    fn test_clear() {
        let book = asks(10);
        book.apply_batch([("1", "1"), ("2", "1")]).unwrap();
        book.clear();

        assert!(book.is_empty());
        assert_eq!(book.get(dec!(1)), None);
        assert!(book.checksum().is_empty());
    }
}
