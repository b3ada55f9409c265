//! Price level types with decimal precision

use crate::error::{BookError, BookResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A single price level in the book
///
/// `Level::default()` is the zero sentinel: zero price and zero volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Price of this level
    #[serde(deserialize_with = "deserialize_decimal")]
    pub price: Decimal,
    /// Resting volume at this price
    #[serde(deserialize_with = "deserialize_decimal", alias = "qty")]
    pub volume: Decimal,
}

impl Level {
    /// Create a new price level
    pub fn new(price: Decimal, volume: Decimal) -> Self {
        Self { price, volume }
    }

    /// Check if this level has zero volume (a deletion, never stored)
    pub fn is_zero(&self) -> bool {
        self.volume.is_zero()
    }
}

/// Parse decimal text exactly
///
/// Accepts plain (`"0.00460208"`) and scientific (`"5e-6"`) notation. Text
/// that carries more digits than a [`Decimal`] can hold is rejected rather
/// than rounded.
pub fn parse_decimal(field: &'static str, text: &str) -> BookResult<Decimal> {
    let trimmed = text.trim();
    let parsed = if trimmed.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str_exact(trimmed)
    };
    parsed.map_err(|e| BookError::format(field, text, e))
}

/// One incremental update as delivered by a feed adapter
///
/// Price and volume are kept as the exact text received so that key derivation
/// never goes through a lossy float. A zero volume deletes the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUpdate")]
pub struct LevelUpdate {
    /// Price text
    pub price: String,
    /// Volume text
    pub volume: String,
}

impl LevelUpdate {
    /// Create an update from price and volume text
    pub fn new(price: impl Into<String>, volume: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            volume: volume.into(),
        }
    }

    /// Parse both fields into exact decimals
    pub fn parse(&self) -> BookResult<(Decimal, Decimal)> {
        let price = parse_decimal("price", &self.price)?;
        let volume = parse_decimal("volume", &self.volume)?;
        Ok((price, volume))
    }
}

impl From<(&str, &str)> for LevelUpdate {
    fn from((price, volume): (&str, &str)) -> Self {
        Self::new(price, volume)
    }
}

impl From<(String, String)> for LevelUpdate {
    fn from((price, volume): (String, String)) -> Self {
        Self::new(price, volume)
    }
}

impl From<(Decimal, Decimal)> for LevelUpdate {
    fn from((price, volume): (Decimal, Decimal)) -> Self {
        Self::new(price.to_string(), volume.to_string())
    }
}

impl From<Level> for LevelUpdate {
    fn from(level: Level) -> Self {
        (level.price, level.volume).into()
    }
}

/// Decimal text taken from either a JSON string or a JSON number
///
/// `serde_json` is built with `arbitrary_precision`, so a number's text is
/// the literal from the input, not an `f64` rendering of it.
struct DecimalText(String);

impl<'de> Deserialize<'de> for DecimalText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(serde_json::Number),
        }

        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => DecimalText(s),
            StringOrNumber::Number(n) => DecimalText(n.to_string()),
        })
    }
}

/// Wire shapes accepted for an update
///
/// Object form `{"price": .., "volume": ..}` (v2 uses `qty`), or the array form
/// `[price, volume, timestamp, ..]` where only the first two entries matter.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawUpdate {
    Object {
        price: DecimalText,
        #[serde(alias = "qty")]
        volume: DecimalText,
    },
    Array(Vec<DecimalText>),
}

impl TryFrom<RawUpdate> for LevelUpdate {
    type Error = String;

    fn try_from(raw: RawUpdate) -> Result<Self, Self::Error> {
        match raw {
            RawUpdate::Object { price, volume } => Ok(Self::new(price.0, volume.0)),
            RawUpdate::Array(fields) => {
                let mut fields = fields.into_iter();
                match (fields.next(), fields.next()) {
                    (Some(price), Some(volume)) => Ok(Self::new(price.0, volume.0)),
                    _ => Err("level update array needs price and volume".to_string()),
                }
            }
        }
    }
}

/// Deserialize a decimal from a JSON string or number without going through f64
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let text = DecimalText::deserialize(deserializer)?;
    parse_decimal("decimal", &text.0).map_err(D::Error::custom)
}
