//! Open perpetual positions as reported by the exchange.
//!
//! Numeric fields are kept in the decimal text form the exchange sends
//! them in and parsed on access. A field that fails to parse reads as
//! zero; a malformed number must never abort a poll cycle.

use serde::{Deserialize, Deserializer, Serialize};

/// Parse decimal text, degrading to zero on failure.
#[must_use]
pub fn parse_decimal(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Accept `null` wherever the exchange sends numeric text.
pub(crate) fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Leverage mode and multiplier of a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leverage {
    /// Margin mode, e.g. `cross` or `isolated`.
    #[serde(default)]
    pub kind: String,
    /// Leverage multiplier.
    #[serde(default)]
    pub value: u32,
}

/// Funding paid on a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeFunding {
    #[serde(default, deserialize_with = "nullable_text")]
    pub all_time: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub since_open: String,
}

/// One open exposure in one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument symbol, unique within a snapshot.
    pub symbol: String,
    /// Signed size; negative means short.
    #[serde(default, deserialize_with = "nullable_text")]
    pub size: String,
    #[serde(default)]
    pub leverage: Leverage,
    #[serde(default, deserialize_with = "nullable_text")]
    pub entry_price: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub position_value: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub unrealized_pnl: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub return_on_equity: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub liquidation_price: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub margin_used: String,
    #[serde(default)]
    pub cumulative_funding: CumulativeFunding,
}

/// Direction of a position, derived from the sign of its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl Position {
    /// Create a position with only a symbol and size set.
    pub fn new(symbol: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            size: size.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        parse_decimal(&self.size)
    }

    #[must_use]
    pub fn side(&self) -> Side {
        if self.size() < 0.0 {
            Side::Short
        } else {
            Side::Long
        }
    }

    #[must_use]
    pub fn entry_price(&self) -> f64 {
        parse_decimal(&self.entry_price)
    }

    #[must_use]
    pub fn position_value(&self) -> f64 {
        parse_decimal(&self.position_value)
    }

    #[must_use]
    pub fn unrealized_pnl(&self) -> f64 {
        parse_decimal(&self.unrealized_pnl)
    }

    /// Return on equity as a fraction (0.1 = 10%).
    #[must_use]
    pub fn return_on_equity(&self) -> f64 {
        parse_decimal(&self.return_on_equity)
    }

    #[must_use]
    pub fn liquidation_price(&self) -> f64 {
        parse_decimal(&self.liquidation_price)
    }

    #[must_use]
    pub fn margin_used(&self) -> f64 {
        parse_decimal(&self.margin_used)
    }

    #[must_use]
    pub fn funding_all_time(&self) -> f64 {
        parse_decimal(&self.cumulative_funding.all_time)
    }

    #[must_use]
    pub fn funding_since_open(&self) -> f64 {
        parse_decimal(&self.cumulative_funding.since_open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_degrades_to_zero() {
        assert_eq!(parse_decimal("1.5"), 1.5);
        assert_eq!(parse_decimal(" -0.25 "), -0.25);
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("1,000"), 0.0);
    }

    #[test]
    fn side_follows_sign() {
        assert_eq!(Position::new("BTC", "0.5").side(), Side::Long);
        assert_eq!(Position::new("BTC", "-0.5").side(), Side::Short);
        assert_eq!(Position::new("BTC", "0").side(), Side::Long);
        assert_eq!(Position::new("BTC", "garbage").side(), Side::Long);
    }

    #[test]
    fn malformed_fields_read_as_zero() {
        let position = Position {
            symbol: "ETH".into(),
            size: "2".into(),
            entry_price: "n/a".into(),
            liquidation_price: String::new(),
            ..Position::default()
        };
        assert_eq!(position.entry_price(), 0.0);
        assert_eq!(position.liquidation_price(), 0.0);
        assert_eq!(position.size(), 2.0);
    }

    #[test]
    fn null_text_fields_deserialize_as_empty() {
        let json = r#"{"symbol":"BTC","size":"1","liquidation_price":null}"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.liquidation_price, "");
        assert_eq!(position.liquidation_price(), 0.0);
    }
}
