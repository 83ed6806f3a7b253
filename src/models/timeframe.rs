use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle interval. Ordered from the lowest to the highest timeframe so a
/// `MarketDataset` always serializes its frames in the same order.
/// Deserializes through `from_str_loose`, so "4H" and "60m" keys load too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    /// Accepts both the short form ("4h") and the upper-case form some
    /// data feeds use ("4H", "1D").
    pub fn from_str_loose(s: &str) -> Option<Timeframe> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Some(Timeframe::M1),
            "5m" => Some(Timeframe::M5),
            "15m" => Some(Timeframe::M15),
            "1h" | "60m" => Some(Timeframe::H1),
            "4h" => Some(Timeframe::H4),
            "1d" | "d" => Some(Timeframe::D1),
            "1w" | "w" => Some(Timeframe::W1),
            _ => None,
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Timeframe::from_str_loose(&s).ok_or_else(|| format!("unknown timeframe '{}'", s))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
