use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Wraps Vec<Candle>, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Keep only the most recent `n` candles.
    pub fn tail(&self, n: usize) -> CandleSeries {
        let start = self.candles.len().saturating_sub(n);
        CandleSeries::new(self.candles[start..].to_vec())
    }
}

/// Multi-timeframe candle payload handed to the model. The core never
/// interprets it beyond serializing it into the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MarketDataset {
    frames: BTreeMap<Timeframe, CandleSeries>,
}

impl MarketDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tf: Timeframe, series: CandleSeries) {
        self.frames.insert(tf, series);
    }

    pub fn get(&self, tf: Timeframe) -> Option<&CandleSeries> {
        self.frames.get(&tf)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.values().all(CandleSeries::is_empty)
    }

    /// Cap every frame to its most recent `limit` candles so the prompt
    /// stays within the model's context window.
    pub fn truncated(&self, limit: usize) -> MarketDataset {
        MarketDataset {
            frames: self
                .frames
                .iter()
                .map(|(tf, series)| (*tf, series.tail(limit)))
                .collect(),
        }
    }

    /// Compact description for logs, e.g. "15m:120 1h:96 4h:60".
    pub fn describe(&self) -> String {
        self.frames
            .iter()
            .map(|(tf, series)| format!("{}:{}", tf, series.len()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Deterministic JSON rendering. Frames are ordered by timeframe and
    /// non-finite prices become `null`.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for MarketDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prompt_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_candles, sample_dataset};

    #[test]
    fn tail_keeps_most_recent() {
        let series = make_candles(&[
            (1.0, 2.0, 0.5, 1.5),
            (1.5, 2.5, 1.0, 2.0),
            (2.0, 3.0, 1.5, 2.5),
        ]);
        let tail = series.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.candles.last().unwrap().close, 2.5);
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn dataset_serializes_frames_in_timeframe_order() {
        let data = sample_dataset();
        let json = data.to_prompt_json();
        let m15 = json.find("\"15m\"").unwrap();
        let h1 = json.find("\"1h\"").unwrap();
        let h4 = json.find("\"4h\"").unwrap();
        assert!(m15 < h1 && h1 < h4);
        assert_eq!(json, data.to_string());
    }

    #[test]
    fn dataset_roundtrips_through_json() {
        let data = sample_dataset();
        let parsed: MarketDataset = serde_json::from_str(&data.to_prompt_json()).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn truncated_caps_every_frame() {
        let data = sample_dataset().truncated(3);
        assert_eq!(data.get(Timeframe::H1).unwrap().len(), 3);
        assert_eq!(data.get(Timeframe::H4).unwrap().len(), 3);
        assert!(data.describe().contains("1h:3"));
    }

    #[test]
    fn empty_dataset_reports_empty() {
        let data = MarketDataset::new();
        assert!(data.is_empty());
        assert_eq!(data.to_prompt_json(), "{}");
    }
}
