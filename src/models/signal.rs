use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "buy",
            SignalType::Sell => "sell",
            SignalType::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed trade parameters pulled out of a free-form analysis. Any level the
/// text did not state is `None`; no field is ever NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSignal {
    pub pair: String,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub entry: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit1: Option<f64>,
    pub take_profit2: Option<f64>,
    pub probability: Option<f64>,
}

impl TradingSignal {
    /// A hold signal with no levels.
    pub fn hold(pair: &str) -> Self {
        Self {
            pair: pair.to_string(),
            signal_type: SignalType::Hold,
            entry: None,
            stop_loss: None,
            take_profit1: None,
            take_profit2: None,
            probability: None,
        }
    }

    pub fn has_levels(&self) -> bool {
        self.entry.is_some()
            || self.stop_loss.is_some()
            || self.take_profit1.is_some()
            || self.take_profit2.is_some()
    }

    /// reward / risk against the first target. `None` unless entry, stop and
    /// TP1 are all present and the stop sits away from the entry.
    pub fn risk_reward(&self) -> Option<f64> {
        let (entry, stop, tp1) = (self.entry?, self.stop_loss?, self.take_profit1?);
        let risk = (entry - stop).abs();
        let reward = (tp1 - entry).abs();
        if risk == 0.0 {
            return None;
        }
        Some(reward / risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_has_no_levels() {
        let s = TradingSignal::hold("XAUUSD");
        assert_eq!(s.signal_type, SignalType::Hold);
        assert!(!s.has_levels());
        assert_eq!(s.risk_reward(), None);
    }

    #[test]
    fn risk_reward_uses_absolute_distances() {
        let mut s = TradingSignal::hold("EURUSD");
        s.signal_type = SignalType::Sell;
        s.entry = Some(1.1000);
        s.stop_loss = Some(1.1020);
        s.take_profit1 = Some(1.0950);
        let rr = s.risk_reward().unwrap();
        assert!((rr - 2.5).abs() < 1e-9, "rr = {}", rr);
    }

    #[test]
    fn risk_reward_skips_zero_risk() {
        let mut s = TradingSignal::hold("EURUSD");
        s.entry = Some(1.1);
        s.stop_loss = Some(1.1);
        s.take_profit1 = Some(1.2);
        assert_eq!(s.risk_reward(), None);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let s = TradingSignal::hold("BTCUSD");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "hold");
        assert!(json["stopLoss"].is_null());
        assert!(json.get("takeProfit1").is_some());
    }
}
