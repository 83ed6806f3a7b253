use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::models::{SignalType, TradingSignal};

/// Hard cap on the analysis body, in characters.
pub const MAX_ANALYSIS_CHARS: usize = 3000;

pub const RISK_DISCLAIMER: &str = "⚠️ Educational analysis generated by an AI model, not financial advice. \
Trading involves substantial risk of loss. Always do your own research and manage your risk.";

/// Renders a signal and its analysis as one outbound chat message.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    timezone: Tz,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl MessageFormatter {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn format(&self, signal: Option<&TradingSignal>, analysis: &str, methodology: &str) -> String {
        self.format_at(signal, analysis, methodology, Utc::now())
    }

    pub fn format_at(
        &self,
        signal: Option<&TradingSignal>,
        analysis: &str,
        methodology: &str,
        generated_at: DateTime<Utc>,
    ) -> String {
        RenderedMessage {
            signal,
            analysis,
            methodology,
            generated_at: self.timezone.from_utc_datetime(&generated_at.naive_utc()),
        }
        .to_string()
    }
}

struct RenderedMessage<'a> {
    signal: Option<&'a TradingSignal>,
    analysis: &'a str,
    methodology: &'a str,
    generated_at: DateTime<Tz>,
}

impl fmt::Display for RenderedMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signal {
            Some(s) => write_signal_header(f, s)?,
            None => writeln!(f, "📊 ANALYSIS")?,
        }

        writeln!(f)?;
        writeln!(f, "📚 Methodology: {}", self.methodology)?;
        writeln!(f, "🕒 Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M %Z"))?;
        writeln!(f)?;
        f.write_str(truncate_analysis(self.analysis))?;
        writeln!(f)?;
        writeln!(f)?;
        f.write_str(RISK_DISCLAIMER)
    }
}

fn write_signal_header(f: &mut fmt::Formatter<'_>, s: &TradingSignal) -> fmt::Result {
    let indicator = match s.signal_type {
        SignalType::Buy => "🟢 BUY",
        SignalType::Sell => "🔴 SELL",
        SignalType::Hold => "⚪ HOLD",
    };
    writeln!(f, "{} {}", indicator, s.pair)?;

    let levels = [
        ("Entry", s.entry),
        ("Stop Loss", s.stop_loss),
        ("Take Profit 1", s.take_profit1),
        ("Take Profit 2", s.take_profit2),
    ];
    for (label, value) in levels {
        if let Some(v) = value {
            writeln!(f, "{}: {}", label, v)?;
        }
    }
    if let Some(p) = s.probability {
        writeln!(f, "Probability: {}%", p)?;
    }
    if let Some(rr) = s.risk_reward() {
        writeln!(f, "Risk:Reward: 1:{:.2}", rr)?;
    }
    Ok(())
}

/// First `MAX_ANALYSIS_CHARS` characters of `analysis`, cut on a char
/// boundary with no regard for markdown.
pub fn truncate_analysis(analysis: &str) -> &str {
    match analysis.char_indices().nth(MAX_ANALYSIS_CHARS) {
        Some((idx, _)) => &analysis[..idx],
        None => analysis,
    }
}
