use crate::models::MarketDataset;

/// Label the extractor anchors on. Must stay in sync with the footer the
/// preamble asks for.
pub const SUMMARY_LABEL: &str = "SIGNAL SUMMARY";

const SYSTEM_PREAMBLE: &str = "\
You are a senior institutional trading analyst. You study price action across \
every supplied timeframe before giving a view, and you never invent data that \
is not in the candles.

Rules:
- ATR is the ONLY indicator you may use. Use it for stop-loss placement and as \
a volatility filter; do not reference RSI, MACD, moving averages or any other \
indicator.
- Never recommend an entry without confirmation: wait for a market structure \
shift or displacement on the entry timeframe.
- Reject any zone (order block, fair value gap, breaker) that price has already \
mitigated.
- If conditions are not met, say so and recommend HOLD.

Finish your answer with this block, using exactly these field names, one per \
line, numbers only where a price or percentage is asked for:

SIGNAL SUMMARY:
Pair: <symbol>
Type: <BUY | SELL | HOLD>
Entry: <price>
Stop Loss: <price>
Take Profit 1: <price>
Take Profit 2: <price>
Probability: <0-100>%";

/// Builds the model prompt. Pure: identical inputs give byte-identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, school_prompt: &str, symbol: &str, market_data: &MarketDataset) -> String {
        self.build_raw(school_prompt, symbol, market_data)
    }

    /// Same layout as `build` for payloads that are not a `MarketDataset`,
    /// e.g. a raw JSON document read from disk.
    pub fn build_raw(
        &self,
        school_prompt: impl std::fmt::Display,
        symbol: impl std::fmt::Display,
        market_data: impl std::fmt::Display,
    ) -> String {
        format!(
            "{}\n\nMETHODOLOGY:\n{}\n\nSYMBOL: {}\n\nMARKET DATA:\n{}\n",
            SYSTEM_PREAMBLE, school_prompt, symbol, market_data
        )
    }
}
