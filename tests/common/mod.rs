use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ict_analysis_engine::error::ProviderError;
use ict_analysis_engine::models::{Candle, CandleSeries, MarketDataset, Provider, Timeframe};
use ict_analysis_engine::providers::ModelBackend;

/// Create n candles stepping by `step` from `start`, spaced by `interval`.
pub fn make_series(n: usize, start: f64, step: f64, interval: Duration) -> CandleSeries {
    let base = DateTime::parse_from_rfc3339("2024-01-17T07:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start + i as f64 * step;
            Candle {
                timestamp: base + interval * i as i32,
                open,
                high: open + step.abs(),
                low: open - step.abs(),
                close: open + step * 0.5,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

pub fn gold_dataset(candles_per_frame: usize) -> MarketDataset {
    let mut data = MarketDataset::new();
    data.insert(Timeframe::M15, make_series(candles_per_frame, 2300.0, 0.8, Duration::minutes(15)));
    data.insert(Timeframe::H1, make_series(candles_per_frame, 2290.0, 2.0, Duration::hours(1)));
    data.insert(Timeframe::H4, make_series(candles_per_frame, 2270.0, 5.0, Duration::hours(4)));
    data
}

/// Backend that returns a fixed reply or error and records every prompt.
pub struct MockBackend {
    provider: Provider,
    reply: Result<String, fn(Provider) -> ProviderError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn replying(provider: Provider, text: &str) -> Arc<Self> {
        Self::build(provider, Ok(text.to_string()))
    }

    pub fn failing(provider: Provider, make: fn(Provider) -> ProviderError) -> Arc<Self> {
        Self::build(provider, Err(make))
    }

    fn build(provider: Provider, reply: Result<String, fn(Provider) -> ProviderError>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make(self.provider)),
        }
    }
}

pub fn quota_exceeded(provider: Provider) -> ProviderError {
    ProviderError::Api {
        provider,
        status: 429,
        message: "Resource has been exhausted (e.g. check quota).".to_string(),
    }
}

pub fn invalid_key(provider: Provider) -> ProviderError {
    ProviderError::Configuration {
        provider,
        message: "invalid API key".to_string(),
    }
}

pub const GOLD_ANALYSIS: &str = "MARKET STRUCTURE:\n\
Bullish bias on the 4h with higher highs; the 1h just printed a break of structure.\n\
\n\
Institutional order flow swept sell-side liquidity at 2,288 before displacing higher.\n\
\n\
1. Trade Setup:\n\
Buy the 15m fair value gap retest after confirmation.\n\
\n\
Invalidation is a 1h close below the swept low.\n\
\n\
Keep risk at 1% of equity.\n\
**Do not move the stop to break-even before TP1.**\n\
\n\
SIGNAL SUMMARY:\n\
Pair: XAUUSD\n\
Type: Buy\n\
Entry: 2,301.50\n\
Stop Loss: 2,292.00\n\
Take Profit 1: 2,320.50\n\
Take Profit 2: 2,335\n\
Probability: 72%";
