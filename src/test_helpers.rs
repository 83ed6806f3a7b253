use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::config::{BackendConfig, Config};
use crate::models::{Candle, CandleSeries, MarketDataset, Provider, Timeframe};

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let base = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect();

    CandleSeries::new(candles)
}

/// Create n rising candles starting from `start` price, spaced by `interval`.
pub fn make_trend(n: usize, start: f64, step: f64, interval: Duration) -> CandleSeries {
    let base = DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start + i as f64 * step;
            let close = open + step * 0.8;
            Candle {
                timestamp: base + interval * i as i32,
                open,
                high: close + step * 0.2,
                low: open - step * 0.1,
                close,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// EURUSD-like data on 15m, 1h and 4h.
pub fn sample_dataset() -> MarketDataset {
    let mut data = MarketDataset::new();
    data.insert(Timeframe::M15, make_trend(12, 1.0800, 0.0002, Duration::minutes(15)));
    data.insert(Timeframe::H1, make_trend(8, 1.0780, 0.0005, Duration::hours(1)));
    data.insert(Timeframe::H4, make_trend(6, 1.0700, 0.0015, Duration::hours(4)));
    data
}

/// A Config for tests: fake keys, no delivery, temp history file.
pub fn default_test_config() -> Config {
    Config {
        openai: BackendConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-test".to_string(),
            base_url: "http://127.0.0.1:9/v1".to_string(),
        },
        gemini: BackendConfig {
            api_key: "gm-test".to_string(),
            model: "gemini-test".to_string(),
            base_url: "http://127.0.0.1:9/v1beta".to_string(),
        },
        default_provider: Provider::OpenAi,
        request_timeout_secs: 30,
        temperature: 0.7,
        max_tokens: 4096,
        candle_limit: 100,
        telegram_bot_token: String::new(),
        telegram_chat_id: String::new(),
        message_timezone: Tz::UTC,
        history_file: std::env::temp_dir()
            .join(format!("ict_analysis_test_{}.json", std::process::id()))
            .to_string_lossy()
            .to_string(),
        user_id: "tester".to_string(),
        log_level: "debug".to_string(),
    }
}

pub const WELL_FORMED_ANALYSIS: &str = "MARKET ANALYSIS:\n\
EURUSD is trading in a discount after a sweep of Asian lows.\n\
\n\
1. Trade Setup:\n\
Wait for displacement above 1.0860 before entering.\n\
\n\
SIGNAL SUMMARY:\n\
Pair: EURUSD\n\
Type: BUY\n\
Entry: 1.0850\n\
Stop Loss: 1.0820\n\
Take Profit 1: 1.0900\n\
Probability: 85%\n\
\n\
**Risk note:** size positions by ATR.";
