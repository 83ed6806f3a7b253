use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ict_analysis_engine::config::Config;
use ict_analysis_engine::delivery::{MessageFormatter, TelegramNotifier};
use ict_analysis_engine::engine::{AnalysisEngine, AnalysisOutcome};
use ict_analysis_engine::models::{AnalysisRequest, MarketDataset, Provider, SectionKind};
use ict_analysis_engine::providers::abort_pair;
use ict_analysis_engine::storage::{JsonFileStore, Recommendation, RecommendationStore};

const DEFAULT_SCHOOL: &str = "ICT Smart Money Concepts: determine the higher-timeframe \
draw on liquidity, wait for a liquidity sweep and market structure shift on the entry \
timeframe, then enter on the fair value gap or order block left by the displacement.";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // ict-analysis <SYMBOL> <MARKET_DATA.json> [openai|gemini] [SCHOOL_PROMPT.txt]
    let args: Vec<String> = std::env::args().collect();
    let (Some(symbol), Some(data_path)) = (args.get(1), args.get(2)) else {
        println!("Usage: ict-analysis <SYMBOL> <MARKET_DATA.json> [openai|gemini] [SCHOOL_PROMPT.txt]");
        return Ok(());
    };

    let provider = match args.get(3) {
        Some(p) => Provider::from_str_loose(p).with_context(|| format!("Unknown provider '{}'", p))?,
        None => cfg.default_provider,
    };

    let (school_prompt, methodology) = match args.get(4) {
        Some(path) => (
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
            Path::new(path)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Custom".to_string()),
        ),
        None => (DEFAULT_SCHOOL.to_string(), "ICT Smart Money".to_string()),
    };

    let raw = fs::read_to_string(data_path)
        .with_context(|| format!("Failed to read market data {}", data_path))?;
    let market_data: MarketDataset =
        serde_json::from_str(&raw).context("Failed to parse market data JSON")?;
    if market_data.is_empty() {
        warn!("Market data file {} contains no candles", data_path);
    }

    let engine = AnalysisEngine::from_config(&cfg)?;
    let request = AnalysisRequest {
        symbol: symbol.to_uppercase(),
        market_data,
        school_prompt,
        provider,
    };

    let (abort_handle, abort) = abort_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling analysis");
            abort_handle.abort();
        }
    });

    let outcome = match engine.analyze(&request, &abort).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Analysis failed: {}", e);
            anyhow::bail!("{}", e.user_message());
        }
    };

    print_outcome(&outcome);

    let mut store = JsonFileStore::open(&cfg.history_file);
    let rec = Recommendation {
        id: 0,
        symbol: request.symbol.clone(),
        methodology: methodology.clone(),
        provider_used: outcome.provider_used,
        signal: outcome.signal.clone(),
        analysis: outcome.analysis_text.clone(),
        created_at: Utc::now(),
    };
    match store.save(&cfg.user_id, rec) {
        Ok(id) => info!("Saved recommendation #{} to {}", id, cfg.history_file),
        Err(e) => warn!("Could not save recommendation: {:#}", e),
    }

    if let Some(notifier) = TelegramNotifier::from_config(&cfg)? {
        let message = MessageFormatter::new(cfg.message_timezone).format(
            Some(&outcome.signal),
            &outcome.analysis_text,
            &methodology,
        );
        if let Err(e) = notifier.send(&message).await {
            warn!("Telegram delivery failed: {:#}", e);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &AnalysisOutcome) {
    let s = &outcome.signal;
    let level = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string());

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  {} {} (via {})", s.signal_type.as_str().to_uppercase(), s.pair, outcome.provider_used);
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Entry:      {}", level(s.entry));
    println!("║  Stop Loss:  {}", level(s.stop_loss));
    println!("║  TP1 / TP2:  {} / {}", level(s.take_profit1), level(s.take_profit2));
    println!("║  Prob:       {}", s.probability.map(|p| format!("{}%", p)).unwrap_or_else(|| "-".to_string()));
    if let Some(rr) = s.risk_reward() {
        println!("║  R:R:        1:{:.2}", rr);
    }
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    for section in &outcome.sections {
        match (&section.kind, &section.title) {
            (SectionKind::Header, Some(title)) => println!("== {} ==", title),
            (SectionKind::SubHeader, Some(title)) => println!("-- {} --", title),
            (SectionKind::Topic(tag), Some(title)) => println!("[{}] {}", tag, title),
            _ => {}
        }
        for line in section.body_lines() {
            if section.is_emphasized(line) {
                println!("  >> {}", line);
            } else {
                println!("  {}", line);
            }
        }
        println!();
    }
}
