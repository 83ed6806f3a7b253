use anyhow::{Context, Result};
use std::io::Read;
use tracing_subscriber::{fmt, EnvFilter};

use ict_analysis_engine::analysis::{SectionClassifier, SignalExtractor};
use ict_analysis_engine::delivery::MessageFormatter;

/// Offline view of a saved analysis: the extracted signal and display
/// sections as JSON, or the outbound message with `--message`.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // parse_analysis <FILE|-> <SYMBOL> [--message]
    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("-");
    let symbol = args.get(2).map(String::as_str).unwrap_or("UNKNOWN");
    let as_message = args.iter().any(|a| a == "--message");

    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read analysis from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    };

    let signal = SignalExtractor::new().extract(&text, symbol);

    if as_message {
        println!(
            "{}",
            MessageFormatter::default().format(Some(&signal), &text, "Saved analysis")
        );
        return Ok(());
    }

    let sections = SectionClassifier::new().classify(&text);
    let out = serde_json::json!({
        "signal": signal,
        "sections": sections,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}
