use std::collections::BTreeMap;

use crate::analysis::prompt::SUMMARY_LABEL;
use crate::models::{SignalType, TradingSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pair,
    Type,
    Entry,
    StopLoss,
    TakeProfit1,
    TakeProfit2,
    Probability,
}

/// Normalized label → field. Labels are compared after lower-casing,
/// stripping markdown and collapsing whitespace.
const FIELD_ALIASES: &[(&str, Field)] = &[
    ("pair", Field::Pair),
    ("symbol", Field::Pair),
    ("instrument", Field::Pair),
    ("type", Field::Type),
    ("signal type", Field::Type),
    ("direction", Field::Type),
    ("action", Field::Type),
    ("entry", Field::Entry),
    ("entry price", Field::Entry),
    ("stop loss", Field::StopLoss),
    ("stoploss", Field::StopLoss),
    ("sl", Field::StopLoss),
    ("take profit 1", Field::TakeProfit1),
    ("take profit1", Field::TakeProfit1),
    ("take profit", Field::TakeProfit1),
    ("tp1", Field::TakeProfit1),
    ("tp 1", Field::TakeProfit1),
    ("take profit 2", Field::TakeProfit2),
    ("take profit2", Field::TakeProfit2),
    ("tp2", Field::TakeProfit2),
    ("tp 2", Field::TakeProfit2),
    ("probability", Field::Probability),
    ("confidence", Field::Probability),
];

/// Keywords recognised in a `Type:` value. The earliest one in the value wins.
const TYPE_KEYWORDS: &[(&str, SignalType)] = &[
    ("buy", SignalType::Buy),
    ("long", SignalType::Buy),
    ("bullish", SignalType::Buy),
    ("sell", SignalType::Sell),
    ("short", SignalType::Sell),
    ("bearish", SignalType::Sell),
    ("hold", SignalType::Hold),
    ("neutral", SignalType::Hold),
    ("wait", SignalType::Hold),
    ("no trade", SignalType::Hold),
];

/// Turns free-form model output into a `TradingSignal`.
///
/// Total over its input: any string, including empty or garbage text,
/// yields a well-formed signal. When the summary block is missing the
/// direction is guessed from keywords and every level is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str, symbol: &str) -> TradingSignal {
        match summary_region(text) {
            Some(region) => from_fields(&scan_labels(region), symbol),
            None => from_keywords(text, symbol),
        }
    }
}

/// Collects `label: value` lines into a map keyed by normalized label.
/// The first occurrence of a label wins.
pub fn scan_labels(region: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for line in region.lines() {
        let line = line.trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '*' | '•' | '#' | '>')
        });
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };

        let label = normalize_label(label);
        if label.is_empty() {
            continue;
        }

        let value = value.trim().trim_matches(|c| c == '*' || c == '_').trim();
        fields.entry(label).or_insert_with(|| value.to_string());
    }

    fields
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .map(|c| if c == '-' { ' ' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Region following the first `SIGNAL SUMMARY:` label, up to the next
/// blank line. Blank or markup-only lines directly after the label are
/// skipped.
fn summary_region(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let label = SUMMARY_LABEL.to_ascii_lowercase();

    // ASCII lower-casing keeps byte offsets, so indices from `lower` are
    // valid char boundaries in `text`.
    let start = lower.match_indices(&label).find_map(|(idx, _)| {
        let after = idx + label.len();
        let rest = &lower[after..];
        let skipped = rest.len() - rest.trim_start_matches([' ', '\t', '*', '_', '#']).len();
        rest[skipped..]
            .starts_with(':')
            .then_some(after + skipped + 1)
    })?;

    let rest = &text[start..];
    let mut end = rest.len();
    let mut offset = 0;
    let mut seen_content = false;

    for line in rest.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        if blank && seen_content {
            end = offset;
            break;
        }
        seen_content |= line.chars().any(char::is_alphanumeric);
        offset += line.len();
    }

    Some(&rest[..end])
}

fn from_fields(fields: &BTreeMap<String, String>, symbol: &str) -> TradingSignal {
    let mut signal = TradingSignal::hold(symbol);

    // Aliases are visited in table order, so the canonical label takes
    // precedence over its shorthand when both are present.
    let mut filled: Vec<Field> = Vec::new();
    for (alias, field) in FIELD_ALIASES {
        if filled.contains(field) {
            continue;
        }
        let Some(value) = fields.get(*alias) else {
            continue;
        };

        let assigned = match field {
            Field::Pair => {
                let pair = clean_pair(value);
                let found = !pair.is_empty();
                if found {
                    signal.pair = pair;
                }
                found
            }
            Field::Type => {
                signal.signal_type = normalize_type(value);
                true
            }
            Field::Entry => set(&mut signal.entry, value),
            Field::StopLoss => set(&mut signal.stop_loss, value),
            Field::TakeProfit1 => set(&mut signal.take_profit1, value),
            Field::TakeProfit2 => set(&mut signal.take_profit2, value),
            Field::Probability => set(&mut signal.probability, value),
        };
        if assigned {
            filled.push(*field);
        }
    }

    signal
}

fn set(slot: &mut Option<f64>, value: &str) -> bool {
    *slot = parse_number(value);
    slot.is_some()
}

fn clean_pair(value: &str) -> String {
    value
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

fn normalize_type(value: &str) -> SignalType {
    let lower = value.to_ascii_lowercase();
    TYPE_KEYWORDS
        .iter()
        .filter_map(|(kw, ty)| lower.find(kw).map(|pos| (pos, *ty)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, ty)| ty)
        .unwrap_or(SignalType::Hold)
}

/// No summary block: guess the direction from the whole text. Buy wins
/// when both directions are mentioned.
fn from_keywords(text: &str, symbol: &str) -> TradingSignal {
    let lower = text.to_ascii_lowercase();
    let mut signal = TradingSignal::hold(symbol);

    signal.signal_type = if lower.contains("buy") || lower.contains("long") {
        SignalType::Buy
    } else if lower.contains("sell") || lower.contains("short") {
        SignalType::Sell
    } else {
        SignalType::Hold
    };

    signal
}

/// First numeric token in `value`. Thousands separators are dropped and
/// anything around the number (currency symbols, `%`, pips) is ignored.
pub fn parse_number(value: &str) -> Option<f64> {
    let chars: Vec<char> = value.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;
    let next_is_digit = |i: usize| chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());

    // ".5" reads as 0.5, not 5
    let leading_dot = start > 0 && chars[start - 1] == '.';
    let mut token = String::from(if leading_dot { "0." } else { "" });
    let mut seen_dot = leading_dot;
    for (i, &c) in chars.iter().enumerate().skip(start) {
        if c.is_ascii_digit() {
            token.push(c);
        } else if c == ',' && !seen_dot && next_is_digit(i) {
            continue;
        } else if c == '.' && !seen_dot && next_is_digit(i) {
            seen_dot = true;
            token.push('.');
        } else {
            break;
        }
    }

    token.parse::<f64>().ok().filter(|n| n.is_finite())
}
