use crate::models::{DisplaySection, SectionKind, TopicTag};

/// Labels that open a header section when they start the first line of a
/// paragraph (any case) and are followed by a colon.
pub const HEADER_KEYWORDS: &[&str] = &[
    "SIGNAL SUMMARY",
    "MARKET ANALYSIS",
    "MARKET STRUCTURE",
    "ICT SMART MONEY",
    "SMART MONEY LOGIC",
    "TECHNICAL ANALYSIS",
    "RISK MANAGEMENT",
    "ENTRY STRATEGY",
    "RECOMMENDATION",
    "TRADE SETUP",
    "JUSTIFICATION",
    "INVALIDATION",
    "KEY LEVELS",
    "CONCLUSION",
];

const SMART_MONEY_TERMS: &[&str] = &[
    "ict",
    "smart money",
    "order block",
    "order blocks",
    "fair value gap",
    "fvg",
    "breaker block",
    "liquidity sweep",
    "liquidity grab",
    "institutional",
    "order flow",
    "displacement",
    "optimal trade entry",
    "ote",
];

const INVALIDATION_TERMS: &[&str] = &[
    "invalidation",
    "invalidated",
    "invalidate",
    "invalidates",
    "no trade",
    "do not trade",
    "do not enter",
    "stand aside",
    "stay flat",
    "avoid trading",
];

const STRUCTURE_TERMS: &[&str] = &[
    "market structure",
    "bias",
    "bullish",
    "bearish",
    "trend",
    "uptrend",
    "downtrend",
    "higher high",
    "higher highs",
    "lower low",
    "lower lows",
    "break of structure",
    "bos",
    "choch",
    "change of character",
];

const SUBHEADER_MAX_LEN: usize = 80;

pub const EMPTY_ANALYSIS_PLACEHOLDER: &str = "No analysis available.";

/// One blank-line-delimited block of the analysis.
struct Paragraph<'a> {
    text: &'a str,
    first_line: &'a str,
    rest: &'a str,
    /// Lower-cased words of the first line padded with spaces, for
    /// whole-word topic lookups.
    lead_words: String,
}

impl<'a> Paragraph<'a> {
    fn new(text: &'a str) -> Self {
        let (first_line, rest) = text.split_once('\n').unwrap_or((text, ""));

        let normalized: String = first_line
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
            .collect();
        let lead_words =
            format!(" {} ", normalized.split_whitespace().collect::<Vec<_>>().join(" "));

        Self {
            text,
            first_line: first_line.trim(),
            rest: rest.trim(),
            lead_words,
        }
    }

    fn mentions_any(&self, terms: &[&str]) -> bool {
        terms
            .iter()
            .any(|t| self.lead_words.contains(&format!(" {} ", t)))
    }
}

/// A classification step: the first rule whose `matches` accepts a
/// paragraph builds its section. Nothing else is consulted.
struct Rule {
    name: &'static str,
    matches: fn(&Paragraph) -> bool,
    build: fn(&Paragraph) -> DisplaySection,
}

const RULES: &[Rule] = &[
    Rule {
        name: "header",
        matches: |p| header_match(p.first_line).is_some(),
        build: build_header,
    },
    Rule {
        name: "sub_header",
        matches: |p| sub_header_title(p.first_line).is_some(),
        build: build_sub_header,
    },
    Rule {
        name: "smart_money",
        matches: |p| p.mentions_any(SMART_MONEY_TERMS),
        build: |p| build_topic(p, TopicTag::SmartMoney),
    },
    Rule {
        name: "invalidation",
        matches: |p| p.mentions_any(INVALIDATION_TERMS),
        build: |p| build_topic(p, TopicTag::Invalidation),
    },
    Rule {
        name: "market_structure",
        matches: |p| p.mentions_any(STRUCTURE_TERMS),
        build: |p| build_topic(p, TopicTag::MarketStructure),
    },
];

/// Splits an analysis into styled display sections, one per paragraph, in
/// source order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionClassifier;

impl SectionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Vec<DisplaySection> {
        let sections: Vec<DisplaySection> = paragraphs(text)
            .into_iter()
            .map(|raw| classify_paragraph(&Paragraph::new(raw)))
            .collect();

        if sections.is_empty() {
            return vec![placeholder()];
        }
        sections
    }

    /// Name of the rule that would claim `paragraph`, or "plain".
    pub fn rule_for(&self, paragraph: &str) -> &'static str {
        let p = Paragraph::new(paragraph.trim());
        RULES
            .iter()
            .find(|rule| (rule.matches)(&p))
            .map(|rule| rule.name)
            .unwrap_or("plain")
    }
}

fn classify_paragraph(p: &Paragraph) -> DisplaySection {
    match RULES.iter().find(|rule| (rule.matches)(p)) {
        Some(rule) => (rule.build)(p),
        None => build_plain(p),
    }
}

/// Blocks separated by one or more whitespace-only lines, trimmed.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                out.push(text[s..end].trim());
            }
        } else {
            if start.is_none() {
                start = Some(offset);
            }
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        out.push(text[s..end].trim());
    }

    out
}

fn strip_markup(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['#', '*', '_', ' '])
        .trim_end_matches(['*', '_', ' '])
}

/// Returns the matched keyword and the text after its colon.
fn header_match(first_line: &str) -> Option<(&'static str, &str)> {
    let line = strip_markup(first_line);
    let upper = line.to_ascii_uppercase();

    HEADER_KEYWORDS.iter().find_map(|kw| {
        if !upper.starts_with(kw) {
            return None;
        }
        let rest = &line[kw.len()..];
        let after = rest.trim_start_matches([' ', '*', '_']);
        after.strip_prefix(':').map(|tail| (*kw, tail))
    })
}

/// Title of a numbered (`1.`, `2)`) or bulleted (`-`, `*`, `•`) line ending
/// in a colon, marker included. Bullets are looked for before emphasis is
/// stripped, so `* Entry Plan:` and `**3. Entry Plan:**` both qualify.
fn sub_header_title(first_line: &str) -> Option<String> {
    let raw = first_line.trim();
    if strip_markup(raw).chars().count() > SUBHEADER_MAX_LEN {
        return None;
    }

    let (marker, rest) = match raw.strip_prefix(['-', '*', '•']) {
        Some(rest) if rest.starts_with(char::is_whitespace) => (&raw[..raw.len() - rest.len()], rest),
        _ => {
            let line = strip_markup(raw);
            let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return None;
            }
            match line[digits..].chars().next() {
                Some('.') | Some(')') => (&line[..digits + 1], &line[digits + 1..]),
                _ => return None,
            }
        }
    };

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = strip_markup(rest).strip_suffix(':')?.trim_end_matches(['*', '_']).trim();
    if title.is_empty() {
        return None;
    }
    Some(format!("{} {}", marker, title))
}

fn build_header(p: &Paragraph) -> DisplaySection {
    let (keyword, tail) = header_match(p.first_line).unwrap_or(("", ""));
    let tail = tail.trim().trim_matches(['*', '_']).trim();

    let body = match (tail.is_empty(), p.rest.is_empty()) {
        (true, _) => p.rest.to_string(),
        (false, true) => tail.to_string(),
        (false, false) => format!("{}\n{}", tail, p.rest),
    };

    DisplaySection {
        kind: SectionKind::Header,
        title: Some(keyword.to_string()),
        body,
        emphasized_lines: Vec::new(),
    }
}

fn build_sub_header(p: &Paragraph) -> DisplaySection {
    DisplaySection {
        kind: SectionKind::SubHeader,
        title: sub_header_title(p.first_line),
        body: p.rest.to_string(),
        emphasized_lines: Vec::new(),
    }
}

fn build_topic(p: &Paragraph, tag: TopicTag) -> DisplaySection {
    DisplaySection {
        kind: SectionKind::Topic(tag),
        title: Some(tag.canonical_title().to_string()),
        body: p.text.to_string(),
        emphasized_lines: Vec::new(),
    }
}

fn build_plain(p: &Paragraph) -> DisplaySection {
    let emphasized_lines = p
        .text
        .lines()
        .filter(|line| is_emphasized(line))
        .map(|line| line.to_string())
        .collect();

    DisplaySection {
        kind: SectionKind::Plain,
        title: None,
        body: p.text.to_string(),
        emphasized_lines,
    }
}

fn is_emphasized(line: &str) -> bool {
    let bare = line.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '*' | '•' | '#' | '>' | '_')
    });
    line.contains("**")
        || line.contains("__")
        || bare.to_ascii_lowercase().starts_with("invalidation:")
}

fn placeholder() -> DisplaySection {
    DisplaySection {
        kind: SectionKind::Plain,
        title: None,
        body: EMPTY_ANALYSIS_PLACEHOLDER.to_string(),
        emphasized_lines: Vec::new(),
    }
}
