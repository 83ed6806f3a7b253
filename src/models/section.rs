use serde::{Deserialize, Serialize};
use std::fmt;

/// Style tag for paragraphs recognised by topic rather than by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicTag {
    SmartMoney,
    Invalidation,
    MarketStructure,
}

impl TopicTag {
    /// Display title used regardless of how the paragraph is worded.
    pub fn canonical_title(&self) -> &'static str {
        match self {
            TopicTag::SmartMoney => "ICT Smart Money Concepts",
            TopicTag::Invalidation => "Invalidation & No-Trade Criteria",
            TopicTag::MarketStructure => "Market Structure & Bias",
        }
    }
}

impl fmt::Display for TopicTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicTag::SmartMoney => write!(f, "smart_money"),
            TopicTag::Invalidation => write!(f, "invalidation"),
            TopicTag::MarketStructure => write!(f, "market_structure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tag")]
pub enum SectionKind {
    Header,
    SubHeader,
    Topic(TopicTag),
    Plain,
}

/// One styled unit of a parsed analysis, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySection {
    pub kind: SectionKind,
    pub title: Option<String>,
    pub body: String,
    pub emphasized_lines: Vec<String>,
}

impl DisplaySection {
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }

    pub fn is_emphasized(&self, line: &str) -> bool {
        self.emphasized_lines.iter().any(|l| l == line)
    }
}
