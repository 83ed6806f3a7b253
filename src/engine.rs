use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{SectionClassifier, SignalExtractor};
use crate::config::Config;
use crate::error::ProviderError;
use crate::models::{AnalysisRequest, DisplaySection, Provider, TradingSignal};
use crate::providers::{AbortSignal, ProviderGateway};

/// Everything produced for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub provider_used: Provider,
    pub analysis_text: String,
    pub signal: TradingSignal,
    pub sections: Vec<DisplaySection>,
}

/// prompt → gateway → extraction + sectioning.
pub struct AnalysisEngine {
    gateway: ProviderGateway,
    extractor: SignalExtractor,
    classifier: SectionClassifier,
    candle_limit: usize,
}

impl AnalysisEngine {
    pub fn new(gateway: ProviderGateway, candle_limit: usize) -> Self {
        Self {
            gateway,
            extractor: SignalExtractor::new(),
            classifier: SectionClassifier::new(),
            candle_limit,
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(ProviderGateway::from_config(cfg)?, cfg.candle_limit))
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        abort: &AbortSignal,
    ) -> Result<AnalysisOutcome, ProviderError> {
        let request = AnalysisRequest {
            market_data: request.market_data.truncated(self.candle_limit),
            ..request.clone()
        };

        info!(
            "Analyzing {} via {} (data {})",
            request.symbol,
            request.provider,
            request.market_data.describe()
        );

        let result = self.gateway.generate(&request, abort).await?;
        Ok(self.interpret(&request.symbol, result.analysis_text, result.provider_used))
    }

    /// Structured view of an already generated analysis.
    pub fn interpret(&self, symbol: &str, analysis_text: String, provider_used: Provider) -> AnalysisOutcome {
        let signal = self.extractor.extract(&analysis_text, symbol);
        let sections = self.classifier.classify(&analysis_text);

        debug!(
            "Extracted {} {} from {} chars, {} sections",
            signal.signal_type,
            signal.pair,
            analysis_text.len(),
            sections.len()
        );

        AnalysisOutcome {
            provider_used,
            analysis_text,
            signal,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::models::{SectionKind, SignalType};
    use crate::providers::{GeminiBackend, OpenAiBackend};
    use crate::test_helpers::{default_test_config, WELL_FORMED_ANALYSIS};

    fn engine() -> AnalysisEngine {
        let cfg = default_test_config();
        let gateway = ProviderGateway::new(
            Arc::new(OpenAiBackend::new(&cfg).unwrap()),
            Arc::new(GeminiBackend::new(&cfg).unwrap()),
            Duration::from_secs(1),
        );
        AnalysisEngine::new(gateway, 50)
    }

    #[test]
    fn interpret_builds_signal_and_sections() {
        let outcome = engine().interpret("EURUSD", WELL_FORMED_ANALYSIS.to_string(), Provider::Gemini);
        assert_eq!(outcome.provider_used, Provider::Gemini);
        assert_eq!(outcome.signal.signal_type, SignalType::Buy);
        assert_eq!(outcome.sections.len(), 4);
        assert_eq!(outcome.sections[2].kind, SectionKind::Header);
    }

    #[test]
    fn unparsable_text_degrades_to_hold() {
        let outcome = engine().interpret("USDJPY", "¯\\_(ツ)_/¯".to_string(), Provider::OpenAi);
        assert_eq!(outcome.signal, TradingSignal::hold("USDJPY"));
        assert_eq!(outcome.sections.len(), 1);
    }
}
