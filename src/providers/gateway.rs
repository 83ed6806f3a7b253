use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis::PromptBuilder;
use crate::config::Config;
use crate::error::ProviderError;
use crate::models::{AnalysisRequest, Provider, ProviderResult};
use crate::providers::{AbortSignal, GeminiBackend, ModelBackend, OpenAiBackend};

/// Where a `generate` call stands. Only `TryPrimary` can move to another
/// attempt, so at most two backend calls are ever made.
#[derive(Debug)]
pub enum GatewayState {
    TryPrimary(Provider),
    TrySecondary(Provider),
    Succeeded(ProviderResult),
    Failed(ProviderError),
}

/// Applies the outcome of the attempt described by `state`. Terminal states
/// are returned unchanged.
pub fn transition(state: GatewayState, outcome: Result<String, ProviderError>) -> GatewayState {
    match (state, outcome) {
        (GatewayState::TryPrimary(p) | GatewayState::TrySecondary(p), Ok(text)) => {
            GatewayState::Succeeded(ProviderResult {
                analysis_text: text,
                provider_used: p,
            })
        }
        (GatewayState::TryPrimary(p), Err(e)) if e.is_quota_signature() => {
            GatewayState::TrySecondary(p.other())
        }
        (GatewayState::TryPrimary(_) | GatewayState::TrySecondary(_), Err(e)) => {
            GatewayState::Failed(e)
        }
        (terminal, _) => terminal,
    }
}

/// Sends prompts to the preferred backend and falls back to the other one
/// once on a quota error. Holds no state between calls.
pub struct ProviderGateway {
    openai: Arc<dyn ModelBackend>,
    gemini: Arc<dyn ModelBackend>,
    prompt_builder: PromptBuilder,
    call_timeout: Duration,
}

impl ProviderGateway {
    pub fn new(
        openai: Arc<dyn ModelBackend>,
        gemini: Arc<dyn ModelBackend>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            openai,
            gemini,
            prompt_builder: PromptBuilder::new(),
            call_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            Arc::new(OpenAiBackend::new(cfg)?),
            Arc::new(GeminiBackend::new(cfg)?),
            cfg.request_timeout(),
        ))
    }

    fn backend(&self, provider: Provider) -> &Arc<dyn ModelBackend> {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Gemini => &self.gemini,
        }
    }

    pub async fn generate(
        &self,
        request: &AnalysisRequest,
        abort: &AbortSignal,
    ) -> Result<ProviderResult, ProviderError> {
        let prompt = self.prompt_builder.build(
            &request.school_prompt,
            &request.symbol,
            &request.market_data,
        );
        self.generate_from_prompt(&prompt, request.provider, abort)
            .await
    }

    pub async fn generate_from_prompt(
        &self,
        prompt: &str,
        preferred: Provider,
        abort: &AbortSignal,
    ) -> Result<ProviderResult, ProviderError> {
        let mut state = GatewayState::TryPrimary(preferred);

        loop {
            let provider = match state {
                GatewayState::Succeeded(result) => return Ok(result),
                GatewayState::Failed(err) => return Err(err),
                GatewayState::TryPrimary(p) => p,
                GatewayState::TrySecondary(p) => {
                    info!("Falling back to {} after quota error on {}", p, p.other());
                    p
                }
            };

            if abort.is_aborted() {
                info!("Request cancelled before calling {}", provider);
                return Err(ProviderError::Cancelled);
            }

            let outcome = self.attempt(self.backend(provider).as_ref(), prompt, abort).await;
            if let Err(e) = &outcome {
                warn!("{} call failed: {}", provider, e);
            }
            state = transition(state, outcome);
        }
    }

    async fn attempt(
        &self,
        backend: &dyn ModelBackend,
        prompt: &str,
        abort: &AbortSignal,
    ) -> Result<String, ProviderError> {
        let provider = backend.provider();
        debug!("Sending {} char prompt to {}", prompt.chars().count(), provider);
        let call = tokio::time::timeout(self.call_timeout, backend.complete(prompt));

        tokio::select! {
            biased;
            _ = abort.cancelled() => Err(ProviderError::Cancelled),
            res = call => res.unwrap_or(Err(ProviderError::Timeout {
                provider,
                secs: self.call_timeout.as_secs(),
            })),
        }
    }
}
