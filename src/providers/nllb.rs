/*!
 * NLLB translation adapter.
 *
 * Wraps an NLLB-200 inference service using Flores codes. Every registered
 * language has a Flores code, so this is the universal last resort of the
 * translation cascade.
 */

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::ServiceConfig;
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    expect_text, http, preflight, Capability, ProviderAdapter, StagePayload, StageRequest,
    StageResult,
};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    model: &'a str,
    text: &'a str,
    /// Flores source code ("hin_Deva")
    source: &'a str,
    /// Flores target code ("eng_Latn")
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

/// Adapter for an NLLB inference service
pub struct NllbAdapter {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl NllbAdapter {
    pub fn new(config: &ServiceConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            timeout,
            max_chars: config.max_chars_per_request,
        }
    }
}

#[async_trait]
impl ProviderAdapter for NllbAdapter {
    fn name(&self) -> &str {
        "nllb"
    }

    fn capability(&self) -> Capability {
        Capability::Mt
    }

    fn supports(&self, source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        let registry = LanguageRegistry::global();
        match (source, target) {
            (Some(src), Some(tgt)) => {
                registry.to_vocabulary(*src, Vocabulary::Flores).is_ok()
                    && registry.to_vocabulary(*tgt, Vocabulary::Flores).is_ok()
            }
            _ => false,
        }
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError> {
        preflight(self, request)?;
        let text = expect_text(self.name(), &request.input)?;

        let registry = LanguageRegistry::global();
        let unsupported = |code: &str| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: code.to_string(),
        };
        let source = request.source.ok_or_else(|| unsupported("unspecified"))?;
        let target = request.target.ok_or_else(|| unsupported("unspecified"))?;
        let source_code = registry
            .to_vocabulary(source, Vocabulary::Flores)
            .map_err(|_| unsupported(source.code()))?;
        let target_code = registry
            .to_vocabulary(target, Vocabulary::Flores)
            .map_err(|_| unsupported(target.code()))?;

        let body = TranslateRequest {
            model: &self.model,
            text,
            source: source_code,
            target: target_code,
        };

        let started = Instant::now();
        let url = format!("{}/translate", self.endpoint);
        debug!("[{}] nllb {} -> {}", request.correlation_id, source_code, target_code);
        let response: TranslateResponse =
            http::post_json(&self.client, &url, &body, self.timeout).await?;

        Ok(StageResult {
            capability: Capability::Mt,
            payload: StagePayload::Text(response.text),
            language: Some(target),
            provider: self.name().to_string(),
            elapsed: started.elapsed(),
        })
    }
}
