/*!
 * IndicTrans translation adapter.
 *
 * Wraps an IndicTrans2 inference service. English-to-Indic and
 * Indic-to-English pairs only; Indic-to-Indic and anything outside the
 * registry is declared unsupported so the cascade moves on without
 * spending a call.
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
    /// Three-letter source language code
    source: &'a str,
    /// Three-letter target language code
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

/// Adapter for an IndicTrans2 inference service
pub struct IndicTransAdapter {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl IndicTransAdapter {
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
impl ProviderAdapter for IndicTransAdapter {
    fn name(&self) -> &str {
        "indictrans"
    }

    fn capability(&self) -> Capability {
        Capability::Mt
    }

    fn supports(&self, source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        let registry = LanguageRegistry::global();
        match (source, target) {
            (Some(src), Some(tgt)) => {
                // Exactly one side must be English
                registry.is_supported(src)
                    && registry.is_supported(tgt)
                    && ((src.code() == "eng") != (tgt.code() == "eng"))
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
        // preflight guarantees both ends are present and registered
        let unsupported = |tag: &LanguageTag| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: tag.code().to_string(),
        };
        let source = request.source.ok_or_else(|| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: "unspecified".to_string(),
        })?;
        let target = request.target.ok_or_else(|| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: "unspecified".to_string(),
        })?;
        let source_code = registry
            .to_vocabulary(source, Vocabulary::IndicTrans)
            .map_err(|_| unsupported(&source))?;
        let target_code = registry
            .to_vocabulary(target, Vocabulary::IndicTrans)
            .map_err(|_| unsupported(&target))?;

        let body = TranslateRequest {
            model: &self.model,
            text,
            source: source_code,
            target: target_code,
        };

        let started = Instant::now();
        let url = format!("{}/translate", self.endpoint);
        debug!("[{}] indictrans {} -> {}", request.correlation_id, source_code, target_code);
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
