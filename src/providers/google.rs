/*!
 * Google translate adapter.
 *
 * Uses the public `translate_a/single` endpoint with the gtx client, the
 * same unauthenticated path the googletrans tooling takes. Works for any
 * registered pair that has ISO 639-1 codes, which makes it the mid-cascade
 * fallback between IndicTrans and NLLB.
 */

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::app_config::ServiceConfig;
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    expect_text, http, preflight, Capability, ProviderAdapter, StagePayload, StageRequest,
    StageResult,
};

/// Adapter for the public Google translate endpoint
pub struct GoogleTranslateAdapter {
    client: Client,
    endpoint: String,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl GoogleTranslateAdapter {
    pub fn new(config: &ServiceConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            timeout,
            max_chars: config.max_chars_per_request,
        }
    }

    /// The response is a nested array; the translation is the first element
    /// of each segment under index 0.
    fn extract_translation(value: &Value) -> Option<String> {
        let segments = value.get(0)?.as_array()?;
        let mut text = String::new();
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(Value::as_str) {
                text.push_str(part);
            }
        }
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleTranslateAdapter {
    fn name(&self) -> &str {
        "google"
    }

    fn capability(&self) -> Capability {
        Capability::Mt
    }

    fn supports(&self, source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        let registry = LanguageRegistry::global();
        match (source, target) {
            (Some(src), Some(tgt)) => {
                registry.to_vocabulary(*src, Vocabulary::Iso639_1).is_ok()
                    && registry.to_vocabulary(*tgt, Vocabulary::Iso639_1).is_ok()
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
        let sl = registry
            .to_vocabulary(source, Vocabulary::Iso639_1)
            .map_err(|_| unsupported(source.code()))?;
        let tl = registry
            .to_vocabulary(target, Vocabulary::Iso639_1)
            .map_err(|_| unsupported(target.code()))?;

        let started = Instant::now();
        let url = format!("{}/translate_a/single", self.endpoint);
        let query = [
            ("client", "gtx"),
            ("sl", sl),
            ("tl", tl),
            ("dt", "t"),
            ("q", text),
        ];
        debug!("[{}] google translate {} -> {}", request.correlation_id, sl, tl);
        let value: Value = http::get_json(&self.client, &url, &query, self.timeout).await?;

        let translated = Self::extract_translation(&value).ok_or_else(|| {
            AdapterError::UpstreamError {
                status_code: 200,
                message: "no translation in response".to_string(),
            }
        })?;

        Ok(StageResult {
            capability: Capability::Mt,
            payload: StagePayload::Text(translated),
            language: Some(target),
            provider: self.name().to_string(),
            elapsed: started.elapsed(),
        })
    }
}
