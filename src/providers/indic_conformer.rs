/*!
 * Indic Conformer speech recognition adapter.
 *
 * Wraps an AI4Bharat conformer inference service. Indic languages only, and
 * it cannot detect the language itself, so a request without a source
 * language is out of contract and falls through to the next adapter in the
 * cascade.
 */

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{AsrConfig, ServiceConfig};
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    expect_audio, http, preflight, Capability, ProviderAdapter, StagePayload, StageRequest,
    StageResult,
};

#[derive(Debug, Serialize)]
struct ConformerRequest {
    model: String,
    audio_path: String,
    /// Three-letter language code
    language: String,
    /// Decoding strategy: "ctc" or "rnnt"
    decoding: String,
}

#[derive(Debug, Deserialize)]
struct ConformerResponse {
    text: String,
}

/// Adapter for an Indic Conformer inference service
pub struct IndicConformerAdapter {
    client: Client,
    endpoint: String,
    model: String,
    decoding: String,
    timeout: Duration,
}

impl IndicConformerAdapter {
    pub fn new(config: &ServiceConfig, asr: &AsrConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            decoding: asr.decoding.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl ProviderAdapter for IndicConformerAdapter {
    fn name(&self) -> &str {
        "indic_conformer"
    }

    fn capability(&self) -> Capability {
        Capability::Asr
    }

    fn supports(&self, source: Option<&LanguageTag>, _target: Option<&LanguageTag>) -> bool {
        // Needs an explicit Indic source; no detection of its own
        match source {
            Some(tag) => LanguageRegistry::global().is_supported(tag) && tag.code() != "eng",
            None => false,
        }
    }

    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError> {
        preflight(self, request)?;
        let audio = expect_audio(self.name(), &request.input)?;

        // supports() guarantees a source is present here
        let source = request.source.ok_or_else(|| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: "unspecified".to_string(),
        })?;
        let language = LanguageRegistry::global()
            .to_vocabulary(source, Vocabulary::IndicTrans)
            .map_err(|_| AdapterError::UnsupportedLanguage {
                provider: self.name().to_string(),
                language: source.code().to_string(),
            })?;

        let body = ConformerRequest {
            model: self.model.clone(),
            audio_path: audio.display().to_string(),
            language: language.to_string(),
            decoding: self.decoding.clone(),
        };

        let started = Instant::now();
        let url = format!("{}/transcribe", self.endpoint);
        debug!("[{}] conformer transcribing {} ({})", request.correlation_id, audio.display(), language);
        let response: ConformerResponse =
            http::post_json(&self.client, &url, &body, self.timeout).await?;

        Ok(StageResult {
            capability: Capability::Asr,
            payload: StagePayload::Text(response.text),
            language: Some(source),
            provider: self.name().to_string(),
            elapsed: started.elapsed(),
        })
    }
}
