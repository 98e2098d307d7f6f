/*!
 * Indic TTS speech synthesis adapter.
 *
 * Wraps an AI4Bharat Indic TTS service: wav output for the Indic registry
 * languages, no English.
 */

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::ServiceConfig;
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    artifact_stem, expect_text, http, preflight, Capability, ProviderAdapter, StagePayload,
    StageRequest, StageResult,
};

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    model: &'a str,
    text: &'a str,
    /// Three-letter language code
    language: &'a str,
    /// Where the service should write the wav
    output_path: String,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    audio_path: String,
}

/// Adapter for an Indic TTS service
pub struct IndicTtsAdapter {
    client: Client,
    endpoint: String,
    model: String,
    output_dir: PathBuf,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl IndicTtsAdapter {
    pub fn new(config: &ServiceConfig, output_dir: impl Into<PathBuf>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            output_dir: output_dir.into(),
            timeout,
            max_chars: config.max_chars_per_request,
        }
    }
}

#[async_trait]
impl ProviderAdapter for IndicTtsAdapter {
    fn name(&self) -> &str {
        "indic_tts"
    }

    fn capability(&self) -> Capability {
        Capability::Tts
    }

    fn supports(&self, _source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        match target {
            Some(tag) => LanguageRegistry::global().is_supported(tag) && tag.code() != "eng",
            None => false,
        }
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError> {
        preflight(self, request)?;
        let text = expect_text(self.name(), &request.input)?;

        let unsupported = |code: &str| AdapterError::UnsupportedLanguage {
            provider: self.name().to_string(),
            language: code.to_string(),
        };
        let target = request.target.ok_or_else(|| unsupported("unspecified"))?;
        let language = LanguageRegistry::global()
            .to_vocabulary(target, Vocabulary::IndicTrans)
            .map_err(|_| unsupported(target.code()))?;

        let output_path = self
            .output_dir
            .join(format!("{}.wav", artifact_stem(request)));

        let body = SynthesizeRequest {
            model: &self.model,
            text,
            language,
            output_path: output_path.display().to_string(),
        };

        let started = Instant::now();
        let url = format!("{}/synthesize", self.endpoint);
        debug!("[{}] indic_tts synthesizing {} chars ({})", request.correlation_id, text.chars().count(), language);
        let response: SynthesizeResponse =
            http::post_json(&self.client, &url, &body, self.timeout).await?;

        Ok(StageResult {
            capability: Capability::Tts,
            payload: StagePayload::Audio(PathBuf::from(response.audio_path)),
            language: Some(target),
            provider: self.name().to_string(),
            elapsed: started.elapsed(),
        })
    }
}
