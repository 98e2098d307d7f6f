/*!
 * gTTS speech synthesis adapter.
 *
 * Last resort of the synthesis cascade: no voice cloning, mp3 output
 * instead of wav, but it covers every registry language that has an
 * ISO 639-1 code.
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
    text: &'a str,
    /// ISO 639-1 language code
    language: &'a str,
    /// Where the service should write the mp3
    output_path: String,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    audio_path: String,
}

/// Adapter for a gTTS service
pub struct GttsAdapter {
    client: Client,
    endpoint: String,
    output_dir: PathBuf,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl GttsAdapter {
    pub fn new(config: &ServiceConfig, output_dir: impl Into<PathBuf>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            output_dir: output_dir.into(),
            timeout,
            max_chars: config.max_chars_per_request,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GttsAdapter {
    fn name(&self) -> &str {
        "gtts"
    }

    fn capability(&self) -> Capability {
        Capability::Tts
    }

    fn supports(&self, _source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        match target {
            Some(tag) => LanguageRegistry::global()
                .to_vocabulary(*tag, Vocabulary::Iso639_1)
                .is_ok(),
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
            .to_vocabulary(target, Vocabulary::Iso639_1)
            .map_err(|_| unsupported(target.code()))?;

        // mp3 here, unlike the wav-producing adapters
        let output_path = self
            .output_dir
            .join(format!("{}.mp3", artifact_stem(request)));

        let body = SynthesizeRequest {
            text,
            language,
            output_path: output_path.display().to_string(),
        };

        let started = Instant::now();
        let url = format!("{}/synthesize", self.endpoint);
        debug!("[{}] gtts synthesizing {} chars ({})", request.correlation_id, text.chars().count(), language);
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
