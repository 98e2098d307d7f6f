/*!
 * XTTS speech synthesis adapter.
 *
 * Wraps a Coqui XTTS v2 server. Clones the configured reference voice and
 * writes a wav named after the correlation id. The model's multilingual set
 * only overlaps the registry on English and Hindi, and its decoder degrades
 * past roughly 400 characters, so the declared input ceiling keeps chunked
 * synthesis inside the safe window.
 */

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{ServiceConfig, TtsConfig};
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    artifact_stem, expect_text, http, preflight, Capability, ProviderAdapter, StagePayload,
    StageRequest, StageResult,
};

/// Registry languages XTTS v2 can actually speak
const XTTS_LANGUAGES: &[&str] = &["eng", "hin"];

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    model: &'a str,
    text: &'a str,
    /// ISO 639-1 language code
    language: &'a str,
    /// Reference clip for voice cloning
    speaker_wav: String,
    /// Where the service should write the wav
    output_path: String,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    audio_path: String,
}

/// Adapter for a Coqui XTTS server
pub struct XttsAdapter {
    client: Client,
    endpoint: String,
    model: String,
    reference_voice: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
    max_chars: Option<usize>,
}

impl XttsAdapter {
    pub fn new(config: &ServiceConfig, tts: &TtsConfig, output_dir: impl Into<PathBuf>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            reference_voice: PathBuf::from(&tts.reference_voice),
            output_dir: output_dir.into(),
            timeout,
            max_chars: config.max_chars_per_request,
        }
    }
}

#[async_trait]
impl ProviderAdapter for XttsAdapter {
    fn name(&self) -> &str {
        "xtts"
    }

    fn capability(&self) -> Capability {
        Capability::Tts
    }

    fn supports(&self, _source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool {
        match target {
            Some(tag) => XTTS_LANGUAGES.contains(&tag.code()),
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

        let output_path = self
            .output_dir
            .join(format!("{}.wav", artifact_stem(request)));

        let body = SynthesizeRequest {
            model: &self.model,
            text,
            language,
            speaker_wav: self.reference_voice.display().to_string(),
            output_path: output_path.display().to_string(),
        };

        let started = Instant::now();
        let url = format!("{}/synthesize", self.endpoint);
        debug!("[{}] xtts synthesizing {} chars ({})", request.correlation_id, text.chars().count(), language);
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
