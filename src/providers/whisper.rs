/*!
 * Whisper speech recognition adapter.
 *
 * Talks to a Whisper inference service over HTTP. Covers every registered
 * language and bundles language identification: when the request carries no
 * source language, the service's detected language is mapped back through
 * the registry and surfaced on the stage result.
 */

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::ServiceConfig;
use crate::errors::AdapterError;
use crate::language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
use crate::providers::{
    expect_audio, http, preflight, Capability, ProviderAdapter, StagePayload, StageRequest,
    StageResult,
};

/// Recognition request for the Whisper service
#[derive(Debug, Serialize)]
struct TranscribeRequest {
    /// Model size to load ("large-v2", "medium", ...)
    model: String,
    /// Path to a mono 16 kHz WAV file
    audio_path: String,
    /// ISO 639-1 language hint, omitted to let the model detect
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

/// Recognition response from the Whisper service
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    /// Transcribed text
    text: String,
    /// Detected (or echoed) language, as an ISO 639-1 code or English name
    #[serde(default)]
    language: Option<String>,
}

/// Adapter for a Whisper inference service
pub struct WhisperAdapter {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl WhisperAdapter {
    pub fn new(config: &ServiceConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: http::build_client(timeout),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            timeout,
        }
    }

    /// Map the service's detected-language field back to a canonical tag.
    /// Whisper reports either an ISO 639-1 code or a lowercase name.
    fn detected_language(&self, raw: Option<&str>) -> Option<LanguageTag> {
        let raw = raw?;
        let registry = LanguageRegistry::global();
        registry
            .canonicalize(raw, Vocabulary::Iso639_1)
            .or_else(|_| registry.canonicalize(raw, Vocabulary::SpeechName))
            .map_err(|_| {
                warn!("Whisper reported a language outside the registry: {}", raw);
            })
            .ok()
    }
}

#[async_trait]
impl ProviderAdapter for WhisperAdapter {
    fn name(&self) -> &str {
        "whisper"
    }

    fn capability(&self) -> Capability {
        Capability::Asr
    }

    fn supports(&self, source: Option<&LanguageTag>, _target: Option<&LanguageTag>) -> bool {
        // Whisper handles everything the registry knows, hint or no hint
        match source {
            Some(tag) => LanguageRegistry::global().is_supported(tag),
            None => true,
        }
    }

    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError> {
        preflight(self, request)?;
        let audio = expect_audio(self.name(), &request.input)?;

        let hint = match request.source {
            Some(tag) => {
                LanguageRegistry::global()
                    .to_vocabulary(tag, Vocabulary::Iso639_1)
                    .ok()
                    .map(str::to_string)
            }
            None => None,
        };

        let body = TranscribeRequest {
            model: self.model.clone(),
            audio_path: audio.display().to_string(),
            language: hint,
        };

        let started = Instant::now();
        let url = format!("{}/transcribe", self.endpoint);
        debug!("[{}] whisper transcribing {}", request.correlation_id, audio.display());
        let response: TranscribeResponse =
            http::post_json(&self.client, &url, &body, self.timeout).await?;

        let language = request
            .source
            .or_else(|| self.detected_language(response.language.as_deref()));

        Ok(StageResult {
            capability: Capability::Asr,
            payload: StagePayload::Text(response.text),
            language,
            provider: self.name().to_string(),
            elapsed: started.elapsed(),
        })
    }
}
