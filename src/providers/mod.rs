/*!
 * Provider adapter contract.
 *
 * Every model backend (speech recognition, translation, speech synthesis)
 * is wrapped in an adapter implementing one trait, so the cascade executor
 * and the pipeline never special-case a backend. Adapters declare their
 * capability, language coverage and input ceiling up front; invocation is
 * a single async call that either yields a payload or a typed error.
 */

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AdapterError;
use crate::language_registry::LanguageTag;

pub(crate) mod http;

pub mod gtts;
pub mod indic_conformer;
pub mod indic_tts;
pub mod indictrans;
pub mod google;
pub mod mock;
pub mod nllb;
pub mod whisper;
pub mod xtts;

pub use gtts::GttsAdapter;
pub use indic_conformer::IndicConformerAdapter;
pub use indic_tts::IndicTtsAdapter;
pub use indictrans::IndicTransAdapter;
pub use google::GoogleTranslateAdapter;
pub use mock::MockAdapter;
pub use nllb::NllbAdapter;
pub use whisper::WhisperAdapter;
pub use xtts::XttsAdapter;

/// The pipeline stage a provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Speech recognition: audio in, text out
    Asr,
    /// Language identification: audio in, language out
    Lid,
    /// Machine translation: text in, text out
    Mt,
    /// Speech synthesis: text in, audio out
    Tts,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Asr => "asr",
            Self::Lid => "lid",
            Self::Mt => "mt",
            Self::Tts => "tts",
        };
        write!(f, "{}", name)
    }
}

/// Identifier for a concrete adapter, as it appears in cascade config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Whisper,
    IndicConformer,
    IndicTrans,
    Google,
    Nllb,
    Xtts,
    Gtts,
    IndicTts,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Whisper => "whisper",
            Self::IndicConformer => "indic_conformer",
            Self::IndicTrans => "indictrans",
            Self::Google => "google",
            Self::Nllb => "nllb",
            Self::Xtts => "xtts",
            Self::Gtts => "gtts",
            Self::IndicTts => "indic_tts",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whisper" => Ok(Self::Whisper),
            "indic_conformer" | "conformer" => Ok(Self::IndicConformer),
            "indictrans" | "indic_trans" => Ok(Self::IndicTrans),
            "google" => Ok(Self::Google),
            "nllb" => Ok(Self::Nllb),
            "xtts" => Ok(Self::Xtts),
            "gtts" => Ok(Self::Gtts),
            "indic_tts" => Ok(Self::IndicTts),
            _ => Err(format!("unknown provider: {}", s)),
        }
    }
}

/// Input handed to an adapter
#[derive(Debug, Clone)]
pub enum StageInput {
    /// Path to a prepared mono 16 kHz WAV file
    Audio(PathBuf),
    /// Text in the source language
    Text(String),
}

impl StageInput {
    /// Size of the input in the unit the adapter's ceiling is declared in
    /// (characters for text; audio inputs are unbounded here).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text.chars().count()),
            Self::Audio(_) => None,
        }
    }
}

/// Output produced by an adapter
#[derive(Debug, Clone)]
pub enum StagePayload {
    /// Transcribed or translated text
    Text(String),
    /// Path to a synthesized audio file
    Audio(PathBuf),
}

impl StagePayload {
    /// The text payload, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Audio(_) => None,
        }
    }

    /// The audio path payload, if this is one
    pub fn as_audio(&self) -> Option<&PathBuf> {
        match self {
            Self::Audio(path) => Some(path),
            Self::Text(_) => None,
        }
    }
}

/// One invocation request, capability-agnostic
#[derive(Debug, Clone)]
pub struct StageRequest {
    /// Correlates all log lines and progress updates for one job
    pub correlation_id: Uuid,
    /// The audio or text to process
    pub input: StageInput,
    /// Source language, if known (ASR may run without one)
    pub source: Option<LanguageTag>,
    /// Target language, for translation and synthesis
    pub target: Option<LanguageTag>,
    /// Chunk index when this request carries one piece of a split text,
    /// so per-chunk artifacts get distinct names
    pub chunk: Option<usize>,
}

impl StageRequest {
    /// Request carrying text with a known source/target pair
    pub fn text(correlation_id: Uuid, text: impl Into<String>, source: LanguageTag, target: LanguageTag) -> Self {
        Self {
            correlation_id,
            input: StageInput::Text(text.into()),
            source: Some(source),
            target: Some(target),
            chunk: None,
        }
    }

    /// Request carrying audio with an optional source hint
    pub fn audio(correlation_id: Uuid, path: impl Into<PathBuf>, source: Option<LanguageTag>) -> Self {
        Self {
            correlation_id,
            input: StageInput::Audio(path.into()),
            source,
            target: None,
            chunk: None,
        }
    }

    /// Same request with different text (used when re-invoking per chunk)
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            correlation_id: self.correlation_id,
            input: StageInput::Text(text.into()),
            source: self.source,
            target: self.target,
            chunk: self.chunk,
        }
    }

    /// Same request tagged with a chunk index
    pub fn with_chunk(mut self, index: usize) -> Self {
        self.chunk = Some(index);
        self
    }
}

/// Successful adapter output plus provenance
#[derive(Debug, Clone)]
pub struct StageResult {
    /// The capability this result came from
    pub capability: Capability,
    /// The produced payload
    pub payload: StagePayload,
    /// Language detected or produced, where meaningful (LID, ASR)
    pub language: Option<LanguageTag>,
    /// Name of the adapter (or adapters) that produced the payload
    pub provider: String,
    /// Wall time spent in the adapter
    pub elapsed: Duration,
}

/// Contract every model backend wrapper implements.
///
/// `supports` must be checkable without I/O; the cascade uses it to skip
/// adapters before spending an upstream call. `invoke` re-validates and
/// returns `UnsupportedLanguage` or `InputTooLarge` before any network
/// traffic when the request is out of contract.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable adapter name, used in logs and attempt records
    fn name(&self) -> &str;

    /// The stage this adapter serves
    fn capability(&self) -> Capability;

    /// Whether the adapter covers the given source/target languages.
    /// `None` means the dimension is not constrained by the request.
    fn supports(&self, source: Option<&LanguageTag>, target: Option<&LanguageTag>) -> bool;

    /// Maximum input size in characters, if the adapter has one
    fn max_input_chars(&self) -> Option<usize> {
        None
    }

    /// Run the adapter on one request
    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError>;
}

/// Instantiate the adapter for a configured provider
pub fn build_adapter(kind: ProviderKind, config: &crate::app_config::Config) -> Arc<dyn ProviderAdapter> {
    let service = config.service(kind);
    match kind {
        ProviderKind::Whisper => Arc::new(WhisperAdapter::new(service)),
        ProviderKind::IndicConformer => Arc::new(IndicConformerAdapter::new(service, &config.asr)),
        ProviderKind::IndicTrans => Arc::new(IndicTransAdapter::new(service)),
        ProviderKind::Google => Arc::new(GoogleTranslateAdapter::new(service)),
        ProviderKind::Nllb => Arc::new(NllbAdapter::new(service)),
        ProviderKind::Xtts => Arc::new(XttsAdapter::new(service, &config.tts, config.output_dir.as_str())),
        ProviderKind::Gtts => Arc::new(GttsAdapter::new(service, config.output_dir.as_str())),
        ProviderKind::IndicTts => Arc::new(IndicTtsAdapter::new(service, config.output_dir.as_str())),
    }
}

/// Text payload or an invocation error naming the adapter
pub(crate) fn expect_text<'a>(provider: &str, input: &'a StageInput) -> Result<&'a str, AdapterError> {
    match input {
        StageInput::Text(text) => Ok(text),
        StageInput::Audio(_) => Err(AdapterError::UpstreamUnavailable(format!(
            "{} requires a text input",
            provider
        ))),
    }
}

/// Audio payload or an invocation error naming the adapter
pub(crate) fn expect_audio<'a>(provider: &str, input: &'a StageInput) -> Result<&'a PathBuf, AdapterError> {
    match input {
        StageInput::Audio(path) => Ok(path),
        StageInput::Text(_) => Err(AdapterError::UpstreamUnavailable(format!(
            "{} requires an audio input",
            provider
        ))),
    }
}

/// Artifact file stem derived from the correlation id (and chunk index for
/// split synthesis), so re-invoking the same job overwrites rather than
/// accumulates
pub(crate) fn artifact_stem(request: &StageRequest) -> String {
    let simple = request.correlation_id.simple().to_string();
    match request.chunk {
        Some(index) => format!("tts_{}_{}", &simple[..8], index),
        None => format!("tts_{}", &simple[..8]),
    }
}

/// Shared preflight used by adapters at the top of `invoke`
pub(crate) fn preflight(
    adapter: &dyn ProviderAdapter,
    request: &StageRequest,
) -> Result<(), AdapterError> {
    if !adapter.supports(request.source.as_ref(), request.target.as_ref()) {
        let language = request
            .source
            .or(request.target)
            .map(|t| t.code().to_string())
            .unwrap_or_else(|| "unspecified".to_string());
        return Err(AdapterError::UnsupportedLanguage {
            provider: adapter.name().to_string(),
            language,
        });
    }

    if let (Some(limit), Some(size)) = (adapter.max_input_chars(), request.input.size()) {
        if size > limit {
            return Err(AdapterError::InputTooLarge {
                provider: adapter.name().to_string(),
                size,
                limit,
            });
        }
    }

    Ok(())
}
