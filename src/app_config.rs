use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::language_registry::LanguageRegistry;
use crate::providers::ProviderKind;

/// Application configuration module
/// This module handles loading, validating and saving configuration
/// settings: provider endpoints, per-capability cascade ordering, and
/// pipeline-wide knobs. Cascade ordering is data, not code.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory synthesized audio and other artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default source language (canonical 639-3 code), if jobs omit one
    #[serde(default)]
    pub default_source_language: Option<String>,

    /// Default target language (canonical 639-3 code)
    #[serde(default = "default_target_language")]
    pub default_target_language: String,

    /// Speech recognition settings
    #[serde(default)]
    pub asr: AsrConfig,

    /// Translation settings
    #[serde(default)]
    pub mt: MtConfig,

    /// Speech synthesis settings
    #[serde(default)]
    pub tts: TtsConfig,

    /// Progress emitter settings
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Pipeline-wide settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One model service behind an adapter
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Service endpoint URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Model identifier the service should load
    #[serde(default = "String::new")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum input characters per request, if the service has a ceiling
    #[serde(default)]
    pub max_chars_per_request: Option<usize>,

    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl ServiceConfig {
    fn new(endpoint: &str, model: &str, max_chars: Option<usize>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            timeout_secs: default_timeout_secs(),
            max_chars_per_request: max_chars,
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AsrConfig {
    /// Adapter order for the ASR cascade
    #[serde(default = "default_asr_cascade")]
    pub cascade: Vec<ProviderKind>,

    /// Whisper service (all languages, bundled language identification)
    #[serde(default = "default_whisper_service")]
    pub whisper: ServiceConfig,

    /// Indic Conformer service (Indic languages only)
    #[serde(default = "default_indic_conformer_service")]
    pub indic_conformer: ServiceConfig,

    /// Conformer decoding strategy: "ctc" or "rnnt"
    #[serde(default = "default_decoding")]
    pub decoding: String,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            cascade: default_asr_cascade(),
            whisper: default_whisper_service(),
            indic_conformer: default_indic_conformer_service(),
            decoding: default_decoding(),
        }
    }
}

/// Translation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MtConfig {
    /// Adapter order for the translation cascade
    #[serde(default = "default_mt_cascade")]
    pub cascade: Vec<ProviderKind>,

    /// IndicTrans service (English/Indic pairs)
    #[serde(default = "default_indictrans_service")]
    pub indictrans: ServiceConfig,

    /// Google translate endpoint (any pair with ISO 639-1 codes)
    #[serde(default = "default_google_service")]
    pub google: ServiceConfig,

    /// NLLB service (universal fallback, Flores codes)
    #[serde(default = "default_nllb_service")]
    pub nllb: ServiceConfig,
}

impl Default for MtConfig {
    fn default() -> Self {
        Self {
            cascade: default_mt_cascade(),
            indictrans: default_indictrans_service(),
            google: default_google_service(),
            nllb: default_nllb_service(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TtsConfig {
    /// Adapter order for the synthesis cascade
    #[serde(default = "default_tts_cascade")]
    pub cascade: Vec<ProviderKind>,

    /// XTTS service (voice cloning, 400-char safe window)
    #[serde(default = "default_xtts_service")]
    pub xtts: ServiceConfig,

    /// gTTS service (mp3 output, ISO 639-1 languages)
    #[serde(default = "default_gtts_service")]
    pub gtts: ServiceConfig,

    /// Indic TTS service (wav output, Indic languages)
    #[serde(default = "default_indic_tts_service")]
    pub indic_tts: ServiceConfig,

    /// Reference voice clip for XTTS cloning
    #[serde(default = "default_reference_voice")]
    pub reference_voice: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            cascade: default_tts_cascade(),
            xtts: default_xtts_service(),
            gtts: default_gtts_service(),
            indic_tts: default_indic_tts_service(),
            reference_voice: default_reference_voice(),
        }
    }
}

/// Progress emitter settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProgressConfig {
    /// Milliseconds between pseudo-progress ticks
    #[serde(default = "default_progress_interval_ms")]
    pub interval_ms: u64,

    /// First value published when an operation starts
    #[serde(default = "default_progress_floor")]
    pub floor: u8,

    /// Highest value pseudo-progress may reach before completion
    #[serde(default = "default_progress_ceiling")]
    pub ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_progress_interval_ms(),
            floor: default_progress_floor(),
            ceiling: default_progress_ceiling(),
        }
    }
}

/// Pipeline-wide settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunks processed concurrently in a chunked cascade pass
    #[serde(default = "default_concurrent_chunks")]
    pub concurrent_chunks: usize,

    /// Seconds allowed for media transcoding before giving up
    #[serde(default = "default_transcode_timeout_secs")]
    pub transcode_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrent_chunks: default_concurrent_chunks(),
            transcode_timeout_secs: default_transcode_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_target_language() -> String {
    "hin".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_decoding() -> String {
    "ctc".to_string()
}

fn default_reference_voice() -> String {
    "samples/female_clip.wav".to_string()
}

fn default_progress_interval_ms() -> u64 {
    300
}

fn default_progress_floor() -> u8 {
    5
}

fn default_progress_ceiling() -> u8 {
    95
}

fn default_concurrent_chunks() -> usize {
    4
}

fn default_transcode_timeout_secs() -> u64 {
    120
}

fn default_asr_cascade() -> Vec<ProviderKind> {
    vec![ProviderKind::IndicConformer, ProviderKind::Whisper]
}

fn default_mt_cascade() -> Vec<ProviderKind> {
    vec![ProviderKind::IndicTrans, ProviderKind::Google, ProviderKind::Nllb]
}

fn default_tts_cascade() -> Vec<ProviderKind> {
    vec![ProviderKind::Xtts, ProviderKind::IndicTts, ProviderKind::Gtts]
}

fn default_whisper_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8801", "large-v2", None)
}

fn default_indic_conformer_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8802", "ai4bharat/indic-conformer-600m-multilingual", None)
}

fn default_indictrans_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8803", "ai4bharat/indictrans2-1B", Some(2000))
}

fn default_google_service() -> ServiceConfig {
    ServiceConfig::new("https://translate.googleapis.com", "", Some(5000))
}

fn default_nllb_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8804", "facebook/nllb-200-distilled-600M", Some(2000))
}

fn default_xtts_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8805", "tts_models/multilingual/multi-dataset/xtts_v2", Some(400))
}

fn default_gtts_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8806", "", Some(5000))
}

fn default_indic_tts_service() -> ServiceConfig {
    ServiceConfig::new("http://localhost:8807", "ai4bharat/indic-parler-tts", Some(1000))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            default_source_language: None,
            default_target_language: default_target_language(),
            asr: AsrConfig::default(),
            mt: MtConfig::default(),
            tts: TtsConfig::default(),
            progress: ProgressConfig::default(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, writing a default
    /// config there on first run
    pub fn load_or_init() -> Result<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            return Self::from_file(&path);
        }

        let config = Config::default();
        config.save_to_file(&path)?;
        log::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Default config location under the user's config directory
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| anyhow!("No config directory available"))?;
        Ok(base.join("vasha").join("config.json"))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let registry = LanguageRegistry::global();

        registry
            .by_code(&self.default_target_language)
            .map_err(|e| anyhow!("Invalid default target language: {}", e))?;
        if let Some(source) = &self.default_source_language {
            registry
                .by_code(source)
                .map_err(|e| anyhow!("Invalid default source language: {}", e))?;
        }

        if self.mt.cascade.is_empty() {
            return Err(anyhow!("Translation cascade must list at least one provider"));
        }
        if self.asr.cascade.is_empty() {
            return Err(anyhow!("Recognition cascade must list at least one provider"));
        }
        if self.tts.cascade.is_empty() {
            return Err(anyhow!("Synthesis cascade must list at least one provider"));
        }

        match self.asr.decoding.as_str() {
            "ctc" | "rnnt" => {}
            other => return Err(anyhow!("Invalid decoding strategy: {}", other)),
        }

        if self.progress.floor >= 100 || self.progress.ceiling >= 100 {
            return Err(anyhow!("Progress floor and ceiling must stay below 100"));
        }
        if self.progress.floor > self.progress.ceiling {
            return Err(anyhow!("Progress floor must not exceed the ceiling"));
        }
        if self.pipeline.concurrent_chunks == 0 {
            return Err(anyhow!("concurrent_chunks must be at least 1"));
        }

        Ok(())
    }

    /// Settings block for one provider
    pub fn service(&self, kind: ProviderKind) -> &ServiceConfig {
        match kind {
            ProviderKind::Whisper => &self.asr.whisper,
            ProviderKind::IndicConformer => &self.asr.indic_conformer,
            ProviderKind::IndicTrans => &self.mt.indictrans,
            ProviderKind::Google => &self.mt.google,
            ProviderKind::Nllb => &self.mt.nllb,
            ProviderKind::Xtts => &self.tts.xtts,
            ProviderKind::Gtts => &self.tts.gtts,
            ProviderKind::IndicTts => &self.tts.indic_tts,
        }
    }
}
