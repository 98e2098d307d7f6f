/*!
 * # Vasha - multi-provider speech pipeline
 *
 * A Rust library for speech translation across English and the scheduled
 * Indian languages: recognize speech, translate the transcript, synthesize
 * the translation, with every model backend behind a provider cascade that
 * falls through to the next option on failure.
 *
 * ## Features
 *
 * - Canonical language tags with per-provider vocabulary mappings
 *   (ISO 639-1, IndicTrans three-letter codes, Flores codes, speech names)
 * - Provider adapters for Whisper, Indic Conformer, IndicTrans, Google,
 *   NLLB, XTTS, gTTS and Indic TTS behind one async trait
 * - Ordered cascades with skip-on-unsupported and fail-and-continue
 * - Sentence-aware chunking for providers with input ceilings
 * - Pseudo-progress emission over watch channels
 * - A pipeline coordinator that keeps partial results first-class
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `language_registry`: language tags and vocabulary mappings
 * - `providers`: the adapter contract and the concrete backends
 * - `chunking`: text splitting and reassembly
 * - `cascade`: ordered fallback execution
 * - `progress`: per-job progress emission
 * - `pipeline`: the stage coordinator
 * - `media`: ffmpeg/yt-dlp input preparation
 * - `app_config`: configuration management
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod cascade;
pub mod chunking;
pub mod errors;
pub mod language_registry;
pub mod media;
pub mod pipeline;
pub mod progress;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cascade::{CascadeExecutor, CascadeSpec};
pub use chunking::{Chunk, TextChunker};
pub use errors::{AdapterError, AppError, CascadeError, RegistryError};
pub use language_registry::{LanguageRegistry, LanguageTag, Vocabulary};
pub use pipeline::{
    CancelFlag, PipelineCoordinator, PipelineInput, PipelineRequest, PipelineResult,
    PipelineStatus,
};
pub use progress::{ProgressBoard, ProgressHandle};
pub use providers::{Capability, ProviderAdapter, StagePayload, StageRequest, StageResult};
