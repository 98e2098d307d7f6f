/*!
 * Pipeline coordinator.
 *
 * Chains the recognition, translation and synthesis cascades into one job:
 * media in, transcript out, translation out, synthesized audio out. The
 * language detected during recognition feeds translation; the translated
 * text feeds synthesis. Every completed stage's result is kept even when a
 * later stage fails, and cancellation takes effect between stages, never
 * mid-adapter-call, so the caller always gets back whatever finished.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::app_config::Config;
use crate::cascade::{CascadeExecutor, CascadeSpec};
use crate::chunking::TextChunker;
use crate::language_registry::{LanguageRegistry, LanguageTag};
use crate::media;
use crate::progress::{ProgressBoard, ProgressHandle};
use crate::providers::{Capability, StagePayload, StageRequest, StageResult};

/// What a pipeline job starts from
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// Local audio or video file
    MediaFile(PathBuf),
    /// Remote URL to fetch audio from
    RemoteUrl(String),
    /// Already-transcribed text (recognition is skipped)
    Text(String),
}

/// One pipeline job
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Correlates logs, progress and artifacts for this job
    pub correlation_id: Uuid,
    pub input: PipelineInput,
    /// Source language; detected during recognition when absent
    pub source: Option<LanguageTag>,
    /// Target language; falls back to the configured default
    pub target: Option<LanguageTag>,
    /// Run the translation stage
    pub translate: bool,
    /// Run the synthesis stage
    pub synthesize: bool,
}

impl PipelineRequest {
    pub fn new(input: PipelineInput) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            input,
            source: None,
            target: None,
            translate: true,
            synthesize: true,
        }
    }

    pub fn source(mut self, tag: LanguageTag) -> Self {
        self.source = Some(tag);
        self
    }

    pub fn target(mut self, tag: LanguageTag) -> Self {
        self.target = Some(tag);
        self
    }

    pub fn translate(mut self, enabled: bool) -> Self {
        self.translate = enabled;
        self
    }

    pub fn synthesize(mut self, enabled: bool) -> Self {
        self.synthesize = enabled;
        self
    }
}

/// How a pipeline job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Every requested stage completed
    Completed,
    /// Some stages completed before a failure or cancellation
    PartiallyCompleted,
    /// Nothing useful was produced
    Failed,
}

/// Outcome of one pipeline job: the ordered stage results plus how it ended
#[derive(Debug)]
pub struct PipelineResult {
    pub correlation_id: Uuid,
    pub status: PipelineStatus,
    /// Results of the stages that completed, in execution order
    pub stages: Vec<StageResult>,
    /// What stopped the job, when it did not complete
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl PipelineResult {
    /// The completed result for one capability, if that stage ran
    pub fn stage(&self, capability: Capability) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.capability == capability)
    }

    /// Recognized text, if recognition completed
    pub fn transcript(&self) -> Option<&str> {
        self.stage(Capability::Asr).and_then(|s| s.payload.as_text())
    }

    /// Translated text, if translation completed
    pub fn translation(&self) -> Option<&str> {
        self.stage(Capability::Mt).and_then(|s| s.payload.as_text())
    }

    /// Synthesized audio path, if synthesis completed
    pub fn audio(&self) -> Option<&PathBuf> {
        self.stage(Capability::Tts).and_then(|s| s.payload.as_audio())
    }
}

/// Caller-held cancellation flag. Observed between stages only; an
/// in-flight adapter call is never aborted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives one job through the configured cascades
pub struct PipelineCoordinator {
    config: Config,
    executor: CascadeExecutor,
    asr: CascadeSpec,
    mt: CascadeSpec,
    tts: CascadeSpec,
    board: Arc<ProgressBoard>,
}

impl PipelineCoordinator {
    /// Coordinator over the configured provider cascades
    pub fn new(config: Config) -> Self {
        let executor = CascadeExecutor::new(config.pipeline.concurrent_chunks);
        let asr = CascadeSpec::from_config(Capability::Asr, &config.asr.cascade, &config);
        let mt = CascadeSpec::from_config(Capability::Mt, &config.mt.cascade, &config);
        let tts = CascadeSpec::from_config(Capability::Tts, &config.tts.cascade, &config);
        Self {
            config,
            executor,
            asr,
            mt,
            tts,
            board: Arc::new(ProgressBoard::new()),
        }
    }

    /// Coordinator over explicit cascades (used by tests with mocks)
    pub fn with_specs(config: Config, asr: CascadeSpec, mt: CascadeSpec, tts: CascadeSpec) -> Self {
        let executor = CascadeExecutor::new(config.pipeline.concurrent_chunks);
        Self {
            config,
            executor,
            asr,
            mt,
            tts,
            board: Arc::new(ProgressBoard::new()),
        }
    }

    /// Shared progress board for polling running jobs
    pub fn board(&self) -> Arc<ProgressBoard> {
        Arc::clone(&self.board)
    }

    /// Run one job to whatever end it reaches
    pub async fn run(&self, request: PipelineRequest, cancel: CancelFlag) -> PipelineResult {
        let started_at = Utc::now();
        let started = Instant::now();
        let id = request.correlation_id;

        let mut progress = ProgressHandle::start(&self.config.progress);
        self.board.register(id, progress.subscribe());

        info!("[{}] pipeline started", id);
        let (stages, failure, cancelled) = self.run_stages(&request, &cancel).await;
        progress.finish();

        let status = if let Some(reason) = &failure {
            warn!("[{}] pipeline stopped: {}", id, reason);
            if stages.is_empty() {
                PipelineStatus::Failed
            } else {
                PipelineStatus::PartiallyCompleted
            }
        } else if cancelled {
            info!("[{}] pipeline cancelled after {} stages", id, stages.len());
            PipelineStatus::PartiallyCompleted
        } else {
            info!("[{}] pipeline completed in {:?}", id, started.elapsed());
            PipelineStatus::Completed
        };

        PipelineResult {
            correlation_id: id,
            status,
            stages,
            failure,
            started_at,
            elapsed: started.elapsed(),
        }
    }

    async fn run_stages(
        &self,
        request: &PipelineRequest,
        cancel: &CancelFlag,
    ) -> (Vec<StageResult>, Option<String>, bool) {
        let mut stages: Vec<StageResult> = Vec::new();
        let id = request.correlation_id;

        if cancel.is_cancelled() {
            return (stages, None, true);
        }

        let target = match self.resolve_target(request) {
            Ok(target) => target,
            Err(reason) => return (stages, Some(reason), false),
        };
        let mut source = request.source.or_else(|| self.configured_source());

        // Recognition, for audio inputs
        let mut text: Option<String> = match &request.input {
            PipelineInput::Text(text) => Some(text.clone()),
            input => {
                let audio = match self.obtain_audio(input, id).await {
                    Ok(path) => path,
                    Err(reason) => return (stages, Some(reason), false),
                };
                let asr_request = StageRequest::audio(id, audio, source);
                match self.executor.execute(&self.asr, &asr_request).await {
                    Ok(result) => {
                        source = source.or(result.language);
                        let transcript = result.payload.as_text().map(str::to_string);
                        stages.push(result);
                        transcript
                    }
                    Err(error) => return (stages, Some(error.to_string()), false),
                }
            }
        };

        // Translation
        if request.translate {
            if cancel.is_cancelled() {
                return (stages, None, true);
            }
            match (&text, source) {
                (Some(input_text), Some(source_tag)) if source_tag != target => {
                    let mt_request = StageRequest::text(id, input_text.clone(), source_tag, target);
                    match self.executor.execute_chunked(&self.mt, &mt_request).await {
                        Ok(result) => {
                            text = result.payload.as_text().map(str::to_string);
                            stages.push(result);
                        }
                        Err(error) => return (stages, Some(error.to_string()), false),
                    }
                }
                (Some(_), Some(_)) => {
                    debug!("[{}] source and target match, skipping translation", id);
                }
                (Some(_), None) => {
                    return (stages, Some("source language unknown, cannot translate".to_string()), false);
                }
                (None, _) => {
                    return (stages, Some("no text available to translate".to_string()), false);
                }
            }
        }

        // Synthesis
        if request.synthesize {
            if cancel.is_cancelled() {
                return (stages, None, true);
            }
            let Some(input_text) = &text else {
                return (stages, Some("no text available to synthesize".to_string()), false);
            };
            match self.synthesize(id, input_text, target).await {
                Ok(result) => stages.push(result),
                Err(reason) => return (stages, Some(reason), false),
            }
        }

        (stages, None, false)
    }

    /// Synthesize text, splitting to the cascade's tightest ceiling and
    /// joining the per-chunk audio when the text does not fit in one call
    async fn synthesize(
        &self,
        id: Uuid,
        text: &str,
        target: LanguageTag,
    ) -> Result<StageResult, String> {
        let base_request = StageRequest::text(id, text, target, target);

        let bound = match self.tts.min_input_chars() {
            Some(bound) if text.chars().count() > bound => bound,
            _ => {
                return self
                    .executor
                    .execute(&self.tts, &base_request)
                    .await
                    .map_err(|e| e.to_string());
            }
        };

        let chunks = TextChunker::new(bound).split(text);
        info!("[{}] synthesizing {} chunks (bound {})", id, chunks.len(), bound);

        let started = Instant::now();
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut providers: Vec<String> = Vec::new();
        for chunk in chunks {
            let chunk_request = base_request.with_text(chunk.text).with_chunk(chunk.index);
            let result = self
                .executor
                .execute(&self.tts, &chunk_request)
                .await
                .map_err(|e| e.to_string())?;
            if let StagePayload::Audio(path) = &result.payload {
                paths.push(path.clone());
            }
            if !providers.iter().any(|p| p == &result.provider) {
                providers.push(result.provider.clone());
            }
        }

        // Chunks are normalized to wav during the join, so the combined
        // artifact is wav regardless of which backends produced the pieces
        let simple = id.simple().to_string();
        let output = PathBuf::from(&self.config.output_dir)
            .join(format!("tts_{}.wav", &simple[..8]));
        let timeout = Duration::from_secs(self.config.pipeline.transcode_timeout_secs);
        let joined = media::concat_audio(&paths, &output, timeout)
            .await
            .map_err(|e| e.to_string())?;

        let provider = if providers.len() == 1 {
            providers.remove(0)
        } else {
            format!("mixed({})", providers.join(", "))
        };

        Ok(StageResult {
            capability: Capability::Tts,
            payload: StagePayload::Audio(joined),
            language: Some(target),
            provider,
            elapsed: started.elapsed(),
        })
    }

    /// Prepared local wav for whatever the input is
    async fn obtain_audio(&self, input: &PipelineInput, id: Uuid) -> Result<PathBuf, String> {
        let timeout = Duration::from_secs(self.config.pipeline.transcode_timeout_secs);
        let simple = id.simple().to_string();
        let prepared = PathBuf::from(&self.config.output_dir)
            .join(format!("prepared_{}.wav", &simple[..8]));

        match input {
            PipelineInput::MediaFile(path) => media::prepare_audio(path, &prepared, timeout)
                .await
                .map_err(|e| e.to_string()),
            PipelineInput::RemoteUrl(url) => media::fetch_remote_audio(url, &prepared, timeout)
                .await
                .map_err(|e| e.to_string()),
            PipelineInput::Text(_) => Err("text input needs no audio".to_string()),
        }
    }

    fn resolve_target(&self, request: &PipelineRequest) -> Result<LanguageTag, String> {
        if let Some(target) = request.target {
            return Ok(target);
        }
        LanguageRegistry::global()
            .by_code(&self.config.default_target_language)
            .map_err(|e| format!("invalid default target language: {}", e))
    }

    fn configured_source(&self) -> Option<LanguageTag> {
        let code = self.config.default_source_language.as_deref()?;
        LanguageRegistry::global().by_code(code).ok()
    }
}
