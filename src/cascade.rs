/*!
 * Cascade executor.
 *
 * A cascade is an ordered list of adapters for one capability. Execution
 * walks the list: adapters that do not support the requested languages are
 * skipped and recorded, failures are recorded and the next adapter is
 * tried, the first success wins and later adapters are never invoked. Only
 * when the whole list is exhausted does the caller see an error, and that
 * error carries every per-adapter outcome.
 *
 * `execute_chunked` splits oversized text to the tightest ceiling any
 * adapter in the cascade declares, runs the chunks concurrently and
 * reassembles the outputs in chunk order, so a fallback mid-stream never
 * receives a chunk it cannot take.
 */

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::app_config::Config;
use crate::chunking::TextChunker;
use crate::errors::{AttemptOutcome, AttemptRecord, CascadeError};
use crate::providers::{
    build_adapter, Capability, ProviderAdapter, ProviderKind, StageInput, StagePayload,
    StageRequest, StageResult,
};

/// Ordered adapter list for one capability
pub struct CascadeSpec {
    capability: Capability,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl CascadeSpec {
    pub fn new(capability: Capability, adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { capability, adapters }
    }

    /// Build a cascade from the configured provider order
    pub fn from_config(capability: Capability, kinds: &[ProviderKind], config: &Config) -> Self {
        let adapters = kinds.iter().map(|kind| build_adapter(*kind, config)).collect();
        Self { capability, adapters }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Adapter names in cascade order
    pub fn providers(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// The tightest input ceiling any adapter in the cascade declares.
    /// Chunking to this bound keeps every chunk safe for whichever
    /// fallback ends up handling it.
    pub fn min_input_chars(&self) -> Option<usize> {
        self.adapters.iter().filter_map(|a| a.max_input_chars()).min()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Runs cascades, plain or chunked
pub struct CascadeExecutor {
    /// Maximum chunks in flight during a chunked pass
    concurrent_chunks: usize,
}

impl CascadeExecutor {
    pub fn new(concurrent_chunks: usize) -> Self {
        Self { concurrent_chunks: concurrent_chunks.max(1) }
    }

    /// Walk the cascade once for a single request
    pub async fn execute(
        &self,
        spec: &CascadeSpec,
        request: &StageRequest,
    ) -> Result<StageResult, CascadeError> {
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for adapter in &spec.adapters {
            if !adapter.supports(request.source.as_ref(), request.target.as_ref()) {
                debug!(
                    "[{}] {} skipped for {} (language not supported)",
                    request.correlation_id,
                    adapter.name(),
                    spec.capability
                );
                attempts.push(AttemptRecord {
                    provider: adapter.name().to_string(),
                    outcome: AttemptOutcome::Skipped("language not supported".to_string()),
                });
                continue;
            }

            match adapter.invoke(request).await {
                Ok(result) => {
                    info!(
                        "[{}] {} {} succeeded in {:?}",
                        request.correlation_id,
                        adapter.name(),
                        spec.capability,
                        result.elapsed
                    );
                    return Ok(result);
                }
                Err(error) => {
                    warn!(
                        "[{}] {} {} failed: {}, trying next provider",
                        request.correlation_id,
                        adapter.name(),
                        spec.capability,
                        error
                    );
                    attempts.push(AttemptRecord {
                        provider: adapter.name().to_string(),
                        outcome: AttemptOutcome::Failed(error),
                    });
                }
            }
        }

        Err(CascadeError::AllProvidersFailed { capability: spec.capability, attempts })
    }

    /// Walk the cascade over text that may exceed the adapters' ceilings.
    ///
    /// Text within the tightest ceiling (or a cascade with no ceiling at
    /// all) goes through `execute` unchanged. Otherwise the text is split,
    /// each chunk cascades independently with bounded concurrency, and the
    /// outputs are rejoined in chunk order. The result's provider field
    /// lists every adapter that contributed when they differ.
    pub async fn execute_chunked(
        &self,
        spec: &CascadeSpec,
        request: &StageRequest,
    ) -> Result<StageResult, CascadeError> {
        let text = match &request.input {
            StageInput::Text(text) => text,
            StageInput::Audio(_) => return self.execute(spec, request).await,
        };

        let bound = match spec.min_input_chars() {
            Some(bound) if text.chars().count() > bound => bound,
            _ => return self.execute(spec, request).await,
        };

        let chunker = TextChunker::new(bound);
        let chunks = chunker.split(text);
        info!(
            "[{}] splitting {} chars into {} chunks (bound {})",
            request.correlation_id,
            text.chars().count(),
            chunks.len(),
            chunker.max_chars()
        );

        let started = Instant::now();
        let outcomes: Vec<Result<(usize, StageResult), CascadeError>> = stream::iter(chunks)
            .map(|chunk| {
                let index = chunk.index;
                let chunk_request = request.with_text(chunk.text).with_chunk(index);
                async move {
                    let result = self.execute(spec, &chunk_request).await?;
                    Ok((index, result))
                }
            })
            .buffer_unordered(self.concurrent_chunks)
            .collect()
            .await;

        let mut ordered: Vec<(usize, StageResult)> = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            ordered.push(outcome?);
        }
        ordered.sort_by_key(|(index, _)| *index);

        let mut providers: Vec<String> = Vec::new();
        let mut outputs: Vec<(usize, String)> = Vec::new();
        let mut language = None;
        for (index, result) in &ordered {
            if !providers.iter().any(|p| p == &result.provider) {
                providers.push(result.provider.clone());
            }
            language = language.or(result.language);
            if let StagePayload::Text(text) = &result.payload {
                outputs.push((*index, text.clone()));
            }
        }
        let combined = chunker.reassemble(outputs);

        let provider = if providers.len() == 1 {
            providers.remove(0)
        } else {
            format!("mixed({})", providers.join(", "))
        };

        Ok(StageResult {
            capability: spec.capability,
            payload: StagePayload::Text(combined),
            language: request.target.or(language),
            provider,
            elapsed: started.elapsed(),
        })
    }
}
