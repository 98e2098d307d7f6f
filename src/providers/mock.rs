/*!
 * Mock adapter implementations for testing.
 *
 * This module provides mock adapters that simulate different behaviors:
 * - `MockAdapter::working()` - Always succeeds
 * - `MockAdapter::failing()` - Always fails with an upstream error
 * - `MockAdapter::fail_times(n)` - Fails the first n invocations
 * - `MockAdapter::unsupported()` - Declares every language unsupported
 * - `MockAdapter::slow(ms)` - Succeeds after a delay
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::language_registry::LanguageTag;
use crate::providers::{
    preflight, Capability, ProviderAdapter, StageInput, StagePayload, StageRequest, StageResult,
};

/// Behavior mode for the mock adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an upstream error
    Failing,
    /// Fails the first n invocations, then succeeds
    FailTimes(usize),
    /// Declares every language unsupported
    Unsupported,
    /// Always fails with a timeout
    TimingOut,
    /// Succeeds after a delay (for cancellation and progress testing)
    Slow { delay_ms: u64 },
}

/// Mock adapter for testing cascade and pipeline behavior
#[derive(Debug)]
pub struct MockAdapter {
    name: String,
    capability: Capability,
    behavior: MockBehavior,
    /// Invocation counter, shared so tests can assert call counts
    invocations: Arc<AtomicUsize>,
    /// Fixed response text, overriding the default echo
    fixed_response: Option<String>,
    /// Language to report on results, overriding the request's
    language: Option<LanguageTag>,
    max_chars: Option<usize>,
}

impl MockAdapter {
    /// Create a new mock adapter with the specified behavior
    pub fn new(name: impl Into<String>, capability: Capability, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            capability,
            behavior,
            invocations: Arc::new(AtomicUsize::new(0)),
            fixed_response: None,
            language: None,
            max_chars: None,
        }
    }

    /// Mock that always succeeds
    pub fn working(name: impl Into<String>, capability: Capability) -> Self {
        Self::new(name, capability, MockBehavior::Working)
    }

    /// Mock that always fails with an upstream error
    pub fn failing(name: impl Into<String>, capability: Capability) -> Self {
        Self::new(name, capability, MockBehavior::Failing)
    }

    /// Mock that fails the first n invocations
    pub fn fail_times(name: impl Into<String>, capability: Capability, n: usize) -> Self {
        Self::new(name, capability, MockBehavior::FailTimes(n))
    }

    /// Mock that declares every language unsupported
    pub fn unsupported(name: impl Into<String>, capability: Capability) -> Self {
        Self::new(name, capability, MockBehavior::Unsupported)
    }

    /// Mock that always times out
    pub fn timing_out(name: impl Into<String>, capability: Capability) -> Self {
        Self::new(name, capability, MockBehavior::TimingOut)
    }

    /// Mock that succeeds after a delay
    pub fn slow(name: impl Into<String>, capability: Capability, delay_ms: u64) -> Self {
        Self::new(name, capability, MockBehavior::Slow { delay_ms })
    }

    /// Return this fixed text instead of echoing the input
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.fixed_response = Some(text.into());
        self
    }

    /// Report this language on results, as a detector would
    pub fn with_language(mut self, language: LanguageTag) -> Self {
        self.language = Some(language);
        self
    }

    /// Declare an input ceiling
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    /// Number of times `invoke` has been called
    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Shared handle to the invocation counter
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.invocations)
    }

    fn payload_for(&self, request: &StageRequest) -> StagePayload {
        if self.capability == Capability::Tts {
            return StagePayload::Audio(PathBuf::from(format!("mock_{}.wav", self.name)));
        }

        if let Some(text) = &self.fixed_response {
            return StagePayload::Text(text.clone());
        }

        let echoed = match &request.input {
            StageInput::Text(text) => format!("[{}] {}", self.name, text),
            StageInput::Audio(path) => format!("[{}] transcript of {}", self.name, path.display()),
        };
        StagePayload::Text(echoed)
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn supports(&self, _source: Option<&LanguageTag>, _target: Option<&LanguageTag>) -> bool {
        self.behavior != MockBehavior::Unsupported
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn invoke(&self, request: &StageRequest) -> Result<StageResult, AdapterError> {
        preflight(self, request)?;
        let count = self.invocations.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();

        match self.behavior {
            MockBehavior::Failing => {
                return Err(AdapterError::UpstreamError {
                    status_code: 500,
                    message: format!("{} mock failure", self.name),
                });
            }
            MockBehavior::FailTimes(n) if count < n => {
                return Err(AdapterError::UpstreamError {
                    status_code: 503,
                    message: format!("{} mock failure {}", self.name, count + 1),
                });
            }
            MockBehavior::TimingOut => {
                return Err(AdapterError::Timeout(Duration::from_millis(10)));
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            _ => {}
        }

        Ok(StageResult {
            capability: self.capability,
            payload: self.payload_for(request),
            language: self.language.or(request.target).or(request.source),
            provider: self.name.clone(),
            elapsed: started.elapsed(),
        })
    }
}
