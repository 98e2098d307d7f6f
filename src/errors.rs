/*!
 * Error types for the vasha pipeline.
 *
 * This module contains custom error types for the different layers of the
 * system, using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;

use thiserror::Error;

use crate::providers::Capability;

/// Errors raised by the language code registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// The external code is not registered for the given vocabulary
    #[error("unknown language code '{code}' in vocabulary {vocabulary}")]
    UnknownLanguageCode {
        /// The code as supplied by the caller
        code: String,
        /// The vocabulary it was looked up in
        vocabulary: String,
    },

    /// The canonical tag has no representation in the requested vocabulary
    #[error("language '{language}' has no code in vocabulary {vocabulary}")]
    UnsupportedLanguageForVocabulary {
        /// Canonical 639-3 code of the language
        language: String,
        /// The vocabulary that lacks a mapping
        vocabulary: String,
    },
}

/// Errors a single provider adapter can return from one invocation
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The requested language (pair) is outside the adapter's supported set.
    /// Returned before any upstream call is made.
    #[error("{provider} does not support language '{language}'")]
    UnsupportedLanguage {
        /// Adapter name
        provider: String,
        /// The offending language, canonical 639-3 code
        language: String,
    },

    /// The input exceeds the adapter's declared maximum size
    #[error("input of {size} chars exceeds {provider} limit of {limit}")]
    InputTooLarge {
        /// Adapter name
        provider: String,
        /// Input size in characters
        size: usize,
        /// Declared maximum
        limit: usize,
    },

    /// The upstream service could not be reached at all
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream service responded with an error
    #[error("upstream error: {status_code} - {message}")]
    UpstreamError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the upstream service
        message: String,
    },

    /// The call did not complete within the adapter's timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// How one adapter in a cascade pass ended
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Not attempted: the adapter does not support the requested languages
    Skipped(String),
    /// Attempted and failed with an invocation error
    Failed(AdapterError),
}

/// Record of one adapter's outcome within an exhausted cascade
#[derive(Debug)]
pub struct AttemptRecord {
    /// Adapter name
    pub provider: String,
    /// What happened
    pub outcome: AttemptOutcome,
}

impl std::fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => write!(f, "{} skipped ({})", self.provider, reason),
            AttemptOutcome::Failed(err) => write!(f, "{} failed ({})", self.provider, err),
        }
    }
}

fn join_attempts(attempts: &[AttemptRecord]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from a full cascade pass over one capability
#[derive(Error, Debug)]
pub enum CascadeError {
    /// Every adapter in the cascade was skipped or failed
    #[error("all {capability} providers failed: {}", join_attempts(.attempts))]
    AllProvidersFailed {
        /// The capability the cascade was executed for
        capability: Capability,
        /// Per-adapter outcome, in cascade order
        attempts: Vec<AttemptRecord>,
    },
}

impl CascadeError {
    /// The attempt records behind an exhausted cascade
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::AllProvidersFailed { attempts, .. } => attempts,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the language registry
    #[error("language registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error from a single provider adapter
    #[error("provider error: {0}")]
    Adapter(#[from] AdapterError),

    /// Error from a cascade pass
    #[error("cascade error: {0}")]
    Cascade(#[from] CascadeError),

    /// Error preparing input media
    #[error("media error: {0}")]
    Media(String),

    /// Error in configuration
    #[error("config error: {0}")]
    Config(String),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Media(error.to_string())
    }
}
