/*!
 * Common test utilities for the vasha test suite
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use vasha::app_config::Config;
use vasha::language_registry::{LanguageRegistry, LanguageTag};

// Re-export the mock adapters module
pub mod mock_adapters;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Configuration pointed at a temp output dir, with fast progress ticks
pub fn test_config(output_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.output_dir = output_dir.path().to_string_lossy().to_string();
    config.progress.interval_ms = 50;
    config
}

/// Canonical tag for a language code, panicking on unknown codes
pub fn tag(code: &str) -> LanguageTag {
    LanguageRegistry::global()
        .resolve(code)
        .unwrap_or_else(|e| panic!("test language {} not in registry: {}", code, e))
}
