/*!
 * Media preparation.
 *
 * The speech recognition services expect mono 16 kHz WAV. Browser uploads
 * arrive as webm (or whatever the container of the day is) and remote jobs
 * arrive as URLs, so this module shells out to ffmpeg and yt-dlp to get
 * everything into that shape before the first adapter runs.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{info, warn};
use tokio::process::Command;

/// Extensions the recognition services take as-is
const READY_EXTENSIONS: &[&str] = &["wav"];

/// Whether a local file already has the shape the recognizers want
fn is_prepared(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| READY_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Transcode a local audio/video file to mono 16 kHz WAV next to `output`.
///
/// If ffmpeg fails, the original file is returned and recognition gets to
/// try its luck with the raw container; the backends cope with more formats
/// than they advertise.
pub async fn prepare_audio(input: &Path, output: &Path, timeout: Duration) -> Result<PathBuf> {
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }
    if is_prepared(input) {
        return Ok(input.to_path_buf());
    }

    let ffmpeg_future = Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
            input.to_str().unwrap_or_default(),
            "-ar",
            "16000",
            "-ac",
            "1",
            output.to_str().unwrap_or_default(),
        ])
        .output();

    let result = tokio::select! {
        result = ffmpeg_future => {
            match result {
                Ok(output) => output,
                Err(e) => {
                    warn!("Failed to execute ffmpeg, using the raw file: {}", e);
                    return Ok(input.to_path_buf());
                }
            }
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("ffmpeg timed out after {:?}", timeout));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!("ffmpeg transcode failed, using the raw file: {}", last_stderr_line(&stderr));
        return Ok(input.to_path_buf());
    }

    info!("Transcoded {} to 16 kHz mono wav", input.display());
    Ok(output.to_path_buf())
}

/// Fetch a remote URL's audio track as WAV via yt-dlp.
pub async fn fetch_remote_audio(url: &str, output: &Path, timeout: Duration) -> Result<PathBuf> {
    let template = output.with_extension("");
    let ytdlp_future = Command::new("yt-dlp")
        .args([
            "-x",
            "--audio-format",
            "wav",
            "-o",
            &format!("{}.%(ext)s", template.display()),
            url,
        ])
        .output();

    let result = tokio::select! {
        result = ytdlp_future => {
            result.map_err(|e| anyhow!("Failed to execute yt-dlp: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("yt-dlp timed out after {:?}", timeout));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(anyhow!("yt-dlp failed: {}", last_stderr_line(&stderr)));
    }

    let fetched = template.with_extension("wav");
    if !fetched.exists() {
        return Err(anyhow!("yt-dlp reported success but {} is missing", fetched.display()));
    }
    info!("Fetched {} to {}", url, fetched.display());
    Ok(fetched)
}

/// Join per-chunk synthesis outputs into one file.
///
/// A fallback mid-stream means the chunks can come from different backends
/// in different formats (XTTS and Indic TTS write wav, gTTS writes mp3, at
/// varying sample rates), and ffmpeg's concat demuxer requires uniform
/// streams. Every chunk is therefore normalized to mono 24 kHz wav first,
/// then the parts are joined.
pub async fn concat_audio(inputs: &[PathBuf], output: &Path, timeout: Duration) -> Result<PathBuf> {
    if inputs.is_empty() {
        return Err(anyhow!("No audio chunks to join"));
    }
    if inputs.len() == 1 {
        return Ok(inputs[0].clone());
    }

    let staging = tempfile::tempdir()?;
    let mut normalized: Vec<PathBuf> = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let part = staging.path().join(format!("part_{}.wav", index));
        run_ffmpeg(
            &[
                "-y",
                "-i",
                input.to_str().unwrap_or_default(),
                "-ar",
                "24000",
                "-ac",
                "1",
                part.to_str().unwrap_or_default(),
            ],
            timeout,
            "normalize",
        )
        .await?;
        normalized.push(part);
    }

    let mut list = String::new();
    for part in &normalized {
        list.push_str(&format!("file '{}'\n", part.display()));
    }
    // The list file must outlive the ffmpeg run
    let list_file = tempfile::NamedTempFile::new()?;
    std::fs::write(list_file.path(), list)?;

    run_ffmpeg(
        &[
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            list_file.path().to_str().unwrap_or_default(),
            output.to_str().unwrap_or_default(),
        ],
        timeout,
        "concat",
    )
    .await?;

    info!("Joined {} audio chunks into {}", inputs.len(), output.display());
    Ok(output.to_path_buf())
}

/// One ffmpeg invocation with the shared timeout and stderr handling
async fn run_ffmpeg(args: &[&str], timeout: Duration, what: &str) -> Result<()> {
    let future = Command::new("ffmpeg").args(args).output();

    let result = tokio::select! {
        result = future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg for {}: {}", what, e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("ffmpeg {} timed out after {:?}", what, timeout));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(anyhow!("ffmpeg {} failed: {}", what, last_stderr_line(&stderr)));
    }
    Ok(())
}

/// The last non-empty stderr line, which is where ffmpeg and yt-dlp put
/// the actual error under all the banner noise
fn last_stderr_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .to_string()
}
