/*!
 * Tests for media preparation and chunk joining
 */

use std::time::Duration;

use vasha::media::{concat_audio, prepare_audio};

use crate::common::{create_temp_dir, create_test_file};

fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .is_ok()
}

/// Write a short sine tone in the given container, or report that the
/// local ffmpeg cannot (missing encoder)
fn generate_tone(path: &std::path::Path) -> bool {
    std::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:duration=0.2",
            path.to_str().unwrap(),
        ])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_prepareAudio_withWavInput_shouldPassThroughUntouched() {
    let temp_dir = create_temp_dir().unwrap();
    let input = create_test_file(&temp_dir.path().to_path_buf(), "clip.wav", "riff").unwrap();
    let output = temp_dir.path().join("prepared.wav");

    let prepared = prepare_audio(&input, &output, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(prepared, input);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_prepareAudio_withMissingInput_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let missing = temp_dir.path().join("missing.webm");

    let result = prepare_audio(&missing, &temp_dir.path().join("out.wav"), Duration::from_secs(5)).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[tokio::test]
async fn test_concatAudio_withNoChunks_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let output = temp_dir.path().join("joined.wav");

    let result = concat_audio(&[], &output, Duration::from_secs(5)).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_concatAudio_withOneChunk_shouldPassItThroughUnjoined() {
    let temp_dir = create_temp_dir().unwrap();
    let only = create_test_file(&temp_dir.path().to_path_buf(), "part0.mp3", "tone").unwrap();
    let output = temp_dir.path().join("joined.wav");

    let joined = concat_audio(&[only.clone()], &output, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(joined, only);
    assert!(!output.exists());
}

/// A mid-stream fallback can leave chunks in different formats; the join
/// must still produce one playable file
#[tokio::test]
async fn test_concatAudio_withMixedFormatChunks_shouldJoinIntoOneWav() {
    if !ffmpeg_available() {
        return;
    }
    let temp_dir = create_temp_dir().unwrap();
    let wav = temp_dir.path().join("part0.wav");
    let mp3 = temp_dir.path().join("part1.mp3");
    if !generate_tone(&wav) || !generate_tone(&mp3) {
        return;
    }
    let output = temp_dir.path().join("joined.wav");

    let joined = concat_audio(&[wav, mp3], &output, Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(joined, output);
    assert!(output.metadata().unwrap().len() > 0);
}
