/*!
 * End-to-end pipeline tests over mock provider cascades
 */

use std::sync::Arc;
use std::time::Duration;

use vasha::pipeline::{
    CancelFlag, PipelineCoordinator, PipelineInput, PipelineRequest, PipelineStatus,
};
use vasha::providers::{Capability, MockAdapter};

use crate::common::{create_temp_dir, create_test_file, mock_adapters, tag, test_config};

/// Test a full text-to-speech run: translate, then synthesize
#[tokio::test]
async fn test_run_withTextInput_shouldTranslateAndSynthesize() {
    let temp_dir = create_temp_dir().unwrap();
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(
            Capability::Mt,
            MockAdapter::working("mt", Capability::Mt).with_response("नमस्ते"),
        ),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let request = PipelineRequest::new(PipelineInput::Text("Hello there.".to_string()))
        .source(tag("eng"))
        .target(tag("hin"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert!(result.failure.is_none());
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.translation(), Some("नमस्ते"));
    assert!(result.audio().is_some());
    assert!(result.transcript().is_none());
}

/// Test that a late-stage failure keeps the earlier stages' results
#[tokio::test]
async fn test_run_withSynthesisDown_shouldKeepTranslationAndReportPartial() {
    let temp_dir = create_temp_dir().unwrap();
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(
            Capability::Mt,
            MockAdapter::working("mt", Capability::Mt).with_response("नमस्ते"),
        ),
        mock_adapters::single(Capability::Tts, MockAdapter::failing("tts", Capability::Tts)),
    );

    let request = PipelineRequest::new(PipelineInput::Text("Hello there.".to_string()))
        .source(tag("eng"))
        .target(tag("hin"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::PartiallyCompleted);
    assert_eq!(result.stages.len(), 1);
    assert_eq!(result.translation(), Some("नमस्ते"));
    assert!(result.audio().is_none());
    let failure = result.failure.unwrap();
    assert!(failure.contains("all tts providers failed"), "{}", failure);
}

/// Test that a first-stage failure yields a failed result, not a panic
#[tokio::test]
async fn test_run_withTranslationDown_shouldFailWithNoStages() {
    let temp_dir = create_temp_dir().unwrap();
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(Capability::Mt, MockAdapter::failing("mt", Capability::Mt)),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let request = PipelineRequest::new(PipelineInput::Text("Hello there.".to_string()))
        .source(tag("eng"))
        .target(tag("hin"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::Failed);
    assert!(result.stages.is_empty());
    assert!(result.failure.unwrap().contains("all mt providers failed"));
}

/// Test that translation is skipped when source and target already match
#[tokio::test]
async fn test_run_withMatchingLanguages_shouldSkipTranslation() {
    let temp_dir = create_temp_dir().unwrap();
    let mt = Arc::new(MockAdapter::working("mt", Capability::Mt));
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::spec(Capability::Mt, vec![mt.clone()]),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let request = PipelineRequest::new(PipelineInput::Text("पहले से हिंदी".to_string()))
        .source(tag("hin"))
        .target(tag("hin"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(mt.invocation_count(), 0);
    assert!(result.translation().is_none());
    assert!(result.audio().is_some());
}

/// Test that translation refuses to guess when no source language is known
#[tokio::test]
async fn test_run_withUnknownSource_shouldFailExplicitly() {
    let temp_dir = create_temp_dir().unwrap();
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(Capability::Mt, MockAdapter::working("mt", Capability::Mt)),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let request =
        PipelineRequest::new(PipelineInput::Text("Mystery text".to_string())).target(tag("hin"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::Failed);
    assert!(result.failure.unwrap().contains("source language unknown"));
}

/// Test cancellation between stages: the in-flight stage finishes, the
/// next one never starts
#[tokio::test]
async fn test_run_withCancellationDuringTranslation_shouldSkipSynthesis() {
    let temp_dir = create_temp_dir().unwrap();
    let tts = Arc::new(MockAdapter::working("tts", Capability::Tts));
    let coordinator = Arc::new(PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(Capability::Mt, MockAdapter::slow("mt", Capability::Mt, 200)),
        mock_adapters::spec(Capability::Tts, vec![tts.clone()]),
    ));

    let request = PipelineRequest::new(PipelineInput::Text("Hello there.".to_string()))
        .source(tag("eng"))
        .target(tag("hin"));

    let cancel = CancelFlag::new();
    let job = {
        let coordinator = Arc::clone(&coordinator);
        let cancel = cancel.clone();
        tokio::spawn(async move { coordinator.run(request, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let result = job.await.unwrap();

    assert_eq!(result.status, PipelineStatus::PartiallyCompleted);
    assert!(result.failure.is_none());
    assert_eq!(result.stages.len(), 1);
    assert!(result.translation().is_some());
    assert_eq!(tts.invocation_count(), 0);
}

/// Test that a job cancelled before it starts does no work: no transcode,
/// no recognition, nothing
#[tokio::test]
async fn test_run_withPreCancelledFlag_shouldRunNoStages() {
    let temp_dir = create_temp_dir().unwrap();
    let clip = create_test_file(
        &temp_dir.path().to_path_buf(),
        "clip.wav",
        "not real audio, recognition is mocked",
    )
    .unwrap();

    let asr = Arc::new(MockAdapter::working("asr", Capability::Asr).with_language(tag("hin")));
    let mt = Arc::new(MockAdapter::working("mt", Capability::Mt));
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::spec(Capability::Asr, vec![asr.clone()]),
        mock_adapters::spec(Capability::Mt, vec![mt.clone()]),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let cancel = CancelFlag::new();
    cancel.cancel();
    let request = PipelineRequest::new(PipelineInput::MediaFile(clip)).target(tag("eng"));
    let result = coordinator.run(request, cancel).await;

    assert_eq!(result.status, PipelineStatus::PartiallyCompleted);
    assert!(result.failure.is_none());
    assert!(result.stages.is_empty());
    assert_eq!(asr.invocation_count(), 0);
    assert_eq!(mt.invocation_count(), 0);
}

/// Test the recognized language feeding translation, end to end
#[tokio::test]
async fn test_run_withMediaInput_shouldThreadDetectedLanguageThrough() {
    let temp_dir = create_temp_dir().unwrap();
    let clip = create_test_file(
        &temp_dir.path().to_path_buf(),
        "clip.wav",
        "not real audio, recognition is mocked",
    )
    .unwrap();

    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::single(
            Capability::Asr,
            MockAdapter::working("asr", Capability::Asr)
                .with_response("यह एक परीक्षण है")
                .with_language(tag("hin")),
        ),
        mock_adapters::single(
            Capability::Mt,
            MockAdapter::working("mt", Capability::Mt).with_response("This is a test"),
        ),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );

    let request = PipelineRequest::new(PipelineInput::MediaFile(clip)).target(tag("eng"));
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(result.stages.len(), 3);
    assert_eq!(result.transcript(), Some("यह एक परीक्षण है"));
    assert_eq!(result.stage(Capability::Asr).unwrap().language, Some(tag("hin")));
    assert_eq!(result.translation(), Some("This is a test"));
    assert!(result.audio().is_some());
}

/// Test the progress board over a whole run
#[tokio::test]
async fn test_run_shouldLeaveTerminalProgressOnTheBoard() {
    let temp_dir = create_temp_dir().unwrap();
    let coordinator = PipelineCoordinator::with_specs(
        test_config(&temp_dir),
        mock_adapters::unused(Capability::Asr),
        mock_adapters::single(Capability::Mt, MockAdapter::working("mt", Capability::Mt)),
        mock_adapters::single(Capability::Tts, MockAdapter::working("tts", Capability::Tts)),
    );
    let board = coordinator.board();

    let request = PipelineRequest::new(PipelineInput::Text("Hello there.".to_string()))
        .source(tag("eng"))
        .target(tag("hin"));
    let id = request.correlation_id;
    let result = coordinator.run(request, CancelFlag::new()).await;

    assert_eq!(result.correlation_id, id);
    assert_eq!(board.poll(&id), Some(100));
    board.remove(&id);
    assert!(board.poll(&id).is_none());
}
