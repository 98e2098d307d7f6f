/*!
 * Tests for the provider adapter contract and the mock adapter
 */

use std::path::PathBuf;
use std::str::FromStr;

use uuid::Uuid;

use vasha::errors::AdapterError;
use vasha::providers::{
    Capability, MockAdapter, ProviderAdapter, ProviderKind, StageInput, StageRequest,
};

use crate::common::tag;

fn text_request(text: &str) -> StageRequest {
    StageRequest::text(Uuid::new_v4(), text, tag("hin"), tag("eng"))
}

/// Test provider kind parsing, including the accepted aliases
#[test]
fn test_providerKind_fromStr_shouldAcceptNamesAndAliases() {
    assert_eq!(ProviderKind::from_str("whisper").unwrap(), ProviderKind::Whisper);
    assert_eq!(ProviderKind::from_str("indictrans").unwrap(), ProviderKind::IndicTrans);
    assert_eq!(ProviderKind::from_str("indic_trans").unwrap(), ProviderKind::IndicTrans);
    assert_eq!(ProviderKind::from_str("conformer").unwrap(), ProviderKind::IndicConformer);
    assert_eq!(ProviderKind::from_str(" GOOGLE ").unwrap(), ProviderKind::Google);
    assert!(ProviderKind::from_str("bing").is_err());
}

/// Test that display names parse back to the same kind
#[test]
fn test_providerKind_display_shouldRoundTripThroughFromStr() {
    for kind in [
        ProviderKind::Whisper,
        ProviderKind::IndicConformer,
        ProviderKind::IndicTrans,
        ProviderKind::Google,
        ProviderKind::Nllb,
        ProviderKind::Xtts,
        ProviderKind::Gtts,
        ProviderKind::IndicTts,
    ] {
        let parsed = ProviderKind::from_str(&kind.to_string()).unwrap();
        assert_eq!(parsed, kind);
    }
}

/// Test the wire spelling of capabilities
#[test]
fn test_capability_serde_shouldUseLowercaseNames() {
    assert_eq!(serde_json::to_string(&Capability::Asr).unwrap(), "\"asr\"");
    assert_eq!(serde_json::to_string(&Capability::Tts).unwrap(), "\"tts\"");
    let parsed: Capability = serde_json::from_str("\"mt\"").unwrap();
    assert_eq!(parsed, Capability::Mt);
}

/// Test input sizing: characters for text, unbounded for audio
#[test]
fn test_stageInput_size_shouldCountCharsForTextOnly() {
    assert_eq!(StageInput::Text("hello".to_string()).size(), Some(5));
    assert_eq!(StageInput::Text("नमस्ते".to_string()).size(), Some(6));
    assert_eq!(StageInput::Audio(PathBuf::from("clip.wav")).size(), None);
}

/// Test request derivation for chunked passes
#[test]
fn test_stageRequest_withTextAndChunk_shouldKeepIdentityAndLanguages() {
    let base = text_request("whole text");
    let derived = base.with_text("one piece").with_chunk(3);

    assert_eq!(derived.correlation_id, base.correlation_id);
    assert_eq!(derived.source, base.source);
    assert_eq!(derived.target, base.target);
    assert_eq!(derived.chunk, Some(3));
    assert!(matches!(derived.input, StageInput::Text(ref t) if t == "one piece"));
    assert_eq!(base.chunk, None);
}

/// Test the working mock's echo behavior
#[tokio::test]
async fn test_mockAdapter_working_shouldEchoAndCount() {
    let mock = MockAdapter::working("echo", Capability::Mt);

    let result = mock.invoke(&text_request("hello")).await.unwrap();
    assert_eq!(result.payload.as_text(), Some("[echo] hello"));
    assert_eq!(result.provider, "echo");
    assert_eq!(mock.invocation_count(), 1);

    mock.invoke(&text_request("again")).await.unwrap();
    assert_eq!(mock.invocation_count(), 2);
}

/// Test the failing and recovering mock behaviors
#[tokio::test]
async fn test_mockAdapter_failTimes_shouldRecoverAfterNFailures() {
    let mock = MockAdapter::fail_times("recovering", Capability::Mt, 2);

    assert!(mock.invoke(&text_request("a")).await.is_err());
    assert!(mock.invoke(&text_request("b")).await.is_err());
    assert!(mock.invoke(&text_request("c")).await.is_ok());
    assert_eq!(mock.invocation_count(), 3);
}

/// Test the typed errors the mocks produce
#[tokio::test]
async fn test_mockAdapter_errorBehaviors_shouldUseTheTypedVariants() {
    let failing = MockAdapter::failing("down", Capability::Mt);
    let error = failing.invoke(&text_request("x")).await.unwrap_err();
    assert!(matches!(error, AdapterError::UpstreamError { status_code: 500, .. }));

    let timing_out = MockAdapter::timing_out("stuck", Capability::Mt);
    let error = timing_out.invoke(&text_request("x")).await.unwrap_err();
    assert!(matches!(error, AdapterError::Timeout(_)));

    let unsupported = MockAdapter::unsupported("narrow", Capability::Mt);
    assert!(!unsupported.supports(None, None));
    let error = unsupported.invoke(&text_request("x")).await.unwrap_err();
    assert!(matches!(error, AdapterError::UnsupportedLanguage { .. }));
}

/// Test the input ceiling preflight
#[tokio::test]
async fn test_mockAdapter_withMaxChars_shouldRejectOversizedInput() {
    let mock = MockAdapter::working("bounded", Capability::Mt).with_max_chars(5);

    let error = mock.invoke(&text_request("way past the limit")).await.unwrap_err();
    let AdapterError::InputTooLarge { size, limit, .. } = error else {
        panic!("expected InputTooLarge");
    };
    assert_eq!(size, 18);
    assert_eq!(limit, 5);

    // Rejected before the behavior runs, so the call is not counted
    assert_eq!(mock.invocation_count(), 0);

    assert!(mock.invoke(&text_request("tiny")).await.is_ok());
}

/// Test the fixed response and reported language overrides
#[tokio::test]
async fn test_mockAdapter_withOverrides_shouldUseThem() {
    let mock = MockAdapter::working("fixed", Capability::Mt)
        .with_response("Hello")
        .with_language(tag("ben"));

    let result = mock.invoke(&text_request("नमस्ते")).await.unwrap();
    assert_eq!(result.payload.as_text(), Some("Hello"));
    assert_eq!(result.language, Some(tag("ben")));
}

/// Test that synthesis mocks yield audio payloads
#[tokio::test]
async fn test_mockAdapter_withTtsCapability_shouldYieldAudio() {
    let mock = MockAdapter::working("voice", Capability::Tts);
    let request = StageRequest::text(Uuid::new_v4(), "say this", tag("hin"), tag("hin"));

    let result = mock.invoke(&request).await.unwrap();
    assert_eq!(result.capability, Capability::Tts);
    assert_eq!(result.payload.as_audio(), Some(&PathBuf::from("mock_voice.wav")));
}
