use crate::{IpcMessage, ShellError};

use serde_json::json;

/// WHAT: Every channel in the renderer surface decodes
/// WHY: The renderer talks to the shell only through these channels
#[test]
#[allow(clippy::unwrap_used)]
fn given_known_channels_when_decoding_then_messages_match() {
    // Given/When/Then
    assert_eq!(
        IpcMessage::from_json(r#"{"channel":"download:start"}"#).unwrap(),
        IpcMessage::DownloadStart
    );
    assert_eq!(
        IpcMessage::from_json(r#"{"channel":"scan:init","args":[]}"#).unwrap(),
        IpcMessage::ScanInit
    );
    assert_eq!(
        IpcMessage::from_json(r#"{"channel":"app:loaded"}"#).unwrap(),
        IpcMessage::AppLoaded
    );
    assert_eq!(
        IpcMessage::from_json(r#"{"channel":"download:complete","args":[{"resize":true}]}"#)
            .unwrap(),
        IpcMessage::DownloadComplete { resize: true }
    );
}

/// WHAT: scan:violation carries the badge image and count
/// WHY: Both are needed to render the badge or overlay
#[test]
#[allow(clippy::unwrap_used)]
fn given_violation_args_when_decoding_then_badge_and_count_extracted() {
    // Given: Positional args
    let args = [json!("data:image/png;base64,AAAA"), json!(3)];

    // When: Decoding
    let message = IpcMessage::from_parts("scan:violation", &args).unwrap();

    // Then: Fields extracted
    assert_eq!(
        message,
        IpcMessage::ScanViolation {
            badge_data_url: "data:image/png;base64,AAAA".to_string(),
            violation_count: 3,
        }
    );
    assert_eq!(message.channel(), "scan:violation");
}

/// WHAT: A negative violation count is rejected
/// WHY: Badge counts are non-negative
#[test]
fn given_negative_count_when_decoding_violation_then_invalid_message() {
    // Given: Negative count
    let args = [json!("data:image/png;base64,AAAA"), json!(-1)];

    // When/Then: Rejected
    assert!(matches!(
        IpcMessage::from_parts("scan:violation", &args),
        Err(ShellError::InvalidIpcMessage { .. })
    ));
}

/// WHAT: Unknown channels are rejected
/// WHY: The IPC surface is closed
#[test]
fn given_unknown_channel_when_decoding_then_invalid_message() {
    // Given/When/Then
    assert!(matches!(
        IpcMessage::from_json(r#"{"channel":"shell:exec","args":["rm"]}"#),
        Err(ShellError::InvalidIpcMessage { .. })
    ));
}

/// WHAT: download:complete without a payload does not resize
/// WHY: Only an explicit resize request restores the window
#[test]
#[allow(clippy::unwrap_used)]
fn given_bare_download_complete_when_decoding_then_resize_false() {
    // Given/When/Then
    assert_eq!(
        IpcMessage::from_parts("download:complete", &[]).unwrap(),
        IpcMessage::DownloadComplete { resize: false }
    );
}
