use crate::{DeepLinkIntent, DeepLinkPayload, DeepLinkSlot, LaunchArgs, ScanStatus, ShellError, classify};

/// WHAT: A URL containing "update" requests an update
/// WHY: Deep links like stethoscope://update/check launch into the updater
#[test]
fn given_update_url_when_classifying_then_update_requested() {
    // Given: An update deep link
    let payload = DeepLinkPayload::Url("stethoscope://update/check".to_string());

    // When: Classifying
    let intent = classify(&payload);

    // Then: Update is requested
    assert_eq!(intent, DeepLinkIntent::UpdateRequested);
}

/// WHAT: A URL without "update" is a plain launch
/// WHY: Only update links may trigger the updater
#[test]
fn given_plain_url_when_classifying_then_no_intent() {
    // Given: A plain deep link
    let payload = DeepLinkPayload::Url("stethoscope://open".to_string());

    // When/Then: Classified as plain launch
    assert_eq!(classify(&payload), DeepLinkIntent::None);
}

/// WHAT: Matching is case-sensitive
/// WHY: The token is matched literally, "UPDATE" is not the token
#[test]
fn given_uppercase_token_when_classifying_then_no_intent() {
    // Given: Uppercase token
    let payload = DeepLinkPayload::Url("stethoscope://UPDATE".to_string());

    // When/Then: Not an update request
    assert_eq!(classify(&payload), DeepLinkIntent::None);
}

/// WHAT: The token may appear anywhere, even inside another word
/// WHY: Classification is a plain substring test over the payload
#[test]
fn given_token_inside_word_when_classifying_then_update_requested() {
    // Given: "update" embedded in a longer word
    let payload = DeepLinkPayload::Url("stethoscope://settings?autoupdates=1".to_string());

    // When/Then: Still an update request
    assert_eq!(classify(&payload), DeepLinkIntent::UpdateRequested);
}

/// WHAT: Argument lists are matched over their joined form
/// WHY: Command-line deep links carry the URL as one of several arguments
#[test]
fn given_args_with_update_when_classifying_then_update_requested() {
    // Given: Arguments including an update link
    let payload = DeepLinkPayload::Args(vec![
        "--flag".to_string(),
        "stethoscope://update".to_string(),
    ]);

    // When/Then: Update requested, string form is comma-joined
    assert_eq!(classify(&payload), DeepLinkIntent::UpdateRequested);
    assert_eq!(payload.to_payload_string(), "--flag,stethoscope://update");
}

/// WHAT: An empty argument list is a plain launch
/// WHY: Launching from the app icon carries no payload
#[test]
fn given_empty_args_when_classifying_then_no_intent() {
    // Given/When/Then
    assert_eq!(classify(&DeepLinkPayload::Args(Vec::new())), DeepLinkIntent::None);
}

/// WHAT: The slot hands out a remembered intent exactly once
/// WHY: A consumed deep link must not fire a second update check
#[test]
fn given_remembered_update_when_taking_twice_then_second_take_is_none() {
    // Given: A slot holding an update request
    let mut slot = DeepLinkSlot::default();
    slot.remember(DeepLinkIntent::UpdateRequested);

    // When: Taking twice
    let first = slot.take();
    let second = slot.take();

    // Then: Only the first take sees the request
    assert_eq!(first, DeepLinkIntent::UpdateRequested);
    assert_eq!(second, DeepLinkIntent::None);
}

/// WHAT: Remembering a plain intent keeps a pending update
/// WHY: A later plain activation must not cancel an earlier update link
#[test]
fn given_pending_update_when_remembering_plain_intent_then_update_kept() {
    // Given: Pending update
    let mut slot = DeepLinkSlot::default();
    slot.remember(DeepLinkIntent::UpdateRequested);

    // When: A plain intent arrives
    slot.remember(DeepLinkIntent::None);

    // Then: Update still pending
    assert_eq!(slot.peek(), DeepLinkIntent::UpdateRequested);
}

/// WHAT: Launch args drop the executable and detect the debugger flag
/// WHY: The executable path is not part of the deep-link payload
#[test]
fn given_argv_with_debugger_flag_when_parsing_then_flag_set_and_exe_skipped() {
    // Given: An argv with the debugger flag
    let argv = ["stethoscope.exe", "--enableDebugger", "stethoscope://open"];

    // When: Parsing
    let launch = LaunchArgs::parse(argv);

    // Then: Flag detected, executable excluded
    assert!(launch.enable_debugger);
    assert_eq!(
        launch.payload,
        DeepLinkPayload::Args(vec![
            "--enableDebugger".to_string(),
            "stethoscope://open".to_string()
        ])
    );
}

/// WHAT: An executable path containing "update" is not a deep link
/// WHY: Installs under an "update" directory must not launch into the updater
#[test]
fn given_exe_path_with_token_when_parsing_then_payload_is_plain() {
    // Given: Executable inside an "updates" directory
    let launch = LaunchArgs::parse(["C:\\updates\\stethoscope.exe"]);

    // When/Then: Payload has no token
    assert!(!launch.enable_debugger);
    assert_eq!(classify(&launch.payload), DeepLinkIntent::None);
}

/// WHAT: Scan statuses parse from their wire names only
/// WHY: The server reports statuses as upper-case strings
#[test]
fn given_wire_names_when_parsing_scan_status_then_known_names_accepted() {
    // Given/When/Then
    assert_eq!("PASS".parse::<ScanStatus>().ok(), Some(ScanStatus::Pass));
    assert_eq!("NUDGE".parse::<ScanStatus>().ok(), Some(ScanStatus::Nudge));
    assert_eq!("FAIL".parse::<ScanStatus>().ok(), Some(ScanStatus::Fail));
    assert!(matches!(
        "pass".parse::<ScanStatus>(),
        Err(ShellError::InvalidScanStatus { .. })
    ));
    assert_eq!(ScanStatus::default(), ScanStatus::Pass);
}
