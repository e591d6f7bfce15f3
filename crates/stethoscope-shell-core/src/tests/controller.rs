use crate::{
    ALREADY_RUNNING_NOTICE, APP_ORIGIN, APP_SCHEME, DeepLinkIntent, Flow, InstanceRole,
    IpcMessage, LifecycleState, Platform, RequestHeaders, ServerEvent, ServerFault, ShellEvent,
    TrayAction, UpdateCheckKind,
    tests::fakes::{Harness, HarnessOptions},
};

use std::{path::PathBuf, sync::atomic::Ordering};

fn windows_argv(extra: &[&str]) -> Vec<String> {
    std::iter::once("C:\\Program Files\\Stethoscope\\Stethoscope.exe")
        .chain(extra.iter().copied())
        .map(str::to_string)
        .collect()
}

fn assert_single_window_and_tray(harness: &Harness) {
    assert!(harness.desktop.live_windows.get() <= 1);
    assert!(harness.desktop.live_trays.get() <= 1);
    assert!(!harness.desktop.overlapping_windows);
    assert!(!harness.desktop.overlapping_trays);
}

/// WHAT: Ready as primary starts everything and runs the first-launch check
/// WHY: A normal launch must end up fully wired
#[tokio::test]
async fn given_primary_when_ready_then_session_active_and_wired() {
    // Given/When
    let mut harness = Harness::ready(HarnessOptions::default());

    // Then
    let session = harness.controller.session();
    assert_eq!(session.state(), LifecycleState::Active);
    assert!(session.server_listening());
    assert!(!session.is_first_launch());
    assert!(session.tray().is_some());
    assert_eq!(harness.desktop.protocols, vec![APP_SCHEME.to_string()]);
    assert_eq!(harness.updates.kinds(), vec![UpdateCheckKind::CheckAndNotify]);
    assert!(harness.server_hooks.lock().is_ok_and(|hooks| hooks.is_some()));

    // And: The header hook stamps the app origin
    let mut headers = RequestHeaders::new();
    assert!(harness.desktop.apply_headers_hook(&mut headers));
    assert_eq!(headers.get("Origin").map(String::as_str), Some(APP_ORIGIN));

    // And: A second Ready changes nothing
    assert_eq!(harness.send(ShellEvent::Ready), Flow::Continue);
    assert_eq!(harness.desktop.windows_created, 1);
    assert_eq!(harness.updates.count(), 1);
}

/// WHAT: A secondary launch quits without windows or update checks
/// WHY: The primary handles the forwarded launch
#[tokio::test]
async fn given_secondary_when_ready_then_quits_without_window() {
    // Given
    let mut harness = Harness::new(HarnessOptions {
        platform: Platform::Windows,
        argv: windows_argv(&["stethoscope://update"]),
        role: Some(InstanceRole::Secondary),
        ..HarnessOptions::default()
    });

    // When
    let flow = harness.send(ShellEvent::Ready);

    // Then
    assert_eq!(flow, Flow::Quit);
    assert_eq!(harness.desktop.windows_created, 0);
    assert_eq!(harness.desktop.trays_created, 0);
    assert_eq!(harness.updates.count(), 0);
    assert_eq!(
        harness.lock_calls.lock().map(|calls| calls.clone()).unwrap_or_default(),
        vec![windows_argv(&["stethoscope://update"])]
    );
}

/// WHAT: A lock failure is fatal
/// WHY: Running without the lock could start two primaries
#[tokio::test]
async fn given_lock_error_when_ready_then_exit_with_failure() {
    // Given
    let mut harness = Harness::new(HarnessOptions {
        role: None,
        ..HarnessOptions::default()
    });

    // When/Then
    assert_eq!(harness.send(ShellEvent::Ready), Flow::Exit(1));
    assert_eq!(harness.desktop.windows_created, 0);
}

/// WHAT: Window creation failure is fatal
/// WHY: The shell has nothing to show without its window
#[tokio::test]
async fn given_window_failure_when_ready_then_exit_with_failure() {
    // Given
    let mut harness = Harness::new(HarnessOptions::default());
    harness.desktop.fail_window_creation = true;

    // When/Then
    assert_eq!(harness.send(ShellEvent::Ready), Flow::Exit(1));
    assert!(!harness.server.listening.load(Ordering::SeqCst));
}

/// WHAT: An update link on the Windows command line fires once, at app:loaded
/// WHY: The update UI needs the renderer loaded, and must not repeat
#[tokio::test]
async fn given_windows_update_argv_when_app_loaded_twice_then_one_interactive_check() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Windows,
        argv: windows_argv(&["stethoscope://update"]),
        ..HarnessOptions::default()
    });
    assert_eq!(
        harness.controller.session().pending_deep_link(),
        DeepLinkIntent::UpdateRequested
    );
    assert_eq!(harness.updates.interactive_count(), 0);

    // When
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));

    // Then
    assert_eq!(harness.updates.interactive_count(), 1);
    assert_eq!(
        harness.controller.session().pending_deep_link(),
        DeepLinkIntent::None
    );
}

/// WHAT: On macOS the command line is not a deep-link source
/// WHY: macOS delivers links through open-url
#[tokio::test]
async fn given_macos_update_argv_when_app_loaded_then_no_check() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        argv: vec![
            "/Applications/Stethoscope".to_string(),
            "stethoscope://update".to_string(),
        ],
        ..HarnessOptions::default()
    });

    // When
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));

    // Then
    assert_eq!(harness.updates.interactive_count(), 0);
}

/// WHAT: An update link that arrives before Ready triggers during Ready
/// WHY: macOS can deliver open-url before the app finished launching
#[tokio::test]
async fn given_open_url_before_ready_when_ready_then_update_triggered_once() {
    // Given
    let mut harness = Harness::new(HarnessOptions::default());
    harness.send(ShellEvent::OpenUrl("stethoscope://update".to_string()));
    assert_eq!(harness.updates.count(), 0);

    // When
    harness.send(ShellEvent::Ready);
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));

    // Then: First-launch check plus exactly one interactive check
    assert_eq!(harness.updates.interactive_count(), 1);
    assert_eq!(harness.updates.count(), 2);
}

/// WHAT: An update link while the window is open triggers right away
/// WHY: The renderer is already loaded
#[tokio::test]
async fn given_window_open_when_update_url_arrives_then_update_triggered_and_focused() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    harness.send(ShellEvent::OpenUrl("stethoscope://update".to_string()));
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));

    // Then
    assert_eq!(harness.updates.interactive_count(), 1);
    assert!(harness.window().is_some_and(|w| w.focuses == 1));
}

/// WHAT: A plain link only focuses the window
/// WHY: Only update links run the updater
#[tokio::test]
async fn given_plain_url_when_open_url_then_no_update() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    harness.send(ShellEvent::OpenUrl("stethoscope://open".to_string()));

    // Then
    assert_eq!(harness.updates.interactive_count(), 0);
    assert!(harness.window().is_some_and(|w| w.focuses == 1));
}

/// WHAT: A Windows second launch with an update link runs one check
/// WHY: Windows delivers deep links by relaunching the executable
#[tokio::test]
async fn given_windows_second_instance_with_update_when_received_then_one_check() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Windows,
        argv: windows_argv(&[]),
        ..HarnessOptions::default()
    });

    // When
    harness.send(ShellEvent::SecondInstance {
        args: windows_argv(&["stethoscope://update"]),
        cwd: PathBuf::from("C:\\"),
    });
    harness.send(ShellEvent::Ipc(IpcMessage::AppLoaded));

    // Then: Immediate, not stored for app:loaded
    assert_eq!(harness.updates.interactive_count(), 1);
    assert!(harness.window().is_some_and(|w| w.focuses == 1));
}

/// WHAT: A second launch without a link only focuses
/// WHY: Launching from the start menu brings the app forward
#[tokio::test]
async fn given_second_instance_without_link_when_received_then_focus_only() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Windows,
        argv: windows_argv(&[]),
        ..HarnessOptions::default()
    });

    // When
    harness.send(ShellEvent::SecondInstance {
        args: windows_argv(&[]),
        cwd: PathBuf::from("C:\\"),
    });

    // Then
    assert_eq!(harness.updates.interactive_count(), 0);
    assert!(harness.window().is_some_and(|w| w.focuses == 1));
}

/// WHAT: Server port in use quits with a notice and the server closed
/// WHY: Another copy already owns the port
#[tokio::test]
async fn given_addr_in_use_when_server_reports_then_notice_and_quit() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    let flow = harness.send(ShellEvent::Server(ServerEvent::Error(ServerFault::AddrInUse)));

    // Then
    assert_eq!(flow, Flow::Quit);
    assert_eq!(harness.desktop.notices, vec![ALREADY_RUNNING_NOTICE.to_string()]);
    assert!(!harness.controller.session().server_listening());
    assert!(!harness.server.listening.load(Ordering::SeqCst));
    assert_eq!(harness.controller.session().state(), LifecycleState::Quitting);
}

/// WHAT: Other server errors are logged and the app keeps going
/// WHY: Transient server faults are not fatal
#[tokio::test]
async fn given_other_server_fault_when_reported_then_continue() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    let flow = harness.send(ShellEvent::Server(ServerEvent::Error(ServerFault::Other(
        "connection reset".to_string(),
    ))));

    // Then
    assert_eq!(flow, Flow::Continue);
    assert!(harness.controller.session().server_listening());
}

/// WHAT: An uncaught error closes the listening server and exits with 1
/// WHY: The port must be released on crash
#[tokio::test]
async fn given_listening_server_when_uncaught_error_then_closed_and_exit_one() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    let flow = harness.send(ShellEvent::UncaughtError("boom".to_string()));

    // Then
    assert_eq!(flow, Flow::Exit(1));
    assert!(!harness.controller.session().server_listening());
    assert_eq!(harness.server.closes.load(Ordering::SeqCst), 1);
}

/// WHAT: An uncaught error before the server listens still exits with 1
/// WHY: There is nothing to close but the process must still end
#[tokio::test]
async fn given_server_not_listening_when_uncaught_error_then_exit_one_without_close() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        listen_on_start: false,
        ..HarnessOptions::default()
    });

    // When
    let flow = harness.send(ShellEvent::UncaughtError("boom".to_string()));

    // Then
    assert_eq!(flow, Flow::Exit(1));
    assert_eq!(harness.server.closes.load(Ordering::SeqCst), 0);
}

/// WHAT: Recreating through tray and activate never overlaps windows or trays
/// WHY: At most one live window and tray may exist
#[tokio::test]
async fn given_closed_window_when_tray_clicked_and_activated_then_single_window_and_tray() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());
    harness.send(ShellEvent::MainWindowClosed);
    assert_eq!(harness.controller.session().state(), LifecycleState::Backgrounded);

    // When: Tray click recreates the window
    harness.send(ShellEvent::TrayClicked);
    assert_single_window_and_tray(&harness);
    assert_eq!(harness.desktop.windows_created, 2);

    // When: Activate with a live window does nothing
    harness.send(ShellEvent::Activate);
    assert_eq!(harness.desktop.windows_created, 2);

    // When: Close then activate rebuilds window and tray
    harness.send(ShellEvent::MainWindowClosed);
    harness.send(ShellEvent::Activate);

    // Then
    assert_single_window_and_tray(&harness);
    assert_eq!(harness.desktop.windows_created, 3);
    assert_eq!(harness.desktop.trays_created, 2);
    assert_eq!(harness.desktop.live_windows.get(), 1);
    assert_eq!(harness.desktop.live_trays.get(), 1);
    assert_eq!(harness.controller.session().state(), LifecycleState::Active);

    // And: The first-launch check still ran only once
    assert_eq!(
        harness
            .updates
            .kinds()
            .iter()
            .filter(|kind| **kind == UpdateCheckKind::CheckAndNotify)
            .count(),
        1
    );
}

/// WHAT: Closing the last window quits outside macOS
/// WHY: Only macOS keeps apps alive in the dock
#[tokio::test]
async fn given_linux_when_window_closed_then_quit_and_server_closed() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Linux,
        ..HarnessOptions::default()
    });

    // When
    let flow = harness.send(ShellEvent::MainWindowClosed);

    // Then
    assert_eq!(flow, Flow::Quit);
    assert!(!harness.controller.session().server_listening());
}

/// WHAT: Closing the window on macOS keeps the app running
/// WHY: The tray and dock stay available
#[tokio::test]
async fn given_macos_when_window_closed_then_continue() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When
    let flow = harness.send(ShellEvent::MainWindowClosed);

    // Then
    assert_eq!(flow, Flow::Continue);
    assert!(harness.controller.session().server_listening());
}

/// WHAT: Tray menu entries route to focus, update and quit
/// WHY: The tray menu is the only menu outside macOS
#[tokio::test]
async fn given_tray_menu_when_entries_chosen_then_routed() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Linux,
        ..HarnessOptions::default()
    });

    // When/Then
    assert_eq!(harness.send(ShellEvent::TrayMenu(TrayAction::Open)), Flow::Continue);
    assert!(harness.window().is_some_and(|w| w.focuses == 1));

    assert_eq!(
        harness.send(ShellEvent::TrayMenu(TrayAction::CheckForUpdates)),
        Flow::Continue
    );
    assert_eq!(harness.updates.interactive_count(), 1);

    assert_eq!(harness.send(ShellEvent::TrayMenu(TrayAction::Quit)), Flow::Quit);
    assert!(!harness.controller.session().server_listening());
}

/// WHAT: The server can request update checks
/// WHY: The renderer's settings page asks through the server
#[tokio::test]
async fn given_server_update_request_when_received_then_interactive_check() {
    // Given
    let mut harness = Harness::ready(HarnessOptions::default());

    // When: The hook is called as the server would
    if let Ok(hooks) = harness.server_hooks.lock() {
        if let Some(hooks) = hooks.as_ref() {
            hooks.request_update();
        }
    }
    for event in harness.sink.events() {
        harness.send(event);
    }

    // Then
    assert_eq!(harness.updates.interactive_count(), 1);
}

/// WHAT: After quitting, events are ignored and shutdown runs once
/// WHY: Late events must not rebuild windows during teardown
#[tokio::test]
async fn given_quitting_when_events_arrive_then_ignored() {
    // Given
    let mut harness = Harness::ready(HarnessOptions {
        platform: Platform::Linux,
        ..HarnessOptions::default()
    });
    assert_eq!(harness.send(ShellEvent::QuitRequested), Flow::Quit);

    // When
    harness.send(ShellEvent::TrayClicked);
    harness.send(ShellEvent::Activate);
    let flow = harness.send(ShellEvent::BeforeQuit);

    // Then
    assert_eq!(flow, Flow::Quit);
    assert_eq!(harness.desktop.windows_created, 1);
    assert_eq!(harness.server.closes.load(Ordering::SeqCst), 1);
}

/// WHAT: The first window's initial load already carries the app origin
/// WHY: The header hook must be in place before any content request leaves
#[tokio::test]
async fn given_ready_when_first_window_loads_then_headers_rewritten() {
    // Given/When
    let harness = Harness::ready(HarnessOptions::default());

    // Then
    let window = harness.window();
    assert!(window.is_some_and(|w| w.load_headers.len() == 1));
    assert!(window.is_some_and(|w| {
        w.load_headers[0].get("Origin").map(String::as_str) == Some(APP_ORIGIN)
            && w.load_headers[0].get("Referer").map(String::as_str) == Some(APP_ORIGIN)
    }));
}

/// WHAT: Activate before Ready creates nothing
/// WHY: No window or tray may exist before the instance lock is held
#[tokio::test]
async fn given_starting_when_activate_then_ignored_until_ready() {
    // Given
    let mut harness = Harness::new(HarnessOptions::default());

    // When
    let flow = harness.send(ShellEvent::Activate);

    // Then
    assert_eq!(flow, Flow::Continue);
    assert_eq!(harness.desktop.windows_created, 0);
    assert_eq!(harness.desktop.trays_created, 0);
    assert_eq!(harness.controller.session().state(), LifecycleState::Starting);

    // And: Ready still runs the normal startup once
    harness.send(ShellEvent::Ready);
    assert_eq!(harness.desktop.windows_created, 1);
    assert_eq!(harness.desktop.trays_created, 1);
    assert_single_window_and_tray(&harness);
}
