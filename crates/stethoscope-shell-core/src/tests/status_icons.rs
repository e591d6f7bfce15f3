use crate::{ScanStatus, ShellError, StatusIconRegistry};

use std::panic::Location;

use error_location::ErrorLocation;

/// WHAT: Every status resolves to its own icon
/// WHY: The tray must reflect the exact scan result
#[test]
fn given_all_assets_when_loading_registry_then_each_status_has_icon() {
    // Given/When: A loader that succeeds for every status
    let registry = StatusIconRegistry::load(|status| Ok(status.icon_file_name()));

    // Then: Each status maps to its asset
    assert!(registry.is_ok());
    if let Ok(registry) = registry {
        assert_eq!(*registry.icon(ScanStatus::Pass), "scope-icon-ok2@2x.png");
        assert_eq!(*registry.icon(ScanStatus::Nudge), "scope-icon-nudge2@2x.png");
        assert_eq!(*registry.icon(ScanStatus::Fail), "scope-icon-warn2@2x.png");
    }
}

/// WHAT: A missing asset fails construction
/// WHY: Missing icons are a startup precondition, not a runtime error
#[test]
fn given_missing_asset_when_loading_registry_then_icon_missing_error() {
    // Given: A loader that cannot find the FAIL icon
    let result = StatusIconRegistry::<()>::load(|status| match status {
        ScanStatus::Fail => Err(ShellError::IconMissing {
            status,
            reason: "not found".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
        _ => Ok(()),
    });

    // Then: Construction fails naming the status
    assert!(matches!(
        result,
        Err(ShellError::IconMissing {
            status: ScanStatus::Fail,
            ..
        })
    ));
}
