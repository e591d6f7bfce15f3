mod config;

use stethoscope_shell_core::{EventSink, ShellEvent};

use std::sync::Mutex;

/// Sink that keeps every event it receives.
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<ShellEvent>>,
}

impl RecordingSink {
    #[allow(clippy::unwrap_used)]
    pub(crate) fn events(&self) -> Vec<ShellEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    #[allow(clippy::unwrap_used)]
    fn emit(&self, event: ShellEvent) {
        self.events.lock().unwrap().push(event);
    }
}
