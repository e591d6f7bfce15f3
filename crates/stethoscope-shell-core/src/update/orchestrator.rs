use crate::update::{UpdateCheckKind, UpdateOutcome, UpdateService, UpdateTrigger};

use std::sync::Arc;

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Reconciled result of one update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Id used to correlate the attempt's log lines.
    pub attempt_id: Uuid,
    /// What started the attempt.
    pub trigger: UpdateTrigger,
    /// Outcome, or the logged error message.
    pub result: Result<UpdateOutcome, String>,
}

/// Runs update checks without ever letting a failure escape.
///
/// Each call is an independent attempt on the async runtime. Overlapping
/// attempts are neither coalesced nor cancelled.
#[derive(Clone)]
pub struct UpdateOrchestrator {
    service: Arc<dyn UpdateService>,
    runtime: Handle,
}

impl UpdateOrchestrator {
    /// Wrap `service`, spawning attempts on `runtime`.
    pub fn new(service: Arc<dyn UpdateService>, runtime: Handle) -> Self {
        Self { service, runtime }
    }

    /// Interactive check.
    #[instrument(skip(self))]
    pub fn check_for_updates(&self, trigger: UpdateTrigger) -> JoinHandle<UpdateReport> {
        self.spawn(UpdateCheckKind::Interactive, trigger)
    }

    /// Background check that only notifies when an update exists.
    #[instrument(skip(self))]
    pub fn check_and_notify(&self) -> JoinHandle<UpdateReport> {
        self.spawn(UpdateCheckKind::CheckAndNotify, UpdateTrigger::FirstLaunch)
    }

    fn spawn(&self, kind: UpdateCheckKind, trigger: UpdateTrigger) -> JoinHandle<UpdateReport> {
        let attempt_id = Uuid::new_v4();
        info!(attempt_id = %attempt_id, trigger = %trigger, kind = ?kind, "Checking for updates");

        let check = self.service.check(kind);
        self.runtime.spawn(async move {
            let result = match check.await {
                Ok(outcome) => {
                    info!(attempt_id = %attempt_id, trigger = %trigger, outcome = ?outcome, "Update check finished");
                    Ok(outcome)
                }
                Err(e) => {
                    error!(attempt_id = %attempt_id, trigger = %trigger, error = %e, "Error checking for update");
                    Err(e.to_string())
                }
            };

            UpdateReport {
                attempt_id,
                trigger,
                result,
            }
        })
    }
}
