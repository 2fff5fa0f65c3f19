//! # Alert Service
//!
//! Owns the configuration handle and the notifier, and runs
//! classify → format → dispatch for one admission request.
//!
//! Nothing in here can influence the admission decision: every path ends in an
//! [`Observation`], never an error.

use crate::admission::AdmissionRequest;
use crate::alert::{classify, format_alert, SensitiveAction, SensitiveEvent};
use crate::config::{DispatchMode, SharedSnapshot};
use crate::notifier::{dispatch, DispatchOutcome, Notifier, WebhookTarget};
use crate::observability::metrics;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};

/// Result of observing one admission request
#[derive(Debug)]
pub enum Observation {
    /// Not a monitored action
    Ignored,
    /// Monitored action, but its notification toggle is off
    Suppressed(SensitiveAction),
    /// Alert sent before returning (inline mode)
    Dispatched(SensitiveAction, DispatchOutcome),
    /// Alert handed to a detached task (background mode). Dropping the handle
    /// does not cancel delivery.
    Spawned(SensitiveAction, JoinHandle<DispatchOutcome>),
}

#[derive(Debug, Clone)]
pub struct AlertService {
    snapshot: SharedSnapshot,
    notifier: Arc<dyn Notifier>,
    dispatch_mode: DispatchMode,
}

impl AlertService {
    pub fn new(
        snapshot: SharedSnapshot,
        notifier: Arc<dyn Notifier>,
        dispatch_mode: DispatchMode,
    ) -> Self {
        Self {
            snapshot,
            notifier,
            dispatch_mode,
        }
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch_mode
    }

    /// Classify the request and, if it is a monitored action with notifications
    /// enabled, format and dispatch an alert
    pub async fn observe(&self, request: &AdmissionRequest) -> Observation {
        let snapshot = self.snapshot.current().await;

        let Some(event) = classify(request, &snapshot) else {
            debug!(
                kind = ?request.requested_kind(),
                namespace = %request.namespace(),
                "Not a monitored action"
            );
            return Observation::Ignored;
        };

        let action = event.action;
        metrics::increment_sensitive_events(action);

        info!(
            action = %action,
            user = %event.user,
            groups = ?event.groups,
            namespace = %event.namespace,
            pod = %event.pod_name,
            "Sensitive pod access detected"
        );

        if !snapshot.notifies_on(action) {
            info!(action = %action, "Notifications disabled for this action");
            return Observation::Suppressed(action);
        }

        let target = WebhookTarget::from_snapshot(&snapshot);
        match self.dispatch_mode {
            DispatchMode::Inline => {
                let outcome = notify(self.notifier.as_ref(), &target, &event).await;
                Observation::Dispatched(action, outcome)
            }
            DispatchMode::Background => {
                let notifier = Arc::clone(&self.notifier);
                let span = info_span!("notify", action = %action, uid = %request.uid);
                let handle = tokio::spawn(
                    async move { notify(notifier.as_ref(), &target, &event).await }.instrument(span),
                );
                Observation::Spawned(action, handle)
            }
        }
    }
}

async fn notify(
    notifier: &dyn Notifier,
    target: &WebhookTarget,
    event: &SensitiveEvent,
) -> DispatchOutcome {
    let message = format_alert(event);
    dispatch(notifier, target, &message).await
}
