//! # Event Classifier
//!
//! Decides whether an admission request is a sensitive interactive-access event.

use super::{SensitiveAction, SensitiveEvent};
use crate::admission::AdmissionRequest;
use crate::config::ConfigSnapshot;
use crate::constants::{POD_EXEC_KIND, POD_PORT_FORWARD_KIND};
use chrono::Utc;

/// Map a request to the action it represents, independent of namespace
fn action_for_kind(kind: &str) -> Option<SensitiveAction> {
    match kind {
        POD_EXEC_KIND => Some(SensitiveAction::ShellAccess),
        POD_PORT_FORWARD_KIND => Some(SensitiveAction::PortForward),
        _ => None,
    }
}

/// Classify an admission request against the current snapshot.
///
/// Returns an event only for `PodExecOptions` / `PodPortForwardOptions` requests
/// whose namespace equals the monitored namespace exactly. Toggles are not
/// consulted here.
pub fn classify(request: &AdmissionRequest, snapshot: &ConfigSnapshot) -> Option<SensitiveEvent> {
    let action = request.requested_kind().and_then(action_for_kind)?;

    if request.namespace() != snapshot.monitored_namespace {
        return None;
    }

    Some(SensitiveEvent {
        action,
        user: request.username().to_string(),
        groups: request.groups().to_vec(),
        namespace: request.namespace().to_string(),
        pod_name: request.pod_name().to_string(),
        cluster_label: snapshot.cluster_label.clone(),
        timestamp: Utc::now(),
    })
}
