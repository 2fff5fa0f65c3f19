//! # Alerts
//!
//! Classification of admission requests into sensitive events and rendering of
//! those events as chat messages.

mod classifier;
mod formatter;

pub use classifier::classify;
pub use formatter::format_alert;

use chrono::{DateTime, Utc};
use std::fmt;

/// Interactive pod access that kube-guard reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitiveAction {
    /// `kubectl exec`
    ShellAccess,
    /// `kubectl port-forward`
    PortForward,
}

impl SensitiveAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShellAccess => "shell_access",
            Self::PortForward => "port_forward",
        }
    }
}

impl fmt::Display for SensitiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified sensitive action. Built by [`classify`], consumed once by
/// [`format_alert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveEvent {
    pub action: SensitiveAction,
    pub user: String,
    /// Not rendered; kept for policy decisions on group membership
    pub groups: Vec<String>,
    pub namespace: String,
    pub pod_name: String,
    pub cluster_label: String,
    pub timestamp: DateTime<Utc>,
}
