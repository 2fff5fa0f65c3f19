//! # Alert Formatter
//!
//! Renders a sensitive event into the chat message body.

use super::{SensitiveAction, SensitiveEvent};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

impl SensitiveAction {
    fn banner(self) -> &'static str {
        match self {
            Self::ShellAccess => ":warning: **Shell Access Alert**",
            Self::PortForward => ":warning: **Port Forward Alert**",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::ShellAccess => "opened a shell to pod",
            Self::PortForward => "created a port-forward to pod",
        }
    }
}

/// Render the alert text
///
/// ```text
/// :warning: **Shell Access Alert**
/// Cluster: `in-cluster`
/// User `alice` opened a shell to pod `my-namespace/pod-a`
/// Time: 2026-10-17 09:30:00 UTC
/// ```
pub fn format_alert(event: &SensitiveEvent) -> String {
    format!(
        "{banner}\nCluster: `{cluster}`\nUser `{user}` {verb} `{namespace}/{pod}`\nTime: {time}",
        banner = event.action.banner(),
        cluster = event.cluster_label,
        user = event.user,
        verb = event.action.verb(),
        namespace = event.namespace,
        pod = event.pod_name,
        time = event.timestamp.format(TIMESTAMP_FORMAT),
    )
}
