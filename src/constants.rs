//! # Constants
//!
//! Shared constants used throughout kube-guard.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTPS port for the admission webhook, probes and metrics
pub const DEFAULT_PORT: u16 = 8443;

/// Default ConfigMap holding `config.yaml`
pub const DEFAULT_CONFIG_MAP_NAME: &str = "kube-guard-config";

/// Default namespace of the ConfigMap
pub const DEFAULT_CONFIG_MAP_NAMESPACE: &str = "kube-guard";

/// ConfigMap key that carries the configuration document
pub const CONFIG_MAP_KEY: &str = "config.yaml";

/// Path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";

/// Path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";

/// Subject alternative names on the generated self-signed certificate
pub const SELF_SIGNED_SUBJECT_ALT_NAMES: [&str; 3] =
    ["kube-guard", "kube-guard.kube-guard.svc", "localhost"];

/// Upper bound for a single outbound chat webhook call (seconds)
pub const NOTIFICATION_TIMEOUT_SECS: u64 = 10;

/// Namespace watched for sensitive pod access when nothing else is configured
pub const DEFAULT_MONITORED_NAMESPACE: &str = "my-namespace";

/// Chat channel used when none is configured (rendered as `#alerts`)
pub const DEFAULT_CHANNEL: &str = "alerts";

/// Display name the alerts are posted under
pub const DEFAULT_DISPLAY_NAME: &str = "KubeGuard";

/// Cluster label rendered into alerts when none is configured
pub const DEFAULT_CLUSTER_LABEL: &str = "in-cluster";

/// Emoji attached to every alert post
pub const ALERT_ICON_EMOJI: &str = ":warning:";

/// Sub-resource kind sent by the API server for `kubectl exec`
pub const POD_EXEC_KIND: &str = "PodExecOptions";

/// Sub-resource kind sent by the API server for `kubectl port-forward`
pub const POD_PORT_FORWARD_KIND: &str = "PodPortForwardOptions";

/// Placeholder for a missing username or pod name
pub const UNKNOWN: &str = "unknown";

/// `apiVersion` of every AdmissionReview we return
pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";

/// `kind` of every AdmissionReview we return
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";
