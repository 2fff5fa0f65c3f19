//! # Runtime Settings
//!
//! Process-level settings loaded from environment variables. These are read once
//! at startup; the alerting configuration itself lives in the ConfigMap.

use crate::constants::{DEFAULT_CONFIG_MAP_NAME, DEFAULT_CONFIG_MAP_NAMESPACE, DEFAULT_PORT};
use std::fmt;
use std::str::FromStr;

/// How the alert pipeline is scheduled relative to the admission response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Format and send on a detached task; respond to the API server immediately.
    /// Delivery is at-most-once and unordered.
    #[default]
    Background,
    /// Await the outbound call before responding. Adds up to the notification
    /// timeout to admission latency.
    Inline,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" | "async" => Ok(Self::Background),
            "inline" | "sync" => Ok(Self::Inline),
            other => Err(format!("unknown dispatch mode '{other}'")),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background"),
            Self::Inline => f.write_str("inline"),
        }
    }
}

/// Process settings
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Listener port for webhook, probes and metrics
    pub port: u16,
    /// Name of the ConfigMap holding `config.yaml`
    pub config_map_name: String,
    /// Namespace of that ConfigMap
    pub config_map_namespace: String,
    /// Hot-reload the snapshot when the ConfigMap changes
    pub config_watch_enabled: bool,
    /// Scheduling of the alert pipeline
    pub dispatch_mode: DispatchMode,
    /// Log format (json, text)
    pub log_format: String,
    /// Serve plain HTTP instead of TLS (local development only)
    pub insecure_http: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            config_map_name: DEFAULT_CONFIG_MAP_NAME.to_string(),
            config_map_namespace: DEFAULT_CONFIG_MAP_NAMESPACE.to_string(),
            config_watch_enabled: true,
            dispatch_mode: DispatchMode::default(),
            log_format: "json".to_string(),
            insecure_http: false,
        }
    }
}

impl RuntimeSettings {
    /// Load settings from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            port: env_var_or_default("PORT", DEFAULT_PORT),
            config_map_name: env_var_or_default_str("CONFIG_MAP_NAME", DEFAULT_CONFIG_MAP_NAME),
            config_map_namespace: env_var_or_default_str(
                "CONFIG_MAP_NAMESPACE",
                DEFAULT_CONFIG_MAP_NAMESPACE,
            ),
            config_watch_enabled: env_var_or_default_bool("CONFIG_WATCH_ENABLED", true),
            dispatch_mode: env_var_or_default("NOTIFY_DISPATCH_MODE", DispatchMode::default()),
            log_format: env_var_or_default_str("LOG_FORMAT", "json"),
            insecure_http: env_var_or_default_bool("WEBHOOK_INSECURE_HTTP", false),
        }
    }

    pub fn json_logs(&self) -> bool {
        !self.log_format.eq_ignore_ascii_case("text")
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map_or(default, |v| parse_bool(&v))
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_mode_parsing() {
        assert_eq!("background".parse::<DispatchMode>(), Ok(DispatchMode::Background));
        assert_eq!(" Inline ".parse::<DispatchMode>(), Ok(DispatchMode::Inline));
        assert_eq!("sync".parse::<DispatchMode>(), Ok(DispatchMode::Inline));
        assert!("later".parse::<DispatchMode>().is_err());
    }

    #[test]
    fn test_bool_values() {
        for truthy in ["true", "TRUE", "1", "yes", "on"] {
            assert!(parse_bool(truthy), "{truthy} should be true");
        }
        for falsy in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_defaults() {
        let settings = RuntimeSettings::default();
        assert_eq!(settings.port, 8443);
        assert_eq!(settings.config_map_name, "kube-guard-config");
        assert_eq!(settings.config_map_namespace, "kube-guard");
        assert_eq!(settings.dispatch_mode, DispatchMode::Background);
        assert!(settings.json_logs());
        assert!(!settings.insecure_http);
    }
}
