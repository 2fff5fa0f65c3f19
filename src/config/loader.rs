//! # ConfigMap Loader
//!
//! Reads the alerting configuration from the cluster, falling back to
//! environment defaults when the ConfigMap is unavailable.

use super::snapshot::{ConfigError, ConfigSnapshot};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tracing::{info, warn};

/// Fetch and parse the ConfigMap
pub async fn fetch_snapshot(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<ConfigSnapshot, ConfigError> {
    let configmaps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let config_map = configmaps
        .get(name)
        .await
        .map_err(|source| ConfigError::Fetch {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })?;
    ConfigSnapshot::from_config_map(&config_map)
}

/// Load the snapshot used at startup. Never fails.
///
/// Without a client (no cluster credentials) the environment fallback is used
/// directly.
pub async fn load_snapshot(client: Option<&Client>, namespace: &str, name: &str) -> ConfigSnapshot {
    let Some(client) = client else {
        warn!("No Kubernetes client available, using environment configuration");
        return ConfigSnapshot::from_env();
    };

    match fetch_snapshot(client, namespace, name).await {
        Ok(snapshot) => {
            info!(
                configmap = %format!("{namespace}/{name}"),
                monitored_namespace = %snapshot.monitored_namespace,
                "Configuration loaded from ConfigMap"
            );
            snapshot
        }
        Err(e) => {
            warn!(error = %e, "Failed to load config from ConfigMap, using environment configuration");
            ConfigSnapshot::from_env()
        }
    }
}
