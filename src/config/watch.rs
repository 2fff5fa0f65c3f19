//! # ConfigMap Watch
//!
//! Watches the kube-guard ConfigMap and swaps in a fresh snapshot whenever it changes.

use super::snapshot::{ConfigSnapshot, SharedSnapshot};
use futures::{pin_mut, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Api;
use kube_runtime::watcher;
use tracing::{error, info, warn};

/// Start watching the ConfigMap and hot-reload the shared snapshot
///
/// - `Apply`: parse and swap in; a document that fails to parse leaves the
///   current snapshot in place.
/// - `Delete`: swap in the environment fallback.
pub fn start_configmap_watch(
    client: kube::Client,
    namespace: &str,
    configmap_name: &str,
    snapshot: SharedSnapshot,
) -> tokio::task::JoinHandle<()> {
    let namespace = namespace.to_string();
    let configmap_name = configmap_name.to_string();
    tokio::spawn(async move {
        let configmaps: Api<ConfigMap> = Api::namespaced(client, &namespace);

        info!(
            namespace = %namespace,
            configmap = %configmap_name,
            "Starting ConfigMap watch"
        );

        let watcher_config =
            watcher::Config::default().fields(&format!("metadata.name={configmap_name}"));

        let stream = watcher(configmaps, watcher_config);
        pin_mut!(stream);

        while let Some(event_result) = stream.next().await {
            match event_result {
                // InitApply also arrives after the watcher re-lists
                Ok(watcher::Event::Apply(configmap) | watcher::Event::InitApply(configmap)) => {
                    if configmap.metadata.name.as_deref() == Some(configmap_name.as_str()) {
                        apply_configmap(&configmap, &snapshot).await;
                    }
                }
                Ok(watcher::Event::Delete(configmap)) => {
                    if configmap.metadata.name.as_deref() == Some(configmap_name.as_str()) {
                        warn!(
                            configmap = %configmap_name,
                            "ConfigMap was deleted, reverting to environment configuration"
                        );
                        snapshot.replace(ConfigSnapshot::from_env()).await;
                    }
                }
                Ok(watcher::Event::Init | watcher::Event::InitDone) => {}
                Err(e) => {
                    // the watcher retries on its own
                    error!(error = %e, "Error watching ConfigMap");
                }
            }
        }

        warn!("ConfigMap watch stream ended");
    })
}

/// Parse a changed ConfigMap and swap it in
pub async fn apply_configmap(configmap: &ConfigMap, snapshot: &SharedSnapshot) {
    match ConfigSnapshot::from_config_map(configmap) {
        Ok(new_snapshot) => {
            info!(
                monitored_namespace = %new_snapshot.monitored_namespace,
                cluster_label = %new_snapshot.cluster_label,
                shell_access = new_snapshot.notifications.shell_access,
                port_forward = new_snapshot.notifications.port_forward,
                webhook_configured = !new_snapshot.mattermost.webhook_url.is_empty(),
                "Configuration reloaded"
            );
            snapshot.replace(new_snapshot).await;
        }
        Err(e) => {
            error!(error = %e, "Ignoring invalid ConfigMap update, keeping previous configuration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn configmap(yaml: &str) -> ConfigMap {
        ConfigMap {
            data: Some(BTreeMap::from([("config.yaml".to_string(), yaml.to_string())])),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_swaps_snapshot() {
        let shared = SharedSnapshot::new(ConfigSnapshot::default());
        apply_configmap(&configmap("monitored_namespace: prod\n"), &shared).await;
        assert_eq!(shared.current().await.monitored_namespace, "prod");
    }

    #[tokio::test]
    async fn test_invalid_update_keeps_previous() {
        let shared = SharedSnapshot::new(ConfigSnapshot {
            monitored_namespace: "prod".to_string(),
            ..ConfigSnapshot::default()
        });
        apply_configmap(&configmap("monitored_namespace: [oops"), &shared).await;
        assert_eq!(shared.current().await.monitored_namespace, "prod");
    }
}
