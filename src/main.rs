//! # kube-guard
//!
//! An admission webhook that reports interactive pod access.
//!
//! ## Overview
//!
//! 1. **Receives AdmissionReviews** - registered for `pods/exec` and `pods/portforward`
//! 2. **Classifies** - shell access and port-forwarding inside the monitored namespace
//! 3. **Alerts** - posts a message to a Mattermost incoming webhook, best effort
//! 4. **Always allows** - the webhook observes, it never blocks or mutates
//!
//! Configuration comes from the `config.yaml` entry of a ConfigMap and is
//! hot-reloaded when the ConfigMap changes. Without cluster access the
//! `MATTERMOST_*` environment variables are used instead.

use anyhow::{Context, Result};
use kube::Client;
use kube_guard::config::{load_snapshot, start_configmap_watch, RuntimeSettings, SharedSnapshot};
use kube_guard::constants::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH};
use kube_guard::notifier::MattermostNotifier;
use kube_guard::observability::{logging, metrics};
use kube_guard::server::{create_router, load_tls_config, start_server, TlsPaths};
use kube_guard::AlertService;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    let settings = RuntimeSettings::from_env();
    logging::init_logging(settings.json_logs());

    info!("Starting kube-guard");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    metrics::register_metrics()?;

    // Missing credentials are not fatal: run on environment configuration
    let client = match Client::try_default().await {
        Ok(client) => {
            info!("Connected to Kubernetes cluster");
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "Failed to load Kubernetes config, ConfigMap support disabled");
            None
        }
    };

    let snapshot = SharedSnapshot::new(
        load_snapshot(
            client.as_ref(),
            &settings.config_map_namespace,
            &settings.config_map_name,
        )
        .await,
    );

    if let (Some(client), true) = (client, settings.config_watch_enabled) {
        start_configmap_watch(
            client,
            &settings.config_map_namespace,
            &settings.config_map_name,
            snapshot.clone(),
        );
    }

    let notifier = MattermostNotifier::new().context("Failed to build HTTP client")?;
    let service = Arc::new(AlertService::new(
        snapshot,
        Arc::new(notifier),
        settings.dispatch_mode,
    ));
    info!(dispatch_mode = %service.dispatch_mode(), "Alert service ready");

    let tls = if settings.insecure_http {
        warn!("WEBHOOK_INSECURE_HTTP is set, serving plain HTTP");
        None
    } else {
        let paths = TlsPaths::existing(WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH);
        Some(
            load_tls_config(paths)
                .await
                .context("Failed to configure TLS")?,
        )
    };

    let app = create_router(service);

    tokio::select! {
        result = start_server(app, settings.port, tls) => {
            if let Err(e) = result {
                error!("Webhook server error: {}", e);
                return Err(e.into());
            }
        }
        () = shutdown_signal() => {
            info!("Received shutdown signal");
        }
    }

    info!("kube-guard stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Signal handler setup failures are fatal; without them the process cannot
/// shut down gracefully.
#[allow(clippy::expect_used, reason = "no way to continue without signal handlers")]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
