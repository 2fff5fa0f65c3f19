//! # HTTP Server
//!
//! Serves the admission webhook, Kubernetes probes and Prometheus metrics on one port.
//!
//! Provides endpoints:
//! - `/validate` - Validating admission webhook (may raise an alert)
//! - `/mutate` - Mutating admission webhook (no-op patch)
//! - `/healthz` - Liveness probe (always returns 200)
//! - `/readyz` - Readiness probe (always returns 200)
//! - `/metrics` - Prometheus metrics in text format
//!
//! The listener always speaks TLS. A mounted certificate and key are used when
//! present; otherwise a self-signed pair is generated in memory at startup.
//! Plain HTTP is only served when explicitly requested for local development.

use crate::constants::SELF_SIGNED_SUBJECT_ALT_NAMES;
use crate::service::AlertService;
use crate::webhook::{mutate, panic_response, validate};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Errors that can occur when running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[source] std::io::Error),
    #[error("failed to generate self-signed certificate: {0}")]
    CertGen(#[from] rcgen::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// PEM certificate and key for the HTTPS listener
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    /// Both paths, if both files exist
    pub fn existing(cert: &str, key: &str) -> Option<Self> {
        let paths = Self {
            cert: PathBuf::from(cert),
            key: PathBuf::from(key),
        };
        (paths.cert.exists() && paths.key.exists()).then_some(paths)
    }
}

/// Generate a self-signed certificate and key, both PEM encoded
pub fn self_signed_pem() -> Result<(Vec<u8>, Vec<u8>), ServerError> {
    let subject_alt_names: Vec<String> = SELF_SIGNED_SUBJECT_ALT_NAMES
        .iter()
        .map(|name| (*name).to_string())
        .collect();
    let certified = rcgen::generate_simple_self_signed(subject_alt_names)?;
    Ok((
        certified.cert.pem().into_bytes(),
        certified.key_pair.serialize_pem().into_bytes(),
    ))
}

/// TLS configuration from mounted files, or a generated self-signed pair
pub async fn load_tls_config(paths: Option<TlsPaths>) -> Result<RustlsConfig, ServerError> {
    match paths {
        Some(paths) => {
            info!(cert = %paths.cert.display(), "Using mounted TLS certificate");
            RustlsConfig::from_pem_file(&paths.cert, &paths.key)
                .await
                .map_err(ServerError::TlsConfig)
        }
        None => {
            warn!("TLS certificates not found, generating a self-signed certificate");
            let (cert, key) = self_signed_pem()?;
            RustlsConfig::from_pem(cert, key)
                .await
                .map_err(ServerError::TlsConfig)
        }
    }
}

/// Build the router
pub fn create_router(service: Arc<AlertService>) -> Router {
    Router::new()
        .route("/validate", post(validate))
        .route("/mutate", post(mutate))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve `app` on `0.0.0.0:port` until the listener fails. `None` serves plain HTTP.
pub async fn start_server(
    app: Router,
    port: u16,
    tls: Option<RustlsConfig>,
) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    match tls {
        Some(config) => {
            info!(%addr, "HTTPS server listening");
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await
                .map_err(ServerError::Serve)
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| ServerError::Bind { addr, source })?;

            info!(%addr, "HTTP server listening (no TLS)");
            axum::serve(listener, app).await.map_err(ServerError::Serve)
        }
    }
}

fn gather() -> Vec<prometheus::proto::MetricFamily> {
    use crate::observability::metrics::REGISTRY;
    REGISTRY.gather()
}

async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
}

async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn readyz_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_rustls() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    #[test]
    fn test_self_signed_pem_pair() {
        let (cert, key) = self_signed_pem().unwrap();
        let cert = String::from_utf8(cert).unwrap();
        let key = String::from_utf8(key).unwrap();
        assert!(cert.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(key.contains("PRIVATE KEY-----"));
    }

    #[tokio::test]
    async fn test_generated_pair_loads_into_rustls() {
        init_rustls();
        let (cert, key) = self_signed_pem().unwrap();
        assert!(RustlsConfig::from_pem(cert, key).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_files_fall_back_to_self_signed() {
        init_rustls();
        assert!(TlsPaths::existing("/nonexistent/tls.crt", "/nonexistent/tls.key").is_none());
        assert!(load_tls_config(None).await.is_ok());
    }
}
