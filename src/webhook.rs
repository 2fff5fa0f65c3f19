//! # Admission Webhook Handlers
//!
//! - `POST /validate` - observes the request (may raise an alert) and allows it
//! - `POST /mutate` - allows with an empty JSON patch; never observes, so each
//!   admission operation is reported at most once
//!
//! Neither endpoint ever denies. The only non-200 answers are 400 for a
//! malformed AdmissionReview and 500 for an unexpected internal failure.

use crate::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, AdmissionReviewResponse};
use crate::observability::metrics;
use crate::service::{AlertService, Observation};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Body missing, not JSON, or without a `request`
    #[error("Invalid admission review: {0}")]
    InvalidReview(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidReview(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Decode an AdmissionReview body and extract its request
pub fn parse_review(body: &[u8]) -> Result<AdmissionRequest, WebhookError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WebhookError::InvalidReview("empty body".to_string()));
    }

    let review: AdmissionReview = serde_json::from_slice(body)
        .map_err(|e| WebhookError::InvalidReview(e.to_string()))?;

    review
        .request
        .ok_or_else(|| WebhookError::InvalidReview("missing request".to_string()))
}

fn parse_or_reject(endpoint: &str, body: &[u8]) -> Result<AdmissionRequest, WebhookError> {
    metrics::increment_admission_reviews(endpoint);
    parse_review(body).inspect_err(|e| {
        metrics::increment_invalid_reviews();
        warn!(endpoint, error = %e, "Rejecting malformed AdmissionReview");
    })
}

/// Validating webhook: observe, then allow
pub async fn validate(
    State(service): State<Arc<AlertService>>,
    body: Bytes,
) -> Result<Json<AdmissionReviewResponse>, WebhookError> {
    let request = parse_or_reject("validate", &body)?;

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        kind = ?request.requested_kind(),
        namespace = %request.namespace(),
        name = %request.pod_name(),
        "Processing admission request"
    );

    match service.observe(&request).await {
        Observation::Ignored | Observation::Suppressed(_) => {}
        Observation::Dispatched(action, outcome) => {
            info!(uid = %request.uid, action = %action, outcome = outcome.as_str(), "Alert dispatched");
        }
        Observation::Spawned(action, _detached) => {
            debug!(uid = %request.uid, action = %action, "Alert dispatch running in background");
        }
    }

    Ok(Json(AdmissionResponse::allow(request.uid).into_review()))
}

/// Mutating webhook: allow with a no-op patch
pub async fn mutate(body: Bytes) -> Result<Json<AdmissionReviewResponse>, WebhookError> {
    let request = parse_or_reject("mutate", &body)?;

    Ok(Json(
        AdmissionResponse::allow(request.uid)
            .with_noop_patch()
            .into_review(),
    ))
}

/// Turns a handler panic into a 500 instead of dropping the connection
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(panic = %detail, "Error in webhook handler");
    WebhookError::Internal(detail).into_response()
}
