//! # Metrics
//!
//! Prometheus metrics for monitoring kube-guard.
//!
//! ## Metrics Exposed
//!
//! - `kube_guard_admission_reviews_total{endpoint}` - AdmissionReviews received per endpoint
//! - `kube_guard_invalid_reviews_total` - AdmissionReviews rejected as malformed
//! - `kube_guard_sensitive_events_total{action}` - Classified shell/port-forward events
//! - `kube_guard_notifications_total{outcome}` - Alert dispatch results (delivered, skipped, failed)

use crate::alert::SensitiveAction;
use crate::notifier::DispatchOutcome;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static ADMISSION_REVIEWS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kube_guard_admission_reviews_total",
            "Total number of AdmissionReviews received by endpoint",
        ),
        &["endpoint"],
    )
    .expect("Failed to create ADMISSION_REVIEWS_TOTAL metric - this should never happen")
});

static INVALID_REVIEWS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kube_guard_invalid_reviews_total",
        "Total number of malformed AdmissionReviews",
    )
    .expect("Failed to create INVALID_REVIEWS_TOTAL metric - this should never happen")
});

static SENSITIVE_EVENTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kube_guard_sensitive_events_total",
            "Total number of sensitive pod access events by action",
        ),
        &["action"],
    )
    .expect("Failed to create SENSITIVE_EVENTS_TOTAL metric - this should never happen")
});

static NOTIFICATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kube_guard_notifications_total",
            "Total number of alert notifications by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create NOTIFICATIONS_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Only fails when called twice; registration happens once in main"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(ADMISSION_REVIEWS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INVALID_REVIEWS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SENSITIVE_EVENTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NOTIFICATIONS_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_admission_reviews(endpoint: &str) {
    ADMISSION_REVIEWS_TOTAL.with_label_values(&[endpoint]).inc();
}

pub fn increment_invalid_reviews() {
    INVALID_REVIEWS_TOTAL.inc();
}

pub fn increment_sensitive_events(action: SensitiveAction) {
    SENSITIVE_EVENTS_TOTAL
        .with_label_values(&[action.as_str()])
        .inc();
}

pub fn increment_notifications(outcome: DispatchOutcome) {
    NOTIFICATIONS_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}
