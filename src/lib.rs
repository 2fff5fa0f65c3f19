//! kube-guard Library
//!
//! Admission webhook that watches `pods/exec` and `pods/portforward` requests in a
//! monitored namespace and posts an alert to a Mattermost channel. It never denies
//! or mutates anything.
//!
//! Tests are included in the module files and under `tests/`.

pub mod admission;
pub mod alert;
pub mod config;
pub mod constants;
pub mod notifier;
pub mod observability;
pub mod server;
pub mod service;
pub mod webhook;

pub use service::{AlertService, Observation};
