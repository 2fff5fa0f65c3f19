//! # AdmissionReview Types
//!
//! The subset of `admission.k8s.io/v1` that kube-guard reads and writes.
//!
//! Every request field is optional on the wire. Defaults are applied here, at the
//! parse boundary, so the classifier never has to guess.

use crate::constants::{ADMISSION_API_VERSION, ADMISSION_REVIEW_KIND, UNKNOWN};
use base64::{engine::general_purpose, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read a field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Inbound AdmissionReview envelope
///
/// Only `request` is structural: it must be a JSON object. Everything inside it
/// is read leniently.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub request: Option<AdmissionRequest>,
}

/// The request embedded in an AdmissionReview
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionRequest {
    /// Opaque identifier, echoed back unchanged whatever its JSON type
    pub uid: Value,
    /// Kind of the object in the request; for pod sub-resources this is
    /// `PodExecOptions`, `PodPortForwardOptions`, ...
    #[serde(deserialize_with = "lenient")]
    pub kind: Option<GroupVersionKind>,
    #[serde(deserialize_with = "lenient")]
    pub namespace: Option<String>,
    /// Target object name (the pod for `pods/exec` and `pods/portforward`)
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub operation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sub_resource: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupVersionKind {
    #[serde(deserialize_with = "lenient")]
    pub group: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub kind: Option<String>,
}

/// Identity of the caller that triggered the request
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserInfo {
    #[serde(deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub uid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub groups: Option<Vec<String>>,
}

impl AdmissionRequest {
    /// `kind.kind`, if present
    pub fn requested_kind(&self) -> Option<&str> {
        self.kind.as_ref().and_then(|gvk| gvk.kind.as_deref())
    }

    /// Request namespace; absent reads as the empty string
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    /// Target pod name, `unknown` when absent
    pub fn pod_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }

    /// Requesting username, `unknown` when absent
    pub fn username(&self) -> &str {
        self.user_info
            .as_ref()
            .and_then(|info| info.username.as_deref())
            .unwrap_or(UNKNOWN)
    }

    /// Requesting user's groups, empty when absent
    pub fn groups(&self) -> &[String] {
        self.user_info
            .as_ref()
            .and_then(|info| info.groups.as_deref())
            .unwrap_or_default()
    }
}

/// Outbound admission decision. `allowed` is always true in kube-guard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub uid: Value,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl AdmissionResponse {
    /// Allow the request identified by `uid`
    pub fn allow(uid: Value) -> Self {
        Self {
            uid,
            allowed: true,
            patch_type: None,
            patch: None,
        }
    }

    /// Attach an empty JSON patch (base64 of `[]`)
    #[must_use]
    pub fn with_noop_patch(mut self) -> Self {
        self.patch_type = Some("JSONPatch".to_string());
        self.patch = Some(general_purpose::STANDARD.encode(b"[]"));
        self
    }

    pub fn into_review(self) -> AdmissionReviewResponse {
        AdmissionReviewResponse {
            api_version: ADMISSION_API_VERSION.to_string(),
            kind: ADMISSION_REVIEW_KIND.to_string(),
            response: self,
        }
    }
}

/// Outbound AdmissionReview envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    pub api_version: String,
    pub kind: String,
    pub response: AdmissionResponse,
}
