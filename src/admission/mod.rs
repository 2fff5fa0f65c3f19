//! # Admission
//!
//! AdmissionReview wire types shared by the webhook handlers.

mod review;

pub use review::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, AdmissionReviewResponse,
    GroupVersionKind, UserInfo,
};
