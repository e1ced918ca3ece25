//! Beacon HTTP service
//!
//! Routes, JSON envelopes and the admin gate on top of `beacon-core`.

pub mod api_error;
pub mod http_service;

pub use api_error::{ApiError, ApiResult};
pub use http_service::{build_router, utc_today, AppState};
