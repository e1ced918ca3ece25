//! JSON envelopes shared by every route
//!
//! Failures are `{"success": false, "error": "..."}`; successes are
//! `{"success": true, ...}` with the payload's fields merged in.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use beacon_core::BeaconError;
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP-facing wrapper around [`BeaconError`]
#[derive(Debug)]
pub struct ApiError(pub BeaconError);

impl From<BeaconError> for ApiError {
    fn from(e: BeaconError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BeaconError::Validation(_) => StatusCode::BAD_REQUEST,
            BeaconError::Auth(_) => StatusCode::UNAUTHORIZED,
            BeaconError::Forbidden(_) => StatusCode::FORBIDDEN,
            BeaconError::NotFound(_) => StatusCode::NOT_FOUND,
            BeaconError::Conflict(_) => StatusCode::CONFLICT,
            BeaconError::Config(_)
            | BeaconError::Http(_)
            | BeaconError::Json(_)
            | BeaconError::Upstream { .. }
            | BeaconError::UnexpectedResponse { .. }
            | BeaconError::RollbackFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message; client errors drop the kind prefix
    pub fn message(&self) -> String {
        match &self.0 {
            BeaconError::Validation(m)
            | BeaconError::Auth(m)
            | BeaconError::Forbidden(m)
            | BeaconError::NotFound(m)
            | BeaconError::Conflict(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        } else {
            log::info!("Request rejected ({}): {}", status.as_u16(), self.0);
        }

        (status, Json(json!({ "success": false, "error": self.message() }))).into_response()
    }
}

pub type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// Success envelope. Objects are merged into the envelope; anything else is
/// placed under `data`.
pub fn success<T: Serialize>(payload: T) -> ApiResult {
    let value = serde_json::to_value(payload).map_err(BeaconError::from)?;
    let mut envelope = match value {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    envelope.insert("success".to_string(), Value::Bool(true));
    Ok(Json(Value::Object(envelope)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (BeaconError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (BeaconError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (BeaconError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (BeaconError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (BeaconError::Conflict("x".into()), StatusCode::CONFLICT),
            (BeaconError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                BeaconError::Upstream {
                    service: "Gmail",
                    status: 403,
                    body: "insufficient scope".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }

    #[test]
    fn vendor_errors_keep_service_and_status_in_the_message() {
        let error = ApiError(BeaconError::Upstream {
            service: "Google Analytics",
            status: 403,
            body: "PERMISSION_DENIED".into(),
        });
        let message = error.message();
        assert!(message.contains("Google Analytics"));
        assert!(message.contains("403"));
    }

    #[test]
    fn success_merges_objects_and_wraps_lists() {
        let Json(merged) = success(json!({"sentCount": 2})).unwrap();
        assert_eq!(merged, json!({"success": true, "sentCount": 2}));

        let Json(wrapped) = success(vec![1, 2]).unwrap();
        assert_eq!(wrapped, json!({"success": true, "data": [1, 2]}));
    }
}
