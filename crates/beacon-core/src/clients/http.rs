//! Shared HTTP plumbing for the vendor clients

use crate::error::{BeaconError, Result};
use reqwest::{Client as HttpClient, Response};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub(crate) fn build_http_client() -> Result<HttpClient> {
    HttpClient::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| BeaconError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Pass 2xx responses through; anything else becomes an `Upstream` error
/// carrying the vendor's status and body text.
pub(crate) async fn check_response(service: &'static str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    log::warn!("{} returned {}: {}", service, status, body);
    Err(BeaconError::Upstream {
        service,
        status,
        body,
    })
}
