//! Google OAuth2 access tokens from stored refresh tokens
//!
//! Analytics and Gmail each hold their own refresh token. Access tokens are
//! cached per refresh token and reused until shortly before they expire.

use super::http::{build_http_client, check_response};
use crate::config::GoogleOAuthConfig;
use crate::error::{BeaconError, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

const SERVICE: &str = "Google OAuth";
const DEFAULT_EXPIRY_BUFFER_SECONDS: i64 = 60;

#[derive(Clone, Debug)]
struct TokenCache {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct GoogleTokenProvider {
    config: GoogleOAuthConfig,
    http_client: HttpClient,
    /// refresh token -> access token
    token_cache: Mutex<HashMap<String, TokenCache>>,
    expiry_buffer_seconds: i64,
}

impl GoogleTokenProvider {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self> {
        Self::with_expiry_buffer(config, DEFAULT_EXPIRY_BUFFER_SECONDS)
    }

    pub fn with_expiry_buffer(config: GoogleOAuthConfig, expiry_buffer_seconds: i64) -> Result<Self> {
        Ok(Self {
            config,
            http_client: build_http_client()?,
            token_cache: Mutex::new(HashMap::new()),
            expiry_buffer_seconds,
        })
    }

    /// Access token for `refresh_token`, served from cache while it is valid
    pub async fn access_token(&self, refresh_token: &str) -> Result<String> {
        if let Some(token) = self.cached_token(refresh_token) {
            log::debug!("Using cached Google access token");
            return Ok(token);
        }

        log::info!("Exchanging refresh token for a Google access token");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;
        let data: Value = check_response(SERVICE, response).await?.json().await?;

        let (access_token, expires_at) = parse_token_response(&data, Utc::now())?;
        self.token_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                refresh_token.to_string(),
                TokenCache {
                    access_token: access_token.clone(),
                    expires_at,
                },
            );
        log::info!("Cached Google access token (expires at {})", expires_at);

        Ok(access_token)
    }

    fn cached_token(&self, refresh_token: &str) -> Option<String> {
        let cache = self.token_cache.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.get(refresh_token)?;
        let threshold = cached.expires_at - Duration::seconds(self.expiry_buffer_seconds);
        if Utc::now() < threshold {
            Some(cached.access_token.clone())
        } else {
            log::info!(
                "Cached Google token is near expiry (expires at {}), refreshing",
                cached.expires_at
            );
            None
        }
    }
}

/// Extract the token and its absolute expiry from a token endpoint response
fn parse_token_response(data: &Value, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>)> {
    let access_token = data["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BeaconError::unexpected(SERVICE, "no access_token in token response"))?;

    let expires_in = data["expires_in"]
        .as_i64()
        .ok_or_else(|| BeaconError::unexpected(SERVICE, "no expires_in in token response"))?;

    Ok((access_token.to_string(), now + Duration::seconds(expires_in)))
}

#[cfg(test)]
impl GoogleTokenProvider {
    pub fn set_cached_token_for_test(&self, refresh_token: &str, token: &str, expires_in_seconds: i64) {
        let mut cache = self.token_cache.lock().unwrap();
        cache.insert(
            refresh_token.to_string(),
            TokenCache {
                access_token: token.to_string(),
                expires_at: Utc::now() + Duration::seconds(expires_in_seconds),
            },
        );
    }

    pub fn is_token_cached(&self, refresh_token: &str) -> bool {
        self.token_cache.lock().unwrap().contains_key(refresh_token)
    }

    pub fn cache_size(&self) -> usize {
        self.token_cache.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(buffer: i64) -> GoogleTokenProvider {
        let config = GoogleOAuthConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            // unroutable, so a cache miss fails fast instead of calling Google
            token_url: "http://127.0.0.1:9/token".to_string(),
        };
        GoogleTokenProvider::with_expiry_buffer(config, buffer).unwrap()
    }

    #[tokio::test]
    async fn valid_cached_token_is_reused() {
        let provider = provider(60);
        provider.set_cached_token_for_test("analytics-refresh", "ya29.cached", 120);

        let token = provider.access_token("analytics-refresh").await.unwrap();
        assert_eq!(token, "ya29.cached");
    }

    #[tokio::test]
    async fn token_inside_the_buffer_is_not_served() {
        let provider = provider(60);
        provider.set_cached_token_for_test("gmail-refresh", "ya29.expiring", 30);

        assert!(provider.cached_token("gmail-refresh").is_none());
        assert!(provider.access_token("gmail-refresh").await.is_err());
    }

    #[test]
    fn zero_buffer_serves_until_expiry() {
        let provider = provider(0);
        provider.set_cached_token_for_test("r", "ya29.short", 5);
        assert_eq!(provider.cached_token("r").as_deref(), Some("ya29.short"));

        provider.set_cached_token_for_test("r", "ya29.expired", -1);
        assert!(provider.cached_token("r").is_none());
    }

    #[test]
    fn refresh_tokens_are_cached_separately() {
        let provider = provider(60);
        provider.set_cached_token_for_test("analytics", "a", 120);
        provider.set_cached_token_for_test("gmail", "g", 120);
        provider.set_cached_token_for_test("gmail", "g2", 120);

        assert_eq!(provider.cache_size(), 2);
        assert!(provider.is_token_cached("analytics"));
        assert_eq!(provider.cached_token("gmail").as_deref(), Some("g2"));
    }

    #[test]
    fn token_response_expiry_is_relative_to_now() {
        let now = Utc::now();
        let data = json!({"access_token": "ya29.fresh", "expires_in": 3599, "token_type": "Bearer"});

        let (token, expires_at) = parse_token_response(&data, now).unwrap();
        assert_eq!(token, "ya29.fresh");
        assert_eq!(expires_at, now + Duration::seconds(3599));
    }

    #[test]
    fn error_shaped_token_response_is_rejected() {
        let data = json!({"error": "invalid_grant", "error_description": "Token has been expired or revoked."});
        assert!(matches!(
            parse_token_response(&data, Utc::now()),
            Err(BeaconError::UnexpectedResponse { .. })
        ));
    }
}
