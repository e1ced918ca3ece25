//! Gmail API transport

use super::google_oauth::GoogleTokenProvider;
use super::http::{build_http_client, check_response};
use crate::config::GmailConfig;
use crate::error::{BeaconError, Result};
use crate::services::mime::Mailbox;
use crate::services::traits::MailTransport;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use std::sync::Arc;

const SERVICE: &str = "Gmail";

pub struct GmailClient {
    config: GmailConfig,
    tokens: Arc<GoogleTokenProvider>,
    http_client: HttpClient,
}

impl GmailClient {
    pub fn new(config: GmailConfig, tokens: Arc<GoogleTokenProvider>) -> Result<Self> {
        Ok(Self {
            config,
            tokens,
            http_client: build_http_client()?,
        })
    }

    /// Configured sender identity
    pub fn sender(&self) -> Mailbox {
        Mailbox::new(self.config.sender_email.clone(), self.config.sender_name.clone())
    }
}

#[async_trait]
impl MailTransport for GmailClient {
    async fn connect(&self) -> Result<()> {
        self.tokens.access_token(&self.config.refresh_token).await.map(|_| ())
    }

    async fn send_raw(&self, message: &str) -> Result<String> {
        let access_token = self.tokens.access_token(&self.config.refresh_token).await?;
        let url = format!("{}/users/me/messages/send", self.config.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({ "raw": encode_raw(message) }))
            .send()
            .await?;
        let data: Value = check_response(SERVICE, response).await?.json().await?;

        data["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BeaconError::unexpected(SERVICE, "send response has no message id"))
    }
}

/// Gmail expects the full RFC 2822 message as unpadded base64url
fn encode_raw(message: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(message.as_bytes())
}
