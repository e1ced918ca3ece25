//! Supabase client: hosted auth (GoTrue) and table access (PostgREST)
//!
//! All calls use the service role key, so row level security does not apply.
//! Callers are expected to have passed the admin gate before any write.

mod auth;
mod tables;

use super::http::{build_http_client, check_response};
use crate::config::SupabaseConfig;
use crate::error::{BeaconError, Result};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

const SERVICE: &str = "Supabase";

pub struct SupabaseClient {
    config: SupabaseConfig,
    http_client: HttpClient,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        Ok(Self {
            config,
            http_client: build_http_client()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(&self.config.service_role_key)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, &format!("rest/v1/{}", table))
            .query(params)
            .send()
            .await?;
        Ok(check_supabase(response).await?.json().await?)
    }

    /// Insert one row and return it as stored
    async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(&self, table: &str, row: &B) -> Result<T> {
        let response = self
            .request(Method::POST, &format!("rest/v1/{}", table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<T> = check_supabase(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BeaconError::unexpected(SERVICE, format!("insert into {} returned no row", table)))
    }

    /// Patch the rows matching `filter` and return them
    async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        filter: &[(&str, String)],
        patch: &B,
    ) -> Result<Vec<T>> {
        let response = self
            .request(Method::PATCH, &format!("rest/v1/{}", table))
            .header("Prefer", "return=representation")
            .query(filter)
            .json(patch)
            .send()
            .await?;
        Ok(check_supabase(response).await?.json().await?)
    }

    async fn delete(&self, table: &str, filter: &[(&str, String)]) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("rest/v1/{}", table))
            .query(filter)
            .send()
            .await?;
        check_supabase(response).await?;
        Ok(())
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Conflicts and rejected input keep their own error kinds so the caller can
/// tell a duplicate signup from an outage.
async fn check_supabase(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::CONFLICT => {
            let body = response.text().await.unwrap_or_default();
            Err(BeaconError::Conflict(error_message(&body)))
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            let body = response.text().await.unwrap_or_default();
            Err(BeaconError::Validation(error_message(&body)))
        }
        _ => check_response(SERVICE, response).await,
    }
}

/// Human readable message from a PostgREST or GoTrue error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v[*key].as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_structured_fields() {
        let postgrest = r#"{"code":"23505","details":"Key (email)=(a@b.org) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"newsletter_subscribers_email_key\""}"#;
        assert!(error_message(postgrest).starts_with("duplicate key value"));

        let gotrue = r#"{"code":422,"error_code":"email_exists","msg":"A user with this email address has already been registered"}"#;
        assert_eq!(error_message(gotrue), "A user with this email address has already been registered");

        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = SupabaseClient::new(SupabaseConfig {
            url: "https://abc.supabase.co/".to_string(),
            service_role_key: "service".to_string(),
        })
        .unwrap();
        assert_eq!(client.url("rest/v1/profiles"), "https://abc.supabase.co/rest/v1/profiles");
    }
}
