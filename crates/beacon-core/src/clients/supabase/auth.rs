use super::{check_supabase, SupabaseClient};
use crate::accounts::IdentityProvider;
use crate::error::{BeaconError, Result};
use async_trait::async_trait;
use beacon_types::AuthUser;
use reqwest::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .http_client
            .get(self.url("auth/v1/user"))
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(BeaconError::Auth("invalid or expired access token".to_string()));
        }
        Ok(check_supabase(response).await?.json().await?)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .request(Method::POST, "auth/v1/admin/users")
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await?;
        Ok(check_supabase(response).await?.json().await?)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("auth/v1/admin/users/{}", user_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BeaconError::NotFound(format!("user {}", user_id)));
        }
        check_supabase(response).await?;
        log::info!("Deleted auth user {}", user_id);
        Ok(())
    }
}
