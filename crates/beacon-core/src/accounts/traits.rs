//! Hosted auth and profile storage, split so each half of an account can be
//! created and undone on its own

use async_trait::async_trait;
use beacon_types::{AuthUser, Profile};
use uuid::Uuid;

use crate::error::Result;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a caller's bearer token; invalid or expired tokens are `Auth` errors
    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser>;

    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser>;

    async fn delete_user(&self, user_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Ordered by email
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile>;

    async fn delete_profile(&self, user_id: Uuid) -> Result<()>;
}
