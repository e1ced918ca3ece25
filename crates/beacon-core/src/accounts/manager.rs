//! Admin account management
//!
//! An account is an auth user plus a profile row carrying its role. The two
//! live in different systems, so creating or deleting one is a two-step
//! operation: when the second step fails the first is undone before the
//! error is reported.

use super::traits::{IdentityProvider, ProfileStore};
use crate::error::{BeaconError, Result};
use crate::services::validation::{normalize_email, validate_password};
use beacon_types::{CreateAdminUserRequest, Profile, Role};
use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

pub struct AccountManager {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl AccountManager {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    /// Resolve a bearer token to the caller's profile, requiring the admin role
    pub async fn require_admin(&self, access_token: &str) -> Result<Profile> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(BeaconError::Auth("missing bearer token".to_string()));
        }

        let user = self.identity.user_for_token(access_token).await?;
        let profile = self
            .profiles
            .find_profile(user.id)
            .await?
            .ok_or_else(|| BeaconError::Forbidden("caller has no profile".to_string()))?;

        if !profile.is_admin() {
            return Err(BeaconError::Forbidden(format!(
                "{} is not an admin",
                profile.email
            )));
        }
        Ok(profile)
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>> {
        self.profiles.list_profiles().await
    }

    pub async fn create_user(&self, caller: &Profile, request: &CreateAdminUserRequest) -> Result<Profile> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Admin);

        let user = self.identity.create_user(&email, &request.password).await?;
        info!("{} created auth user {} for {}", caller.email, user.id, email);

        let profile = Profile {
            id: user.id,
            email,
            role,
        };
        match self.profiles.insert_profile(&profile).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                warn!("Profile insert for {} failed, removing auth user: {}", user.id, e);
                Err(compensate(e, "delete auth user", self.identity.delete_user(user.id)).await)
            }
        }
    }

    pub async fn delete_user(&self, caller: &Profile, target: Uuid) -> Result<()> {
        if caller.id == target {
            return Err(BeaconError::Forbidden(
                "admins cannot delete their own account".to_string(),
            ));
        }

        let saved = match self.profiles.find_profile(target).await? {
            Some(profile) => profile,
            None => {
                // Auth user left behind by a failed create has no profile to restore
                warn!("No profile for user {}, deleting auth user only", target);
                self.identity.delete_user(target).await?;
                info!("{} deleted profileless user {}", caller.email, target);
                return Ok(());
            }
        };

        self.profiles.delete_profile(target).await?;
        if let Err(e) = self.identity.delete_user(target).await {
            warn!("Auth user delete for {} failed, restoring profile: {}", target, e);
            return Err(compensate(e, "restore profile", self.profiles.insert_profile(&saved)).await);
        }

        info!("{} deleted user {} ({})", caller.email, target, saved.email);
        Ok(())
    }
}

/// Run the inverse of a completed step after a later step failed
async fn compensate<T>(original: BeaconError, step: &str, undo: impl Future<Output = Result<T>>) -> BeaconError {
    match undo.await {
        Ok(_) => original,
        Err(rollback) => {
            error!("Compensation '{}' failed: {} (after: {})", step, rollback, original);
            BeaconError::RollbackFailed {
                original: original.to_string(),
                rollback: rollback.to_string(),
            }
        }
    }
}
