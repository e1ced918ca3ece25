use super::{eq, SupabaseClient};
use crate::accounts::ProfileStore;
use crate::error::{BeaconError, Result};
use crate::services::traits::{GrantStore, NoteStore, SubscriberStore};
use async_trait::async_trait;
use beacon_types::{
    GrantApplication, GrantStatus, NewGrantApplication, NewSubscriber, NewsletterSubscriber, Note,
    Profile,
};
use serde_json::json;
use uuid::Uuid;

const PROFILES: &str = "profiles";
const SUBSCRIBERS: &str = "newsletter_subscribers";
const GRANTS: &str = "grant_applications";
const NOTES: &str = "notes";

fn select_all() -> (&'static str, String) {
    ("select", "*".to_string())
}

fn first_or_not_found<T>(rows: Vec<T>, what: String) -> Result<T> {
    rows.into_iter().next().ok_or(BeaconError::NotFound(what))
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .select(
                PROFILES,
                &[("select", "id,email,role".to_string()), ("id", eq(user_id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.select(
            PROFILES,
            &[("select", "id,email,role".to_string()), ("order", "email.asc".to_string())],
        )
        .await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
        self.insert(PROFILES, profile).await
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<()> {
        self.delete(PROFILES, &[("id", eq(user_id))]).await
    }
}

#[async_trait]
impl SubscriberStore for SupabaseClient {
    async fn find_subscriber(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
        let rows: Vec<NewsletterSubscriber> = self
            .select(SUBSCRIBERS, &[select_all(), ("email", eq(email))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_subscriber(&self, subscriber: &NewSubscriber) -> Result<NewsletterSubscriber> {
        self.insert(SUBSCRIBERS, subscriber).await
    }

    async fn set_unsubscribed(&self, id: Uuid, unsubscribed: bool) -> Result<NewsletterSubscriber> {
        let rows = self
            .update(
                SUBSCRIBERS,
                &[("id", eq(id))],
                &json!({ "unsubscribed": unsubscribed }),
            )
            .await?;
        first_or_not_found(rows, format!("subscriber {}", id))
    }

    async fn list_subscribers(&self, active_only: bool) -> Result<Vec<NewsletterSubscriber>> {
        let mut params = vec![select_all(), ("order", "created_at.desc".to_string())];
        if active_only {
            params.push(("unsubscribed", eq(false)));
        }
        self.select(SUBSCRIBERS, &params).await
    }

    async fn delete_subscriber(&self, id: Uuid) -> Result<()> {
        self.delete(SUBSCRIBERS, &[("id", eq(id))]).await
    }
}

#[async_trait]
impl GrantStore for SupabaseClient {
    async fn insert_application(&self, application: &NewGrantApplication) -> Result<GrantApplication> {
        let row = json!({
            "child_name": application.child_name,
            "parent_name": application.parent_name,
            "email": application.email,
            "phone": application.phone,
            "additional_notes": application.additional_notes,
            "status": GrantStatus::Pending,
        });
        self.insert(GRANTS, &row).await
    }

    async fn list_applications(&self, status: Option<GrantStatus>) -> Result<Vec<GrantApplication>> {
        let mut params = vec![select_all(), ("order", "created_at.desc".to_string())];
        if let Some(status) = status {
            params.push(("status", eq(status)));
        }
        self.select(GRANTS, &params).await
    }

    async fn update_status(&self, id: Uuid, status: GrantStatus) -> Result<GrantApplication> {
        let rows = self
            .update(GRANTS, &[("id", eq(id))], &json!({ "status": status }))
            .await?;
        first_or_not_found(rows, format!("grant application {}", id))
    }
}

#[async_trait]
impl NoteStore for SupabaseClient {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.select(
            NOTES,
            &[select_all(), ("order", "featured.desc,date.desc".to_string())],
        )
        .await
    }

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>> {
        let rows: Vec<Note> = self.select(NOTES, &[select_all(), ("id", eq(id))]).await?;
        Ok(rows.into_iter().next())
    }
}
