//! Newsletter signups and campaigns

use crate::error::{BeaconError, Result};
use crate::services::email_dispatch::EmailDispatcher;
use crate::services::traits::SubscriberStore;
use crate::services::validation::{normalize_email, optional_text};
use beacon_types::{DeliveryReport, NewSubscriber, NewsletterCampaign, NewsletterSubscriber};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

pub struct NewsletterService {
    store: Arc<dyn SubscriberStore>,
}

impl NewsletterService {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    /// Add an address, or reactivate it if it had unsubscribed.
    ///
    /// An address that is already active is a `Conflict`.
    pub async fn subscribe(&self, signup: &NewSubscriber) -> Result<NewsletterSubscriber> {
        let signup = NewSubscriber {
            email: normalize_email(&signup.email)?,
            first_name: optional_text(signup.first_name.as_deref()),
            last_name: optional_text(signup.last_name.as_deref()),
        };

        match self.store.find_subscriber(&signup.email).await? {
            Some(existing) if !existing.unsubscribed => Err(BeaconError::Conflict(format!(
                "{} is already subscribed",
                signup.email
            ))),
            Some(existing) => {
                info!("Resubscribing {}", existing.email);
                self.store.set_unsubscribed(existing.id, false).await
            }
            None => {
                info!("New newsletter subscriber {}", signup.email);
                self.store.insert_subscriber(&signup).await
            }
        }
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<NewsletterSubscriber> {
        let email = normalize_email(email)?;
        let existing = self
            .store
            .find_subscriber(&email)
            .await?
            .ok_or_else(|| BeaconError::NotFound(format!("{} is not subscribed", email)))?;

        if existing.unsubscribed {
            return Ok(existing);
        }
        info!("Unsubscribing {}", email);
        self.store.set_unsubscribed(existing.id, true).await
    }

    pub async fn list(&self) -> Result<Vec<NewsletterSubscriber>> {
        self.store.list_subscribers(false).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        info!("Deleting subscriber {}", id);
        self.store.delete_subscriber(id).await
    }

    /// Send a campaign to every active subscriber
    pub async fn send_campaign(
        &self,
        dispatcher: &EmailDispatcher,
        campaign: &NewsletterCampaign,
    ) -> Result<DeliveryReport> {
        let recipients: Vec<String> = self
            .store
            .list_subscribers(true)
            .await?
            .into_iter()
            .filter(|s| !s.unsubscribed)
            .map(|s| s.email)
            .collect();

        if recipients.is_empty() {
            return Err(BeaconError::Validation(
                "there are no active subscribers".to_string(),
            ));
        }

        dispatcher
            .send_to(
                &recipients,
                &campaign.subject,
                campaign.content_type,
                &campaign.content,
            )
            .await
    }
}
