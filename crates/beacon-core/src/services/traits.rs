//! Seams between the services and the outside world
//!
//! Each trait is implemented by one vendor client and mocked in tests.

use async_trait::async_trait;
use beacon_types::{
    Article, DailyValue, GrantApplication, GrantStatus, LinkedInMetric, NewGrantApplication,
    NewSubscriber, NewsletterSubscriber, Note,
};
use uuid::Uuid;

use crate::error::Result;
use crate::types::{DateWindow, DistributionDimension};

/// Website traffic per day (Google Analytics)
#[async_trait]
pub trait TrafficSource: Send + Sync {
    /// Active users per day; days without traffic may be omitted
    async fn daily_active_users(&self, window: &DateWindow) -> Result<Vec<DailyValue>>;

    /// Aggregate user count for the whole window
    async fn total_users(&self, window: &DateWindow) -> Result<u64>;
}

/// LinkedIn page statistics (Metricool)
#[async_trait]
pub trait SocialSource: Send + Sync {
    async fn timeline(&self, metric: LinkedInMetric, window: &DateWindow) -> Result<Vec<DailyValue>>;

    /// Raw follower counts per category label
    async fn distribution(
        &self,
        dimension: DistributionDimension,
        window: &DateWindow,
    ) -> Result<Vec<(String, f64)>>;
}

/// Outbound mail (Gmail)
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Acquire whatever credentials sending needs; called once per batch
    async fn connect(&self) -> Result<()>;

    /// Submit one rendered RFC 2822 message, returning the provider's message id
    async fn send_raw(&self, message: &str) -> Result<String>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn find_subscriber(&self, email: &str) -> Result<Option<NewsletterSubscriber>>;

    async fn insert_subscriber(&self, subscriber: &NewSubscriber) -> Result<NewsletterSubscriber>;

    async fn set_unsubscribed(&self, id: Uuid, unsubscribed: bool) -> Result<NewsletterSubscriber>;

    /// Newest first
    async fn list_subscribers(&self, active_only: bool) -> Result<Vec<NewsletterSubscriber>>;

    async fn delete_subscriber(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn insert_application(&self, application: &NewGrantApplication) -> Result<GrantApplication>;

    /// Newest first
    async fn list_applications(&self, status: Option<GrantStatus>) -> Result<Vec<GrantApplication>>;

    async fn update_status(&self, id: Uuid, status: GrantStatus) -> Result<GrantApplication>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Featured first, then newest
    async fn list_notes(&self) -> Result<Vec<Note>>;

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>>;
}

/// Published articles (WordPress)
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn list_articles(&self, page: u32, per_page: u32) -> Result<Vec<Article>>;

    async fn find_article(&self, id: u64) -> Result<Option<Article>>;
}
