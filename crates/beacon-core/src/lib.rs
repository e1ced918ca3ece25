//! Beacon Core Library
//!
//! Business logic for the Beacon Foundation backend: analytics aggregation,
//! email dispatch, admin account management and the public forms, plus the
//! vendor clients behind them.

pub mod accounts;
pub mod clients;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export main types for easy access
pub use config::BeaconConfig;
pub use error::{BeaconError, Result};
pub use types::{DateWindow, DistributionDimension};

pub use accounts::{AccountManager, IdentityProvider, ProfileStore};

pub use clients::{
    GmailClient,
    GoogleAnalyticsClient,
    GoogleTokenProvider,
    MetricoolClient,
    SupabaseClient,
    WordPressClient,
};

pub use services::{
    relay_contact_message,
    ContentService,
    EmailDispatcher,
    GrantService,
    LinkedInAnalyticsService,
    Mailbox,
    NewsletterService,
    TrafficAnalytics,
};
