//! Service modules for business logic

pub mod aggregation;
pub mod contact;
pub mod content;
pub mod email_dispatch;
pub mod grants;
pub mod linkedin_analytics;
pub mod mime;
pub mod newsletter;
pub mod traffic_analytics;
pub mod traits;
pub mod validation;

// Re-export service types
pub use contact::relay_contact_message;
pub use content::ContentService;
pub use email_dispatch::EmailDispatcher;
pub use grants::GrantService;
pub use linkedin_analytics::LinkedInAnalyticsService;
pub use mime::{Mailbox, OutgoingMessage};
pub use newsletter::NewsletterService;
pub use traffic_analytics::TrafficAnalytics;
pub use traits::{
    ArticleSource, GrantStore, MailTransport, NoteStore, SocialSource, SubscriberStore,
    TrafficSource,
};
