//! Shared types for the Beacon Foundation backend

pub mod analytics;
pub mod email;
pub mod records;

pub use analytics::{
    AnalyticsSummary, DailyValue, DateRangeKind, DateRangeRequest, DistributionEntry,
    LinkedInAnalytics, LinkedInAnalyticsRequest, LinkedInMetric,
};
pub use email::{
    ContentType, DeliveryReport, DeliveryStatus, NewsletterCampaign, RecipientResult,
    SendEmailRequest,
};
pub use records::{
    Article, AuthUser, ContactMessage, CreateAdminUserRequest, GrantApplication, GrantStatus,
    GrantStatusUpdate, NewGrantApplication, NewSubscriber, NewsletterSubscriber, Note, Profile,
    Role, UnsubscribeRequest,
};
