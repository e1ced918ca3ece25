//! Client modules for external services

mod http;

pub mod gmail;
pub mod google_analytics;
pub mod google_oauth;
pub mod metricool;
pub mod supabase;
pub mod wordpress;

// Re-export all client types
pub use gmail::GmailClient;
pub use google_analytics::GoogleAnalyticsClient;
pub use google_oauth::GoogleTokenProvider;
pub use metricool::MetricoolClient;
pub use supabase::SupabaseClient;
pub use wordpress::WordPressClient;
