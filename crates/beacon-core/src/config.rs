//! Configuration management for the Beacon backend
//!
//! Credentials come from a JSON file shaped like `credentials.json`, with
//! environment overrides of the form `BEACON__GMAIL__SENDER_EMAIL=...`.
//! Only the hosted database section is required at startup; vendor sections
//! are checked when a route needs them so a missing key surfaces as a
//! caller-visible error instead of a boot failure.

use crate::error::{BeaconError, Result};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "BEACON";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub supabase: SupabaseConfig,

    #[serde(default)]
    pub google_oauth: Option<GoogleOAuthConfig>,

    #[serde(default)]
    pub google_analytics: Option<GoogleAnalyticsConfig>,

    #[serde(default)]
    pub gmail: Option<GmailConfig>,

    #[serde(default)]
    pub metricool: Option<MetricoolConfig>,

    #[serde(default)]
    pub wordpress: Option<WordPressConfig>,

    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(alias = "base_url")]
    pub url: String,

    #[serde(alias = "service_key")]
    pub service_role_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_google_token_url")]
    pub token_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAnalyticsConfig {
    pub property_id: String,
    pub refresh_token: String,

    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    pub refresh_token: String,

    #[serde(alias = "from_email")]
    pub sender_email: String,

    #[serde(default, alias = "from_name")]
    pub sender_name: Option<String>,

    #[serde(default = "default_gmail_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricoolConfig {
    #[serde(alias = "api_key", alias = "token")]
    pub user_token: String,
    pub user_id: String,
    pub blog_id: String,

    #[serde(default = "default_metricool_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressConfig {
    #[serde(alias = "url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteConfig {
    /// Inbox that receives contact form submissions
    #[serde(default)]
    pub contact_inbox: Option<String>,

    /// Browser origin allowed by CORS; any origin when unset
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_analytics_base_url() -> String {
    "https://analyticsdata.googleapis.com/v1beta".to_string()
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

fn default_metricool_base_url() -> String {
    "https://app.metricool.com/api/v2".to_string()
}

impl BeaconConfig {
    /// Load configuration from a JSON file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BeaconError::Config(format!(
                "Failed to read config file: {} does not exist",
                path.display()
            )));
        }

        let config: Self = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string (no environment overrides)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.is_empty() || self.supabase.service_role_key.is_empty() {
            return Err(BeaconError::Config(
                "Supabase url and service_role_key are required".to_string(),
            ));
        }

        if !self.supabase.url.starts_with("http://") && !self.supabase.url.starts_with("https://") {
            return Err(BeaconError::Config(format!(
                "Supabase url must be an http(s) URL, got '{}'",
                self.supabase.url
            )));
        }

        if let Some(gmail) = &self.gmail {
            if !gmail.sender_email.contains('@') {
                return Err(BeaconError::Config(
                    "Gmail sender_email must be an email address".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn require_google_oauth(&self) -> Result<&GoogleOAuthConfig> {
        self.google_oauth
            .as_ref()
            .filter(|c| !c.client_id.is_empty() && !c.client_secret.is_empty())
            .ok_or_else(|| missing("Google OAuth client credentials"))
    }

    pub fn require_google_analytics(&self) -> Result<&GoogleAnalyticsConfig> {
        self.google_analytics
            .as_ref()
            .filter(|c| !c.property_id.is_empty() && !c.refresh_token.is_empty())
            .ok_or_else(|| missing("Google Analytics credentials"))
    }

    pub fn require_gmail(&self) -> Result<&GmailConfig> {
        self.gmail
            .as_ref()
            .filter(|c| !c.refresh_token.is_empty())
            .ok_or_else(|| missing("Gmail credentials"))
    }

    pub fn require_metricool(&self) -> Result<&MetricoolConfig> {
        self.metricool
            .as_ref()
            .filter(|c| !c.user_token.is_empty() && !c.blog_id.is_empty())
            .ok_or_else(|| missing("Metricool credentials"))
    }

    pub fn require_wordpress(&self) -> Result<&WordPressConfig> {
        self.wordpress
            .as_ref()
            .filter(|c| !c.base_url.is_empty())
            .ok_or_else(|| missing("WordPress base_url"))
    }
}

fn missing(what: &str) -> BeaconError {
    BeaconError::Config(format!("{} not configured", what))
}
