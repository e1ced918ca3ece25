//! Records owned by the hosted database, plus the public form payloads that create them

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role stored on a profile row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile row keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Account as known to the hosted auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of the create-admin-user call
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub unsubscribed: bool,
    pub created_at: DateTime<Utc>,
}

/// Signup form payload (also the insert body)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSubscriber {
    pub email: String,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub featured: bool,
}

/// WordPress post reshaped into the note layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub featured: bool,
    pub link: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    Pending,
    Granted,
    Rejected,
}

impl GrantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Pending => "pending",
            GrantStatus::Granted => "granted",
            GrantStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrantApplication {
    pub id: Uuid,
    pub child_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub parent_name: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
    pub status: GrantStatus,
    pub created_at: DateTime<Utc>,
}

/// Intake form payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGrantApplication {
    #[serde(alias = "childName")]
    pub child_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(alias = "parentName")]
    pub parent_name: String,
    #[serde(default, alias = "additionalNotes")]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantStatusUpdate {
    pub status: GrantStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_row_parses_from_postgrest_json() {
        let json = r#"{
            "id": "6f1c2a0e-6a55-4a8e-9d0e-1d2b3c4d5e6f",
            "email": "director@example.org",
            "role": "admin"
        }"#;

        let profile: Profile = serde_json::from_str(json).unwrap();
        assert!(profile.is_admin());
        assert_eq!(profile.email, "director@example.org");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = r#"{"id": "6f1c2a0e-6a55-4a8e-9d0e-1d2b3c4d5e6f", "email": "a@b.org", "role": "owner"}"#;
        assert!(serde_json::from_str::<Profile>(json).is_err());
    }

    #[test]
    fn intake_form_accepts_camel_case_fields() {
        let json = r#"{
            "childName": "Sam",
            "parentName": "Alex",
            "email": "alex@example.org",
            "additionalNotes": "Needs a wheelchair ramp"
        }"#;

        let form: NewGrantApplication = serde_json::from_str(json).unwrap();
        assert_eq!(form.child_name, "Sam");
        assert_eq!(form.parent_name, "Alex");
        assert_eq!(form.phone, None);
        assert_eq!(form.additional_notes.as_deref(), Some("Needs a wheelchair ramp"));
    }

    #[test]
    fn subscriber_defaults_missing_flags() {
        let json = r#"{
            "id": "0b7d3c52-3c0e-4a49-8f9a-4c3f7e0b9d11",
            "email": "donor@example.org",
            "created_at": "2024-03-01T12:00:00Z"
        }"#;

        let subscriber: NewsletterSubscriber = serde_json::from_str(json).unwrap();
        assert!(!subscriber.unsubscribed);
        assert_eq!(subscriber.first_name, None);
    }
}
