//! Email dispatch payloads and per-recipient delivery reports

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    #[serde(alias = "plain")]
    Text,
    Html,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub subject: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub content_type: ContentType,
    pub content: String,
}

/// Newsletter send: recipients come from the subscriber table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterCampaign {
    pub subject: String,
    #[serde(default)]
    pub content_type: ContentType,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub email: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientResult {
    pub fn sent(email: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            email: email.into(),
            status: DeliveryStatus::Sent,
            message_id,
            error: None,
        }
    }

    pub fn failed(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: DeliveryStatus::Failed,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub sent_count: usize,
    pub failed_count: usize,
    pub results: Vec<RecipientResult>,
}

impl DeliveryReport {
    pub fn from_results(results: Vec<RecipientResult>) -> Self {
        let sent_count = results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Sent)
            .count();
        Self {
            sent_count,
            failed_count: results.len() - sent_count,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_always_cover_every_result() {
        let report = DeliveryReport::from_results(vec![
            RecipientResult::sent("a@example.org", Some("m1".to_string())),
            RecipientResult::failed("not-an-address", "Invalid email address"),
            RecipientResult::sent("b@example.org", None),
        ]);

        assert_eq!(report.sent_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.sent_count + report.failed_count, report.results.len());
    }

    #[test]
    fn plain_is_accepted_as_text_content() {
        let req: SendEmailRequest = serde_json::from_str(
            r#"{"subject": "Hi", "recipients": ["a@example.org"], "contentType": "plain", "content": "Hello"}"#,
        )
        .unwrap();
        assert_eq!(req.content_type, ContentType::Text);
    }

    #[test]
    fn failed_result_serializes_without_message_id() {
        let json = serde_json::to_value(RecipientResult::failed("x", "boom")).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("messageId").is_none());
        assert_eq!(json["error"], "boom");
    }
}
