//! Per-recipient email dispatch

use crate::error::{BeaconError, Result};
use crate::services::mime::{Mailbox, OutgoingMessage};
use crate::services::traits::MailTransport;
use crate::services::validation::{require_single_line, require_text};
use beacon_types::{ContentType, DeliveryReport, RecipientResult, SendEmailRequest};
use log::{info, warn};
use std::sync::Arc;

/// Sends one message per recipient through a [`MailTransport`].
///
/// Recipients are handled sequentially. A recipient that cannot be addressed
/// or that the provider rejects is reported as failed without stopping the
/// batch; only a failure to obtain credentials aborts the whole send.
pub struct EmailDispatcher {
    transport: Arc<dyn MailTransport>,
    sender: Mailbox,
}

impl EmailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, sender: Mailbox) -> Self {
        Self { transport, sender }
    }

    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    pub async fn send(&self, request: &SendEmailRequest) -> Result<DeliveryReport> {
        if request.recipients.is_empty() {
            return Err(BeaconError::Validation(
                "at least one recipient is required".to_string(),
            ));
        }
        self.send_to(
            &request.recipients,
            &request.subject,
            request.content_type,
            &request.content,
        )
        .await
    }

    pub(crate) async fn send_to(
        &self,
        recipients: &[String],
        subject: &str,
        content_type: ContentType,
        content: &str,
    ) -> Result<DeliveryReport> {
        let subject = require_text("subject", subject)?;
        require_single_line("subject", subject)?;
        if content.trim().is_empty() {
            return Err(BeaconError::Validation("content is required".to_string()));
        }

        self.transport.connect().await?;

        info!("Sending '{}' to {} recipient(s)", subject, recipients.len());
        let mut results = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let address = recipient.trim();
            let message = OutgoingMessage {
                from: self.sender.clone(),
                to: Mailbox::address(address),
                reply_to: None,
                subject: subject.to_string(),
                content_type,
                body: content.to_string(),
            };

            let result = match self.deliver(&message).await {
                Ok(message_id) => RecipientResult::sent(recipient.clone(), Some(message_id)),
                Err(e) => {
                    warn!("Delivery to {} failed: {}", address, e);
                    RecipientResult::failed(recipient.clone(), failure_reason(&e))
                }
            };
            results.push(result);
        }

        let report = DeliveryReport::from_results(results);
        info!(
            "Dispatch finished: {} sent, {} failed",
            report.sent_count, report.failed_count
        );
        Ok(report)
    }

    /// Send a single prepared message, acquiring credentials first
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<String> {
        self.transport.connect().await?;
        self.deliver(message).await
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<String> {
        let raw = message.render()?;
        self.transport.send_raw(&raw).await
    }
}

fn failure_reason(error: &BeaconError) -> String {
    match error {
        BeaconError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}
