//! Public contact form relay

use crate::error::{BeaconError, Result};
use crate::services::email_dispatch::EmailDispatcher;
use crate::services::mime::{Mailbox, OutgoingMessage};
use crate::services::validation::{normalize_email, optional_text, require_single_line, require_text};
use beacon_types::{ContactMessage, ContentType};
use log::info;

const MAX_MESSAGE_CHARS: usize = 5000;

/// Forward a visitor's message to the foundation inbox, replying to the visitor
pub async fn relay_contact_message(
    dispatcher: &EmailDispatcher,
    inbox: &str,
    form: &ContactMessage,
) -> Result<String> {
    let message = build_contact_message(dispatcher.sender(), inbox, form)?;
    let message_id = dispatcher.send_message(&message).await?;
    info!("Contact message from {} relayed as {}", form.email.trim(), message_id);
    Ok(message_id)
}

fn build_contact_message(sender: &Mailbox, inbox: &str, form: &ContactMessage) -> Result<OutgoingMessage> {
    let name = require_text("name", &form.name)?;
    require_single_line("name", name)?;
    let email = normalize_email(&form.email)?;
    let body = require_text("message", &form.message)?;
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(BeaconError::Validation(format!(
            "message must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let subject = match optional_text(form.subject.as_deref()) {
        Some(subject) => {
            require_single_line("subject", &subject)?;
            format!("Website contact: {}", subject)
        }
        None => format!("Website contact from {}", name),
    };

    Ok(OutgoingMessage {
        from: sender.clone(),
        to: Mailbox::address(inbox),
        reply_to: Some(Mailbox::new(email.clone(), Some(name.to_string()))),
        subject,
        content_type: ContentType::Text,
        body: format!("From: {} <{}>\n\n{}\n", name, email, body),
    })
}
