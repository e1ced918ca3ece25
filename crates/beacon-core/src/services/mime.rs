//! RFC 2822 message construction
//!
//! Plain text goes out as a single `text/plain` part; HTML goes out as
//! `multipart/alternative` with a tag-stripped text part first. Bodies are
//! base64 transfer-encoded so any UTF-8 content survives transport.

use crate::error::{BeaconError, Result};
use crate::services::validation::{is_valid_email, require_single_line};
use base64::{engine::general_purpose, Engine as _};
use beacon_types::ContentType;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

const CRLF: &str = "\r\n";
const BASE64_LINE_LENGTH: usize = 76;
/// Raw bytes per RFC 2047 encoded-word, keeps each word under 75 characters
const ENCODED_WORD_BYTES: usize = 45;

static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|head)[^>]*>.*?</(script|style|head)>").expect("block regex is valid")
});
static BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6])>").expect("break regex is valid")
});
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));
static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("space regex is valid"));
static BLANK_LINES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line regex is valid"));

/// Address with optional display name
#[derive(Debug, Clone, PartialEq)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }

    pub fn address(email: impl Into<String>) -> Self {
        Self::new(email, None)
    }

    fn validate(&self, field: &str) -> Result<()> {
        require_single_line(field, &self.email)?;
        if let Some(name) = &self.name {
            require_single_line(field, name)?;
        }
        if !is_valid_email(&self.email) {
            return Err(BeaconError::Validation(format!(
                "Invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            None => f.write_str(&self.email),
            Some(name) if name.is_ascii() => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\" <{}>", escaped, self.email)
            }
            Some(name) => write!(f, "{} <{}>", encode_header(name), self.email),
        }
    }
}

/// A single message to a single recipient
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub content_type: ContentType,
    pub body: String,
}

impl OutgoingMessage {
    /// Render with a fresh boundary and the current time
    pub fn render(&self) -> Result<String> {
        let boundary = format!("beacon_{}", uuid::Uuid::new_v4().simple());
        self.render_with(&boundary, Utc::now())
    }

    pub fn render_with(&self, boundary: &str, date: DateTime<Utc>) -> Result<String> {
        self.from.validate("from")?;
        self.to.validate("to")?;
        if let Some(reply_to) = &self.reply_to {
            reply_to.validate("reply-to")?;
        }
        require_single_line("subject", &self.subject)?;

        let mut message = String::new();
        push_header(&mut message, "From", &self.from.to_string());
        push_header(&mut message, "To", &self.to.to_string());
        if let Some(reply_to) = &self.reply_to {
            push_header(&mut message, "Reply-To", &reply_to.to_string());
        }
        push_header(&mut message, "Subject", &encode_header(&self.subject));
        push_header(&mut message, "Date", &date.to_rfc2822());
        push_header(&mut message, "MIME-Version", "1.0");

        match self.content_type {
            ContentType::Text => {
                push_part_headers(&mut message, "text/plain");
                message.push_str(CRLF);
                message.push_str(&encode_body(&self.body));
            }
            ContentType::Html => {
                push_header(
                    &mut message,
                    "Content-Type",
                    &format!("multipart/alternative; boundary=\"{}\"", boundary),
                );
                message.push_str(CRLF);

                let alternatives = [
                    ("text/plain", html_to_text(&self.body)),
                    ("text/html", self.body.clone()),
                ];
                for (mime_type, body) in alternatives {
                    message.push_str(&format!("--{}{}", boundary, CRLF));
                    push_part_headers(&mut message, mime_type);
                    message.push_str(CRLF);
                    message.push_str(&encode_body(&body));
                }
                message.push_str(&format!("--{}--{}", boundary, CRLF));
            }
        }

        Ok(message)
    }
}

fn push_header(message: &mut String, name: &str, value: &str) {
    message.push_str(name);
    message.push_str(": ");
    message.push_str(value);
    message.push_str(CRLF);
}

fn push_part_headers(message: &mut String, mime_type: &str) {
    push_header(message, "Content-Type", &format!("{}; charset=\"UTF-8\"", mime_type));
    push_header(message, "Content-Transfer-Encoding", "base64");
}

/// Base64 body wrapped at 76 columns, each line CRLF-terminated
fn encode_body(body: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(body.as_bytes());
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_LENGTH * 2 + 2);
    for chunk in encoded.as_bytes().chunks(BASE64_LINE_LENGTH) {
        // base64 output is ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push_str(CRLF);
    }
    out
}

/// RFC 2047 encoding for non-ASCII header text; ASCII passes through
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in value.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", general_purpose::STANDARD.encode(text.as_bytes()))
}

/// Plain-text rendering of an HTML body for the text alternative
pub fn html_to_text(html: &str) -> String {
    let without_blocks = BLOCK_REGEX.replace_all(html, "");
    let with_breaks = BREAK_REGEX.replace_all(&without_blocks, "\n");
    let stripped = TAG_REGEX.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);
    let collapsed = SPACE_REGEX.replace_all(&decoded, " ");

    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    BLANK_LINES_REGEX
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8220;", "\u{201c}")
        .replace("&#8221;", "\u{201d}")
        .replace("&hellip;", "\u{2026}")
        .replace("&#8230;", "\u{2026}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(content_type: ContentType, body: &str) -> OutgoingMessage {
        OutgoingMessage {
            from: Mailbox::new("hello@beacon.org", Some("Beacon Foundation".to_string())),
            to: Mailbox::address("donor@example.org"),
            reply_to: None,
            subject: "Spring update".to_string(),
            content_type,
            body: body.to_string(),
        }
    }

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap()
    }

    fn decode_part(encoded: &str) -> String {
        let joined: String = encoded.split("\r\n").collect();
        String::from_utf8(general_purpose::STANDARD.decode(joined).unwrap()).unwrap()
    }

    #[test]
    fn plain_text_is_single_part() {
        let raw = message(ContentType::Text, "Thank you!").render_with("b1", fixed_date()).unwrap();

        assert!(raw.starts_with("From: \"Beacon Foundation\" <hello@beacon.org>\r\n"));
        assert!(raw.contains("To: donor@example.org\r\n"));
        assert!(raw.contains("Subject: Spring update\r\n"));
        assert!(raw.contains("Date: Tue, "));
        assert!(raw.contains("Apr 2024 09:30:00 +0000\r\n"));
        assert!(raw.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));
        assert!(!raw.contains("multipart"));

        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        assert_eq!(decode_part(body.trim_end()), "Thank you!");
    }

    #[test]
    fn html_is_multipart_alternative_with_text_first() {
        let raw = message(ContentType::Html, "<h1>Hello</h1><p>Our <b>gala</b> is on Friday.</p>")
            .render_with("sep", fixed_date())
            .unwrap();

        assert!(raw.contains("Content-Type: multipart/alternative; boundary=\"sep\"\r\n"));
        assert!(raw.ends_with("--sep--\r\n"));

        let text_at = raw.find("text/plain").unwrap();
        let html_at = raw.find("text/html").unwrap();
        assert!(text_at < html_at);

        let parts: Vec<&str> = raw.split("--sep").collect();
        // preamble, text part, html part, closing marker
        assert_eq!(parts.len(), 4);
        let (_, text_body) = parts[1].split_once("\r\n\r\n").unwrap();
        assert_eq!(decode_part(text_body.trim_end()), "Hello\nOur gala is on Friday.");
        let (_, html_body) = parts[2].split_once("\r\n\r\n").unwrap();
        assert!(decode_part(html_body.trim_end()).contains("<b>gala</b>"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        let mut msg = message(ContentType::Text, "x");
        msg.subject = "Merci à tous ❤".to_string();
        let raw = msg.render_with("b", fixed_date()).unwrap();

        let encoded = encode_header("Merci à tous ❤");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(raw.contains(&format!("Subject: {}\r\n", encoded)));
    }

    #[test]
    fn long_non_ascii_header_is_split_into_short_words() {
        let encoded = encode_header(&"é".repeat(80));
        for word in encoded.split("\r\n ") {
            assert!(word.len() <= 75, "encoded word too long: {}", word.len());
        }
    }

    #[test]
    fn body_lines_are_wrapped_at_76_columns() {
        let raw = message(ContentType::Text, &"a".repeat(500)).render_with("b", fixed_date()).unwrap();
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(body.split("\r\n").all(|line| line.len() <= 76));
    }

    #[test]
    fn header_injection_is_refused() {
        let mut msg = message(ContentType::Text, "x");
        msg.subject = "Hi\r\nBcc: everyone@example.org".to_string();
        assert!(matches!(msg.render_with("b", fixed_date()), Err(BeaconError::Validation(_))));
    }

    #[test]
    fn malformed_recipient_is_refused() {
        let mut msg = message(ContentType::Text, "x");
        msg.to = Mailbox::address("not-an-address");
        assert!(msg.render_with("b", fixed_date()).is_err());
    }

    #[test]
    fn reply_to_is_rendered_when_present() {
        let mut msg = message(ContentType::Text, "x");
        msg.reply_to = Some(Mailbox::new("visitor@example.org", Some("Visitor".to_string())));
        let raw = msg.render_with("b", fixed_date()).unwrap();
        assert!(raw.contains("Reply-To: \"Visitor\" <visitor@example.org>\r\n"));
    }

    #[test]
    fn html_to_text_drops_styles_and_decodes_entities() {
        let html = "<style>p { color: red; }</style><p>Fish &amp; chips&nbsp;tonight</p><br/><ul><li>One</li><li>Two</li></ul>";
        assert_eq!(html_to_text(html), "Fish & chips tonight\n\nOne\nTwo");
    }
}
