//! RFC 5322 message files
//!
//! Reads `.eml` exports (for example Gmail Takeout) with `mailparse` and
//! picks out the first `text/html` leaf.

use crate::error::{ExtractError, Result};
use crate::types::{MailMessage, MessageId, MessageMeta, clean_recipient, parse_received};
use std::path::Path;
use tracing::debug;

/// Parse raw message bytes. `fallback_id` names the message when it has
/// no `Message-ID` header.
pub fn parse_message(raw: &[u8], fallback_id: &str) -> Result<MailMessage> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| ExtractError::Decode {
        message_id: fallback_id.to_string(),
        reason: e.to_string(),
    })?;

    let message_id = find_header(&parsed.headers, "message-id")
        .map(|v| MessageId::from_header(&v))
        .filter(|id| !id.as_str().is_empty())
        .unwrap_or_else(|| MessageId::new(fallback_id));

    let meta = MessageMeta {
        received: find_header(&parsed.headers, "date").and_then(|v| parse_received(&v)),
        recipient: find_header(&parsed.headers, "to")
            .map(|v| clean_recipient(&v))
            .unwrap_or_default(),
        labels: find_header(&parsed.headers, "x-gmail-labels")
            .map(|v| split_labels(&v))
            .unwrap_or_default(),
        message_id,
    };

    let html = extract_html(&parsed).map_err(|e| ExtractError::Decode {
        message_id: meta.message_id.to_string(),
        reason: e.to_string(),
    })?;

    debug!(message_id = %meta.message_id, has_html = html.is_some(), "Parsed message");
    Ok(MailMessage { meta, html })
}

/// Load one `.eml` file, using the file stem as fallback message id
pub fn load_file(path: &Path) -> Result<MailMessage> {
    let raw = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    let stem = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    parse_message(&raw, &stem)
}

fn find_header(headers: &[mailparse::MailHeader], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case(name))
        .map(mailparse::MailHeader::get_value)
}

fn split_labels(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

fn extract_html(
    parsed: &mailparse::ParsedMail,
) -> std::result::Result<Option<String>, mailparse::MailParseError> {
    if parsed.subparts.is_empty() {
        if parsed.ctype.mimetype.eq_ignore_ascii_case("text/html") {
            return parsed
                .get_body()
                .map(|body| Some(body).filter(|b| !b.trim().is_empty()));
        }
        return Ok(None);
    }

    for part in &parsed.subparts {
        if let Some(html) = extract_html(part)? {
            return Ok(Some(html));
        }
    }
    Ok(None)
}
