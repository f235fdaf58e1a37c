//! Gmail API message documents
//!
//! Reads the JSON returned by `users.messages.get` with `format=full`,
//! either one message per file or an array of messages.

use crate::error::{ExtractError, Result};
use crate::types::{MailMessage, MessageId, MessageMeta, clean_recipient, parse_received};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// base64url as Gmail emits it; padding is accepted but not required
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub payload: Option<GmailPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailPayload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<GmailHeader>,
    #[serde(default)]
    pub body: Option<GmailBody>,
    #[serde(default)]
    pub parts: Vec<GmailPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GmailHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GmailBody {
    /// Decoded body length; zero for container parts
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    One(GmailMessage),
    Many(Vec<GmailMessage>),
}

impl GmailMessage {
    /// First top-level header named `name`, compared case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Encoded data of the first `text/html` part with a non-zero size,
    /// depth first
    #[must_use]
    pub fn html_data(&self) -> Option<&str> {
        self.payload.as_ref().and_then(find_html)
    }

    /// Decode the HTML body and collect the message-level fields
    pub fn into_mail(self) -> Result<MailMessage> {
        let html = self
            .html_data()
            .map(|data| decode_body(&self.id, data))
            .transpose()?;

        let meta = MessageMeta {
            received: self.header("Date").and_then(parse_received),
            recipient: self.header("To").map(clean_recipient).unwrap_or_default(),
            message_id: MessageId::new(self.id),
            labels: self.label_ids,
        };

        Ok(MailMessage { meta, html })
    }
}

fn find_html(payload: &GmailPayload) -> Option<&str> {
    if payload.mime_type.eq_ignore_ascii_case("text/html")
        && let Some(body) = &payload.body
        && body.size > 0
        && let Some(data) = body.data.as_deref()
        && !data.is_empty()
    {
        return Some(data);
    }
    payload.parts.iter().find_map(find_html)
}

/// Decode a base64url body part
pub fn decode_body(message_id: &str, data: &str) -> Result<String> {
    let bytes = BODY_ENGINE
        .decode(data.trim())
        .map_err(|e| ExtractError::Decode {
            message_id: message_id.to_string(),
            reason: format!("base64url body: {e}"),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a document holding one message or an array of messages
pub fn parse_document(json: &str, origin: &str) -> Result<Vec<GmailMessage>> {
    let document: Document = serde_json::from_str(json).map_err(|e| ExtractError::Decode {
        message_id: origin.to_string(),
        reason: format!("Gmail JSON: {e}"),
    })?;
    Ok(match document {
        Document::One(message) => vec![message],
        Document::Many(messages) => messages,
    })
}

/// Load a Gmail JSON file. A broken file fails as a whole; a broken body
/// fails only its own message.
pub fn load_file(path: &Path) -> Result<Vec<Result<MailMessage>>> {
    let json = std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
    let messages = parse_document(&json, &path.display().to_string())?;
    debug!(path = %path.display(), count = messages.len(), "Loaded Gmail messages");
    Ok(messages.into_iter().map(GmailMessage::into_mail).collect())
}
