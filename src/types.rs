//! Core types for messages and extracted order items

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider message id wrapper type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id from a `Message-ID` header, without the angle brackets
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        Self(
            value
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string(),
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message-level values copied into every record of the message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMeta {
    pub message_id: MessageId,

    /// `To` header with angle brackets removed
    pub recipient: String,

    /// Parsed `Date` header
    pub received: Option<DateTime<FixedOffset>>,

    /// Provider labels attached to the message
    pub labels: Vec<String>,
}

impl MessageMeta {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(message_id),
            ..Self::default()
        }
    }

    /// Calendar day the message was received, in its own offset
    #[must_use]
    pub fn received_date(&self) -> Option<NaiveDate> {
        self.received.map(|dt| dt.date_naive())
    }
}

/// Clean a `To` header value for output
#[must_use]
pub fn clean_recipient(value: &str) -> String {
    value.replace(['<', '>'], "").trim().to_string()
}

/// Parse an RFC 2822 `Date` header
#[must_use]
pub fn parse_received(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value.trim()).ok()
}

/// One exported message, decoded and ready to scan
#[derive(Debug, Clone, Default)]
pub struct MailMessage {
    pub meta: MessageMeta,

    /// Decoded `text/html` body, if the message has one
    pub html: Option<String>,
}

/// One line item of one order email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub received: Option<DateTime<FixedOffset>>,
    pub item_name: String,
    pub item_id: String,
    pub item_quantity: String,
    pub tracking_id: String,
    pub ship_to: String,
    pub message_id: MessageId,
    pub recipient: String,
}

impl OrderItemRecord {
    /// Received timestamp rendered with a `strftime` format, empty when unknown
    #[must_use]
    pub fn received_display(&self, format: &str) -> String {
        self.received
            .map(|dt| dt.format(format).to_string())
            .unwrap_or_default()
    }
}
