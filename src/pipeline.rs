//! Batch extraction
//!
//! Runs filter, scan and assembly over messages in input order. A message
//! that fails is reported and skipped; the rest of the batch carries on.

use crate::assemble::assemble;
use crate::error::{ExtractError, Result};
use crate::filter::MessageFilter;
use crate::scanner::{DEFAULT_MAX_TOKENS, Scanner};
use crate::template::Template;
use crate::token::Tokenizer;
use crate::types::{MailMessage, OrderItemRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A message that produced no records because of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMessage {
    /// Failing message, when the error is scoped to one
    pub message_id: Option<String>,
    pub reason: String,
}

impl From<&ExtractError> for SkippedMessage {
    fn from(err: &ExtractError) -> Self {
        Self {
            message_id: err.message_id().map(String::from),
            reason: err.to_string(),
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Records of every processed message, in input order
    pub records: Vec<OrderItemRecord>,
    /// Messages scanned and assembled without error
    pub processed: usize,
    /// Messages dropped by the filter
    pub filtered: usize,
    pub skipped: Vec<SkippedMessage>,
}

/// Extracts order items from messages with one template
#[derive(Debug, Clone)]
pub struct Extractor<'t> {
    template: &'t Template,
    filter: MessageFilter,
    max_tokens: usize,
}

impl<'t> Extractor<'t> {
    #[must_use]
    pub fn new(template: &'t Template) -> Self {
        Self {
            template,
            filter: MessageFilter::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: MessageFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Scan and assemble one message. A message without an HTML body
    /// yields no records.
    pub fn extract_message(&self, message: &MailMessage) -> Result<Vec<OrderItemRecord>> {
        let id = &message.meta.message_id;
        let Some(html) = message.html.as_deref() else {
            debug!(message_id = %id, "No text/html part");
            return Ok(Vec::new());
        };

        let scan = Scanner::new(self.template)
            .with_max_tokens(self.max_tokens)
            .scan(Tokenizer::new(html));

        if scan.truncated {
            return Err(ExtractError::ScanTruncated {
                message_id: id.to_string(),
                tokens: scan.tokens_seen,
            });
        }

        debug!(
            message_id = %id,
            items = scan.item_ids.len(),
            tracking_id = %scan.tracking_id,
            "Scanned message"
        );
        assemble(scan, &message.meta)
    }

    /// Run a batch. Load errors arrive as `Err` items and are reported the
    /// same way as scan failures.
    pub fn run(&self, messages: impl IntoIterator<Item = Result<MailMessage>>) -> BatchReport {
        let mut report = BatchReport::default();

        for message in messages {
            let outcome = message.and_then(|message| {
                if !self.filter.matches(&message.meta) {
                    return Ok(None);
                }
                self.extract_message(&message).map(Some)
            });

            match outcome {
                Ok(Some(records)) => {
                    report.processed += 1;
                    report.records.extend(records);
                }
                Ok(None) => report.filtered += 1,
                Err(err) => {
                    warn!(message_id = err.message_id().unwrap_or("-"), error = %err, "Skipping message");
                    report.skipped.push(SkippedMessage::from(&err));
                }
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped.len(),
            filtered = report.filtered,
            records = report.records.len(),
            "Batch complete"
        );
        report
    }
}
