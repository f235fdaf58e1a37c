//! Order field scanner
//!
//! One forward pass over a token stream. Style fingerprints and text
//! sentinels switch the scanner into a capture state; the capture state
//! consumes tokens until it lands on the value.
//!
//! The lookahead after a fingerprint or the tracking sentinel is a fixed
//! token count and does not look at content: a whitespace-only text node
//! between marker and value shifts the capture onto the wrong token. The
//! ship-to capture skips to the next non-empty text instead.

use crate::template::{ItemField, Template};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Token budget used when none is configured
pub const DEFAULT_MAX_TOKENS: usize = 1_000_000;

/// Everything captured from one message's token stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerMessageScan {
    /// Item ids in document order, strip text removed and trimmed
    pub item_ids: Vec<String>,

    /// Item names in document order, as captured
    pub item_names: Vec<String>,

    /// Item quantities in document order, as captured
    pub item_quantities: Vec<String>,

    /// Last value captured after the tracking sentinel
    pub tracking_id: String,

    /// Captured address lines joined by `\n`
    pub ship_to: String,

    /// Tokens read from the stream
    pub tokens_seen: usize,

    /// Scan stopped at the token budget
    pub truncated: bool,
}

impl PerMessageScan {
    /// Number of line items, if the three sequences agree
    #[must_use]
    pub const fn item_count(&self) -> Option<usize> {
        let ids = self.item_ids.len();
        if ids == self.item_names.len() && ids == self.item_quantities.len() {
            Some(ids)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
            && self.item_names.is_empty()
            && self.item_quantities.is_empty()
            && self.tracking_id.is_empty()
            && self.ship_to.is_empty()
    }
}

/// What a capture state writes once it lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    Item(ItemField),
    Tracking,
}

/// Scanner state between tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for a fingerprint or sentinel
    Seeking,
    /// Consuming `remaining` tokens; the last one holds the value
    Capture {
        target: CaptureTarget,
        remaining: usize,
    },
    /// Collecting non-empty text lines after the ship-to sentinel
    ShipTo { lines: Vec<String> },
}

/// Field extractor for one template
#[derive(Debug, Clone)]
pub struct Scanner<'t> {
    template: &'t Template,
    max_tokens: usize,
}

impl<'t> Scanner<'t> {
    #[must_use]
    pub const fn new(template: &'t Template) -> Self {
        Self {
            template,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Stop after this many tokens and mark the scan truncated
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Scan a token stream to its end. Never fails: markers that do not
    /// appear leave their fields empty.
    #[must_use]
    pub fn scan(&self, tokens: impl IntoIterator<Item = Token>) -> PerMessageScan {
        let mut scan = PerMessageScan::default();
        let mut state = ScanState::Seeking;
        let mut tokens = tokens.into_iter();

        loop {
            if scan.tokens_seen >= self.max_tokens {
                scan.truncated = tokens.next().is_some();
                break;
            }
            let Some(token) = tokens.next() else {
                break;
            };
            scan.tokens_seen += 1;
            state = self.step(state, &token, &mut scan);
        }

        if state != ScanState::Seeking {
            debug!(?state, "Token stream ended mid-capture");
        }
        scan
    }

    /// Advance the state machine by one token
    #[must_use]
    pub fn step(&self, state: ScanState, token: &Token, scan: &mut PerMessageScan) -> ScanState {
        match state {
            ScanState::Seeking => self.seek(token),
            ScanState::Capture { target, remaining } => {
                if remaining > 1 {
                    return ScanState::Capture {
                        target,
                        remaining: remaining - 1,
                    };
                }
                self.land(target, token.text().unwrap_or_default(), scan);
                ScanState::Seeking
            }
            ScanState::ShipTo { mut lines } => {
                let Some(line) = token.text().map(str::trim).filter(|t| !t.is_empty()) else {
                    return ScanState::ShipTo { lines };
                };
                lines.push(line.to_string());
                if lines.len() < self.template.ship_to_lines {
                    return ScanState::ShipTo { lines };
                }
                scan.ship_to = lines.join("\n");
                debug!(ship_to = %scan.ship_to, "Captured ship-to address");
                ScanState::Seeking
            }
        }
    }

    fn seek(&self, token: &Token) -> ScanState {
        match token {
            Token::StartTag(tag) if !tag.self_closing && tag.name == self.template.container_tag => {
                tag.attrs
                    .iter()
                    .filter(|a| a.key == "style")
                    .find_map(|a| self.template.match_style(&a.value))
                    .map_or(ScanState::Seeking, |field| ScanState::Capture {
                        target: CaptureTarget::Item(field),
                        remaining: self.template.fingerprint_lookahead,
                    })
            }
            Token::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    ScanState::Seeking
                } else if text == self.template.tracking_sentinel {
                    ScanState::Capture {
                        target: CaptureTarget::Tracking,
                        remaining: self.template.tracking_lookahead,
                    }
                } else if text == self.template.ship_to_sentinel {
                    ScanState::ShipTo { lines: Vec::new() }
                } else {
                    ScanState::Seeking
                }
            }
            _ => ScanState::Seeking,
        }
    }

    fn land(&self, target: CaptureTarget, text: &str, scan: &mut PerMessageScan) {
        trace!(?target, text, "Captured value");
        match target {
            CaptureTarget::Item(ItemField::ItemId) => {
                let id = text.replace(self.template.item_id_strip.as_str(), "");
                scan.item_ids.push(id.trim().to_string());
            }
            CaptureTarget::Item(ItemField::Name) => scan.item_names.push(text.to_string()),
            CaptureTarget::Item(ItemField::Quantity) => {
                scan.item_quantities.push(text.to_string());
            }
            CaptureTarget::Tracking => scan.tracking_id = text.to_string(),
        }
    }
}

/// Scan with the default token budget
#[must_use]
pub fn scan(tokens: impl IntoIterator<Item = Token>, template: &Template) -> PerMessageScan {
    Scanner::new(template).scan(tokens)
}
