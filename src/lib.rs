// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Order Email Extractor
//!
//! Pulls order line items out of retailer shipping emails. Each message's
//! HTML body is tokenized and scanned for the inline styles and text
//! labels a known email template uses to mark item ids, names, quantities,
//! the tracking number and the shipping address. The captures are zipped
//! into one record per line item and written as CSV.
//!
//! # Features
//!
//! - Lazy HTML5 tokenizer on html5ever (no DOM)
//! - Templates as data: fingerprints, sentinels and lookahead offsets
//! - Gmail API JSON and `.eml` readers
//! - Per-message failure isolation with a batch report
//!
//! # Example
//!
//! ```rust
//! use order_extract::{MessageMeta, Template, Tokenizer, assemble, scan};
//!
//! let html = r#"<p>TRACKING #:<br>1Z999AA10123456784</p>"#;
//! let template = Template::sephora();
//! let captured = scan(Tokenizer::new(html), &template);
//! assert_eq!(captured.tracking_id, "1Z999AA10123456784");
//!
//! let records = assemble(captured, &MessageMeta::new("msg-1")).unwrap();
//! assert!(records.is_empty());
//! ```

mod assemble;
pub mod config;
pub mod eml;
mod error;
pub mod export;
mod filter;
pub mod gmail;
mod pipeline;
mod scanner;
pub mod source;
mod template;
mod token;
mod types;

pub use assemble::assemble;
pub use error::{ExtractError, Result};
pub use export::{CsvOptions, export_csv, write_csv};
pub use filter::MessageFilter;
pub use pipeline::{BatchReport, Extractor, SkippedMessage};
pub use scanner::{CaptureTarget, DEFAULT_MAX_TOKENS, PerMessageScan, ScanState, Scanner, scan};
pub use template::{
    DEFAULT_TEMPLATE, FINGERPRINT_LOOKAHEAD, ItemField, SHIP_TO_LINES, StyleFingerprint,
    TRACKING_LOOKAHEAD, Template, TemplateSet,
};
pub use token::{Attribute, Tag, Token, Tokenizer};
pub use types::*;
