//! Template descriptors
//!
//! A template names the inline styles and text sentinels one retailer's
//! email layout uses to mark order data. Supporting a new layout means
//! adding a descriptor, not touching the scanner.

use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens to advance after a fingerprinted tag before reading the value
pub const FINGERPRINT_LOOKAHEAD: usize = 1;

/// Tokens to advance after the tracking sentinel before reading the value
pub const TRACKING_LOOKAHEAD: usize = 2;

/// Non-empty text lines captured after the ship-to sentinel
pub const SHIP_TO_LINES: usize = 2;

/// Name of the template compiled into the crate
pub const DEFAULT_TEMPLATE: &str = "sephora";

const SEPHORA_NAME_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:700;letter-spacing:0.25;line-height:18px;text-align:left;color:#0A0A0A;";
const SEPHORA_ITEM_ID_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:400;letter-spacing:0.25;line-height:18px;text-align:left;color:#000000;";
const SEPHORA_QUANTITY_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:400;letter-spacing:0.25;line-height:18px;text-align:center;color:#4D4D4D;";

/// Per-item field identified by a style fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    ItemId,
    Name,
    Quantity,
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemId => write!(f, "item_id"),
            Self::Name => write!(f, "name"),
            Self::Quantity => write!(f, "quantity"),
        }
    }
}

/// Exact `style` attribute value that marks the next token as a field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFingerprint {
    pub field: ItemField,
    pub style: String,
}

impl StyleFingerprint {
    pub fn new(field: ItemField, style: impl Into<String>) -> Self {
        Self {
            field,
            style: style.into(),
        }
    }
}

/// Declarative description of one email layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Name used to select the template at run time
    pub name: String,

    /// Element whose `style` attribute is compared against fingerprints
    #[serde(default = "default_container_tag")]
    pub container_tag: String,

    /// Checked in order; the first match on a tag wins
    pub fingerprints: Vec<StyleFingerprint>,

    /// Removed from captured item ids before trimming
    #[serde(default = "default_item_id_strip")]
    pub item_id_strip: String,

    #[serde(default = "default_tracking_sentinel")]
    pub tracking_sentinel: String,

    #[serde(default = "default_ship_to_sentinel")]
    pub ship_to_sentinel: String,

    #[serde(default = "default_fingerprint_lookahead")]
    pub fingerprint_lookahead: usize,

    #[serde(default = "default_tracking_lookahead")]
    pub tracking_lookahead: usize,

    #[serde(default = "default_ship_to_lines")]
    pub ship_to_lines: usize,
}

fn default_container_tag() -> String {
    "div".into()
}

fn default_item_id_strip() -> String {
    "ITEM".into()
}

fn default_tracking_sentinel() -> String {
    "TRACKING #:".into()
}

fn default_ship_to_sentinel() -> String {
    "SHIP TO:".into()
}

const fn default_fingerprint_lookahead() -> usize {
    FINGERPRINT_LOOKAHEAD
}

const fn default_tracking_lookahead() -> usize {
    TRACKING_LOOKAHEAD
}

const fn default_ship_to_lines() -> usize {
    SHIP_TO_LINES
}

impl Template {
    /// Shipping confirmation layout of the Sephora order emails
    #[must_use]
    pub fn sephora() -> Self {
        Self {
            name: DEFAULT_TEMPLATE.into(),
            container_tag: default_container_tag(),
            fingerprints: vec![
                StyleFingerprint::new(ItemField::ItemId, SEPHORA_ITEM_ID_STYLE),
                StyleFingerprint::new(ItemField::Name, SEPHORA_NAME_STYLE),
                StyleFingerprint::new(ItemField::Quantity, SEPHORA_QUANTITY_STYLE),
            ],
            item_id_strip: default_item_id_strip(),
            tracking_sentinel: default_tracking_sentinel(),
            ship_to_sentinel: default_ship_to_sentinel(),
            fingerprint_lookahead: FINGERPRINT_LOOKAHEAD,
            tracking_lookahead: TRACKING_LOOKAHEAD,
            ship_to_lines: SHIP_TO_LINES,
        }
    }

    /// Templates compiled into the crate
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::sephora()]
    }

    /// Field whose fingerprint equals `style`, if any
    #[must_use]
    pub fn match_style(&self, style: &str) -> Option<ItemField> {
        self.fingerprints
            .iter()
            .find(|fp| fp.style == style)
            .map(|fp| fp.field)
    }

    /// Reject descriptors the scanner cannot run
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(ExtractError::InvalidTemplate(format!(
                "{}: {reason}",
                self.name
            )))
        };

        if self.name.trim().is_empty() {
            return Err(ExtractError::InvalidTemplate("template name is empty".into()));
        }
        if self.container_tag.trim().is_empty() {
            return fail("container_tag is empty");
        }
        if self.fingerprints.iter().any(|fp| fp.style.is_empty()) {
            return fail("fingerprint style is empty");
        }
        for field in [ItemField::ItemId, ItemField::Name, ItemField::Quantity] {
            if !self.fingerprints.iter().any(|fp| fp.field == field) {
                return fail(&format!("no fingerprint for {field}"));
            }
        }
        if self.tracking_sentinel.trim().is_empty() || self.ship_to_sentinel.trim().is_empty() {
            return fail("sentinel is empty");
        }
        if self.fingerprint_lookahead == 0 || self.tracking_lookahead == 0 {
            return fail("lookahead must be at least 1");
        }
        if self.ship_to_lines == 0 {
            return fail("ship_to_lines must be at least 1");
        }
        Ok(())
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::sephora()
    }
}

/// Built-in templates plus any loaded from configuration
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    /// Built-in templates, then `extra` in order. A later template replaces
    /// an earlier one with the same name.
    pub fn new(extra: impl IntoIterator<Item = Template>) -> Result<Self> {
        let mut templates = Template::builtin();
        for template in extra {
            template.validate()?;
            match templates.iter_mut().find(|t| t.name == template.name) {
                Some(existing) => *existing = template,
                None => templates.push(template),
            }
        }
        Ok(Self { templates })
    }

    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ExtractError::UnknownTemplate(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            templates: Template::builtin(),
        }
    }
}
