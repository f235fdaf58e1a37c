//! Label and date-range message filter
//!
//! Mirrors the mailbox search syntax `label:<name> after:<date> before:<date>`
//! so the same filter can be handed to the provider or applied to exported
//! messages.

use crate::error::{ExtractError, Result};
use crate::types::MessageMeta;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TERM_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(?i)(label|after|before):(\S+)$").unwrap()
});

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Which messages to extract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilter {
    /// Label the message must carry, compared exactly
    pub label: Option<String>,

    /// First received day included
    pub after: Option<NaiveDate>,

    /// First received day excluded
    pub before: Option<NaiveDate>,
}

impl MessageFilter {
    /// Parse a search query. Unknown terms are rejected rather than ignored.
    pub fn parse(query: &str) -> Result<Self> {
        let mut filter = Self::default();

        for term in query.split_whitespace() {
            let caps = TERM_REGEX
                .captures(term)
                .ok_or_else(|| ExtractError::InvalidQuery(format!("unsupported term '{term}'")))?;
            let value = &caps[2];
            match caps[1].to_ascii_lowercase().as_str() {
                "label" => filter.label = Some(value.to_string()),
                "after" => filter.after = Some(parse_date(value)?),
                _ => filter.before = Some(parse_date(value)?),
            }
        }

        Ok(filter)
    }

    /// Render as a search query that [`MessageFilter::parse`] reads back
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut terms = Vec::new();
        if let Some(label) = &self.label {
            terms.push(format!("label:{label}"));
        }
        if let Some(after) = self.after {
            terms.push(format!("after:{}", after.format(QUERY_DATE_FORMAT)));
        }
        if let Some(before) = self.before {
            terms.push(format!("before:{}", before.format(QUERY_DATE_FORMAT)));
        }
        terms.join(" ")
    }

    /// Replace individual terms; `None` keeps the current value
    pub fn with_overrides(
        mut self,
        label: Option<&str>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Self> {
        if let Some(label) = label {
            self.label = Some(label.to_string());
        }
        if let Some(after) = after {
            self.after = Some(parse_date(after)?);
        }
        if let Some(before) = before {
            self.before = Some(parse_date(before)?);
        }
        Ok(self)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.label.is_none() && self.after.is_none() && self.before.is_none()
    }

    /// Whether a message passes every bound that is set. Messages without
    /// a received date fail any date bound.
    #[must_use]
    pub fn matches(&self, meta: &MessageMeta) -> bool {
        if let Some(label) = &self.label
            && !meta.labels.iter().any(|l| l == label)
        {
            return false;
        }

        if self.after.is_none() && self.before.is_none() {
            return true;
        }
        let Some(day) = meta.received_date() else {
            return false;
        };
        self.after.is_none_or(|after| day >= after) && self.before.is_none_or(|before| day < before)
    }

    /// Default export file name, `items_<after>_<before>.csv`
    #[must_use]
    pub fn csv_file_name(&self) -> String {
        let bound = |date: Option<NaiveDate>| {
            date.map_or_else(|| "all".to_string(), |d| d.format(QUERY_DATE_FORMAT).to_string())
        };
        format!("items_{}_{}.csv", bound(self.after), bound(self.before))
    }
}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD`
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, QUERY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .map_err(|e| ExtractError::InvalidQuery(format!("bad date '{value}': {e}")))
}
