//! Caption line printed under the barcode:
//! `product / preparer initials / prepared date / expiry date`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::consts::CAPTION_SEPARATOR;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// The four form fields a caption is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionInputs {
    pub product: String,
    pub preparer_name: String,
    pub prepared_date: String,
    pub expiry_date: String,
}

impl CaptionInputs {
    pub fn new(
        product: impl Into<String>,
        preparer_name: impl Into<String>,
        prepared_date: impl Into<String>,
        expiry_date: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            preparer_name: preparer_name.into(),
            prepared_date: prepared_date.into(),
            expiry_date: expiry_date.into(),
        }
    }

    pub fn caption(&self) -> String {
        compose_caption(&self.product, &self.preparer_name, &self.prepared_date, &self.expiry_date)
    }
}

/// First character of every whitespace separated token, no separator.
pub fn initials(name: &str) -> String {
    name.split_whitespace().filter_map(|token| token.chars().next()).collect()
}

/// Normalize a date-like string to `YYYY-MM-DD`; unparseable input is returned as is.
pub fn format_date(text: &str) -> String {
    match parse_date(text.trim()) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => text.to_string(),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok()))
}

pub fn compose_caption(product: &str, preparer_name: &str, prepared_date: &str, expiry_date: &str) -> String {
    [
        product.to_string(),
        initials(preparer_name),
        format_date(prepared_date),
        format_date(expiry_date),
    ]
    .join(CAPTION_SEPARATOR)
}
