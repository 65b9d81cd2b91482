//! Data model for the user profile dataset
//!
//! The payload arrives as one JSON document with human-readable column
//! names. Rows are immutable after deserialization; anything malformed at
//! the field level (dates, topic lists) is handled per row at read time
//! rather than failing the whole dataset.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// One user/profile record in the raw dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(rename = "Country", default)]
    pub country: String,

    #[serde(rename = "Repositories Count", default)]
    pub repositories_count: u32,

    #[serde(rename = "Followers", default)]
    pub followers: u32,

    #[serde(rename = "Most Used Language", default)]
    pub most_used_language: String,

    #[serde(rename = "Total Stars", default)]
    pub total_stars: u32,

    #[serde(rename = "Account Created At", default)]
    pub account_created_at: String,

    #[serde(rename = "Hireable", default, deserialize_with = "deserialize_truthy")]
    pub hireable: bool,

    /// Raw topic list as delivered: sometimes a JSON array, sometimes a
    /// quasi-JSON string with single quotes. Use [`parse_topics`] to read it.
    #[serde(rename = "Unique Topics", default)]
    pub unique_topics: serde_json::Value,

    #[serde(rename = "Total Repository Size", default)]
    pub total_repository_size: f64,
}

impl Row {
    /// Calendar year the account was created in, or `None` when the
    /// timestamp doesn't parse. Accepts RFC 3339 plus a couple of the
    /// date formats the exporter has been seen to emit.
    pub fn created_year(&self) -> Option<i32> {
        let s = self.account_created_at.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.year());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.year());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt.year());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(d.year());
        }
        None
    }

    /// Parsed topic list for this row; empty on any parse failure.
    pub fn topics(&self) -> Vec<String> {
        parse_topics(&self.unique_topics)
    }
}

/// The full immutable collection of rows, fetched once per session.
pub type Dataset = Arc<Vec<Row>>;

/// State of the one dataset fetch, as seen by the UI.
#[derive(Debug, Clone)]
pub enum FetchState {
    /// Fetch still in flight.
    Pending,
    /// Fetch failed after retries; the whole dashboard shows the error.
    Failed(String),
    /// Dataset ready.
    Ready(Dataset),
}

impl FetchState {
    pub fn rows(&self) -> Option<&Dataset> {
        match self {
            FetchState::Ready(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Extract a topic list from the raw field value.
///
/// The exporter serializes topic lists inconsistently: either a proper JSON
/// array or a Python-style string like `"['rust', 'wasm']"`. The string form
/// is sanitized (single quotes to double quotes) and re-parsed; anything that
/// still fails degrades to an empty list for that row, never an error.
/// Entries equal to `"unknown"` (any case) are sentinel noise and excluded.
pub fn parse_topics(raw: &serde_json::Value) -> Vec<String> {
    let entries: Vec<String> = match raw {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        serde_json::Value::String(s) => {
            let sanitized = s.replace('\'', "\"");
            match serde_json::from_str::<Vec<String>>(&sanitized) {
                Ok(list) => list,
                Err(err) => {
                    tracing::trace!("unparseable topic list {:?}: {}", s, err);
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("unknown"))
        .collect()
}

/// Truthy coercion for the `Hireable` column: booleans pass through, nonzero
/// numbers and the usual string spellings count as hireable, everything else
/// (including null/missing) does not.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        _ => false,
    })
}
