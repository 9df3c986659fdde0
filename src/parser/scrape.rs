//! Extraction of the station table embedded in the INUMET stations page.
//!
//! The page assigns a JavaScript object literal to `var estaciones`; the
//! literal is valid JSON and carries the rows under its `estaciones` field.
//! Any mismatch with that layout degrades to an empty result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::Parser;
use crate::constants::STATIONS_ARRAY_FIELD;
use crate::error::SourceError;
use crate::types::Record;

static EMBEDDED_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)var\s+estaciones\s*=\s*(\{.*?\})\s*;").expect("embedded literal pattern")
});

pub struct ScrapeExtractor;

impl Parser for ScrapeExtractor {
    fn parse(&self, body: &str) -> Result<Vec<Record>, SourceError> {
        try_extract_embedded_table(body)
    }
}

/// Records from the embedded `var estaciones = {...};` literal. Never fails:
/// a missing literal, malformed JSON or unexpected shape logs a warning and
/// yields no records.
pub fn extract_embedded_table(html: &str) -> Vec<Record> {
    match try_extract_embedded_table(html) {
        Ok(records) => records,
        Err(e) => {
            warn!("station scrape yielded nothing: {}", e);
            Vec::new()
        }
    }
}

pub fn try_extract_embedded_table(html: &str) -> Result<Vec<Record>, SourceError> {
    let literal = EMBEDDED_LITERAL
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            let preview: String = html.chars().take(300).collect();
            debug!("HTML preview: {}", preview);
            SourceError::Format("'var estaciones = {...};' not found in page".into())
        })?;

    let decoded: Value = serde_json::from_str(literal.trim())
        .map_err(|e| SourceError::Format(format!("embedded literal is not valid JSON: {e}")))?;

    let rows = decoded
        .get(STATIONS_ARRAY_FIELD)
        .ok_or_else(|| SourceError::Schema(format!("field '{STATIONS_ARRAY_FIELD}' missing")))?
        .as_array()
        .ok_or_else(|| SourceError::Schema(format!("field '{STATIONS_ARRAY_FIELD}' is not an array")))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match row.as_object() {
            Some(obj) => records.push(
                obj.iter()
                    .map(|(k, v)| (k.clone(), scalar_text(v)))
                    .collect::<Record>(),
            ),
            None => warn!("skipping non-object element {} in '{}'", i, STATIONS_ARRAY_FIELD),
        }
    }
    debug!("extracted {} embedded records", records.len());
    Ok(records)
}

/// Flatten a JSON value to the record's scalar representation.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}
