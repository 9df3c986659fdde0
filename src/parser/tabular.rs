//! Delimited text parsing with delimiter sniffing.
//!
//! Feeds are tried as `;`-delimited first. If the reader fails or the header
//! collapses into a single column, the text is re-parsed as `,`-delimited.
//! No other delimiters are tried. Rows with more fields than the header are
//! skipped under either delimiter.

use std::collections::{HashMap, HashSet};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::Parser;
use crate::error::SourceError;
use crate::types::Record;

const PRIMARY_DELIMITER: u8 = b';';
const FALLBACK_DELIMITER: u8 = b',';

struct Table {
    width: usize,
    records: Vec<Record>,
}

pub struct TabularParser;

impl Parser for TabularParser {
    fn parse(&self, body: &str) -> Result<Vec<Record>, SourceError> {
        try_parse_delimited(body)
    }
}

/// Parse delimited text into records keyed by the header row.
///
/// An HTML error page yields zero records (with a warning) rather than an
/// error. A body that fails under both delimiters is a format error.
pub fn parse_delimited(text: &str) -> Result<Vec<Record>, SourceError> {
    match try_parse_delimited(text) {
        Err(SourceError::Format(msg)) if looks_like_html(text) => {
            warn!("{}", msg);
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Like [`parse_delimited`], but reports an HTML body as a format error.
pub fn try_parse_delimited(text: &str) -> Result<Vec<Record>, SourceError> {
    if looks_like_html(text) {
        let preview: String = text.chars().take(200).collect();
        debug!("HTML body preview: {}", preview);
        return Err(SourceError::Format(
            "provider returned an HTML page instead of delimited data".into(),
        ));
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match parse_with(text, PRIMARY_DELIMITER) {
        Ok(table) if table.width > 1 => {
            debug!("parsed {} rows with ';'", table.records.len());
            return Ok(table.records);
        }
        Ok(_) => debug!("single column detected with ';', retrying with ','"),
        Err(e) => debug!("';' parse failed ({}), retrying with ','", e),
    }

    let table = parse_with(text, FALLBACK_DELIMITER)
        .map_err(|e| SourceError::Format(format!("delimited parse failed: {e}")))?;
    debug!("parsed {} rows with ','", table.records.len());
    Ok(table.records)
}

/// Case-insensitive `<html` anywhere in the body.
pub fn looks_like_html(text: &str) -> bool {
    text.to_ascii_lowercase().contains("<html")
}

fn parse_with(text: &str, delimiter: u8) -> Result<Table, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = rdr.records();
    let headers = match rows.next() {
        Some(header) => header_names(&header?),
        None => {
            return Ok(Table {
                width: 0,
                records: Vec::new(),
            })
        }
    };
    let width = headers.len();

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        if row.len() > width {
            warn!(
                "Skipping line {}: expected at most {} fields, found {}",
                row.position().map(|p| p.line()).unwrap_or(0),
                width,
                row.len()
            );
            continue;
        }
        // Short rows are padded with nulls
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row.get(i).filter(|v| !v.is_empty()).map(str::to_string);
                (name.clone(), value)
            })
            .collect();
        if record.values().all(Option::is_none) {
            continue;
        }
        records.push(record);
    }

    Ok(Table { width, records })
}

/// Header names with blanks filled in and duplicates suffixed `.1`, `.2`, ...
///
/// A suffix is only used if no other column already carries that name.
fn header_names(header: &csv::StringRecord) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = if raw.trim().is_empty() {
                format!("unnamed_{i}")
            } else {
                raw.to_string()
            };
            let mut name = base.clone();
            if used.contains(&name) {
                let count = counts.entry(base.clone()).or_insert(0);
                loop {
                    *count += 1;
                    name = format!("{base}.{count}");
                    if !used.contains(&name) {
                        break;
                    }
                }
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
