use crate::constants::ORIGIN_FIELD;
use crate::types::Record;

const EMPTY_KEY: &str = "unnamed";

/// Canonical field name: lowercased, trimmed, and every character outside
/// `[a-z0-9_]` replaced with `_`.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let key: String = lowered
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect();
    if key.is_empty() {
        EMPTY_KEY.to_string()
    } else {
        key
    }
}

/// Normalize every field name and stamp the owning source.
///
/// Keys that collide after normalization keep the first key's position and
/// the last value. `origin_source` always ends up equal to `source_name`.
pub fn normalize(record: Record, source_name: &str) -> Record {
    let mut out = Record::with_capacity(record.len() + 1);
    for (key, value) in record {
        out.insert(normalize_key(&key), value);
    }
    out.insert(ORIGIN_FIELD.to_string(), Some(source_name.to_string()));
    out
}

pub fn normalize_records(records: Vec<Record>, source_name: &str) -> Vec<Record> {
    records
        .into_iter()
        .map(|r| normalize(r, source_name))
        .collect()
}
