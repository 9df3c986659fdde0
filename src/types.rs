use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row or entity from an upstream feed. Field order follows the source.
/// Values are scalars: text, or `None` for an empty/absent cell.
pub type Record = IndexMap<String, Option<String>>;

/// Final document: source name -> non-empty sequence of normalized records,
/// in registry order.
pub type IntegrationResult = IndexMap<String, Vec<Record>>;

/// How a source's payload is turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Delimited text download (`;` or `,`).
    Tabular,
    /// HTML page carrying an embedded object literal.
    ScrapedTable,
}

/// Static description of one upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub endpoint: String,
    pub kind: SourceKind,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            kind,
        }
    }

    pub fn tabular(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(name, endpoint, SourceKind::Tabular)
    }

    pub fn scraped(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(name, endpoint, SourceKind::ScrapedTable)
    }
}

/// Per-source diagnostic outcome of a run. Not part of the integration map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Loaded { records: usize },
    Empty,
    Failed { kind: String, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
    pub duration_ms: u64,
}

/// Diagnostics for one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub sources: Vec<SourceReport>,
}

impl RunSummary {
    pub fn loaded_sources(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Loaded { .. }))
            .map(|r| r.source.as_str())
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed { .. }))
            .count()
    }
}

/// Body returned when a run fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDocument {
    pub error: String,
    pub detail: String,
}

impl ErrorDocument {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}
