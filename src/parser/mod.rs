pub mod scrape;
pub mod tabular;

use crate::error::SourceError;
use crate::types::{Record, SourceKind};

pub use scrape::{extract_embedded_table, try_extract_embedded_table, ScrapeExtractor};
pub use tabular::{parse_delimited, try_parse_delimited, TabularParser};

/// Turns a fetched body into pre-normalization records.
///
/// `Err` carries the handled failure kind so the caller can report it; the
/// caller still treats it as "this source produced nothing".
pub trait Parser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Vec<Record>, SourceError>;
}

/// Select the parser for a descriptor kind.
pub fn for_kind(kind: SourceKind) -> Box<dyn Parser> {
    match kind {
        SourceKind::Tabular => Box::new(TabularParser),
        SourceKind::ScrapedTable => Box::new(ScrapeExtractor),
    }
}
