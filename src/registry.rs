use std::collections::HashSet;

use crate::constants::{
    APPLE_PRODUCTION_SOURCE, APPLE_PRODUCTION_URL, HUMIDITY_SOURCE, HUMIDITY_URL,
    PRECIPITATION_SOURCE, PRECIPITATION_URL, STATIONS_SOURCE, STATIONS_URL, TEMPERATURE_SOURCE,
    TEMPERATURE_URL,
};
use crate::error::{IntegrationError, Result};
use crate::types::SourceDescriptor;

/// Immutable, ordered table of source descriptors.
///
/// Iteration order is declaration order; it drives both request pacing and
/// the key order of the integration document.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Build a registry, rejecting empty or duplicate source names.
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for source in &sources {
            if source.name.trim().is_empty() {
                return Err(IntegrationError::InvalidRegistry(
                    "source name must not be empty".into(),
                ));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(IntegrationError::InvalidRegistry(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
        }
        Ok(Self { sources })
    }

    /// The five production feeds.
    pub fn default_sources() -> Self {
        Self {
            sources: vec![
                SourceDescriptor::tabular(TEMPERATURE_SOURCE, TEMPERATURE_URL),
                SourceDescriptor::tabular(HUMIDITY_SOURCE, HUMIDITY_URL),
                SourceDescriptor::tabular(PRECIPITATION_SOURCE, PRECIPITATION_URL),
                SourceDescriptor::tabular(APPLE_PRODUCTION_SOURCE, APPLE_PRODUCTION_URL),
                SourceDescriptor::scraped(STATIONS_SOURCE, STATIONS_URL),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }

    pub fn get(&self, name: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::default_sources()
    }
}
