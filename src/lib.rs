//! Integrates heterogeneous public data feeds into one normalized document
//! keyed by source name.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod server;
pub mod types;

// Ports and their infrastructure adapters
pub mod app;
pub mod infra;

pub use error::{IntegrationError, Result, SourceError};
pub use pipeline::Aggregator;
pub use registry::SourceRegistry;
pub use types::{IntegrationResult, Record, SourceDescriptor, SourceKind};
