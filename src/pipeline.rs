use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn, Instrument};

use crate::app::ports::Fetcher;
use crate::error::{IntegrationError, Result, SourceError};
use crate::metrics as run_metrics;
use crate::normalize::normalize_records;
use crate::parser;
use crate::registry::SourceRegistry;
use crate::types::{
    IntegrationResult, Record, RunSummary, SourceDescriptor, SourceOutcome, SourceReport,
};

const PREVIEW_ROWS: usize = 3;

/// Walks the registry in order, one source at a time, and assembles the
/// integration map.
///
/// Each source is fetched, parsed and normalized to completion before the
/// next begins, with a fixed pause in between. Handled failures for a source
/// leave it out of the map and never stop the run.
pub struct Aggregator {
    registry: SourceRegistry,
    fetcher: Arc<dyn Fetcher>,
    delay: Duration,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, fetcher: Arc<dyn Fetcher>, delay: Duration) -> Self {
        Self {
            registry,
            fetcher,
            delay,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn integrate(&self) -> IntegrationResult {
        self.integrate_with_summary().await.0
    }

    /// Run every source and return the map along with per-source diagnostics.
    pub async fn integrate_with_summary(&self) -> (IntegrationResult, RunSummary) {
        let mut summary = RunSummary {
            run_id: uuid::Uuid::new_v4(),
            started_at: chrono::Utc::now(),
            sources: Vec::with_capacity(self.registry.len()),
        };
        let mut result = IntegrationResult::new();
        run_metrics::run_started();
        info!(
            run_id = %summary.run_id,
            "Starting integration of {} sources",
            self.registry.len()
        );

        for (i, source) in self.registry.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let span = info_span!("source", source = %source.name, kind = ?source.kind);
            let started = Instant::now();
            let loaded = self.load_source(source).instrument(span).await;
            let elapsed = started.elapsed();
            run_metrics::source_duration(&source.name, elapsed);

            let outcome = match loaded {
                Ok(records) if !records.is_empty() => {
                    info!(
                        "Loaded {}: {} records, {} fields",
                        source.name,
                        records.len(),
                        records[0].len()
                    );
                    run_metrics::source_loaded(&source.name, records.len());
                    let count = records.len();
                    result.insert(source.name.clone(), records);
                    SourceOutcome::Loaded { records: count }
                }
                Ok(_) => {
                    warn!("Source yielded no records: {}", source.name);
                    SourceOutcome::Empty
                }
                Err(e) => {
                    warn!(kind = e.kind(), "Source failed: {}: {}", source.name, e);
                    run_metrics::source_failed(&source.name, e.kind());
                    SourceOutcome::Failed {
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    }
                }
            };

            summary.sources.push(SourceReport {
                source: source.name.clone(),
                outcome,
                duration_ms: elapsed.as_millis() as u64,
            });
        }

        log_summary(&summary, &result);
        (result, summary)
    }

    /// Run on a separate task so a defect in any stage surfaces as a single
    /// fatal error instead of tearing down the caller. Nothing computed before
    /// the failure is returned.
    pub async fn run(self: Arc<Self>) -> Result<(IntegrationResult, RunSummary)> {
        tokio::spawn(async move { self.integrate_with_summary().await })
            .await
            .map_err(|e| IntegrationError::Internal(format!("integration run aborted: {e}")))
    }

    async fn load_source(
        &self,
        source: &SourceDescriptor,
    ) -> std::result::Result<Vec<Record>, SourceError> {
        info!("Loading source from {}", source.endpoint);
        let body = self.fetcher.fetch(&source.endpoint).await?.into_body()?;
        let raw = parser::for_kind(source.kind).parse(&body)?;
        Ok(normalize_records(raw, &source.name))
    }
}

fn log_summary(summary: &RunSummary, result: &IntegrationResult) {
    info!(
        run_id = %summary.run_id,
        failed = summary.failed_count(),
        "Integration finished. Sources with data: {:?}",
        summary.loaded_sources()
    );
    for (name, records) in result {
        for record in records.iter().take(PREVIEW_ROWS) {
            debug!("[{}] {:?}", name, record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::FetchResponse;
    use crate::types::SourceDescriptor;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapFetcher {
        responses: HashMap<String, FetchResponse>,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    }

    impl MapFetcher {
        fn new(responses: &[(&str, u16, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(url, status, body)| (url.to_string(), FetchResponse::new(*status, *body)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), tokio::time::Instant::now()));
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| SourceError::Network("connection refused".into()))
        }
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new(vec![
            SourceDescriptor::tabular("A", "mem://a"),
            SourceDescriptor::tabular("B", "mem://b"),
            SourceDescriptor::scraped("C", "mem://c"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_by_kind() {
        let fetcher = Arc::new(MapFetcher::new(&[
            ("mem://a", 200, "x;y\n1;2\n"),
            ("mem://b", 200, "x,y\n3,4\n"),
            ("mem://c", 200, r#"var estaciones = {"estaciones":[{"Nombre":"Rocha"}]};"#),
        ]));
        let aggregator = Aggregator::new(registry(), fetcher, Duration::ZERO);
        let result = aggregator.integrate().await;

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(result["B"][0]["y"].as_deref(), Some("4"));
        assert_eq!(result["C"][0]["nombre"].as_deref(), Some("Rocha"));
        assert_eq!(result["C"][0]["origin_source"].as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_reported() {
        let fetcher = Arc::new(MapFetcher::new(&[
            ("mem://a", 500, "oops"),
            ("mem://b", 200, "<html>maintenance</html>"),
            ("mem://c", 200, r#"var estaciones = {"estaciones":[{"id":"1"}]};"#),
        ]));
        let aggregator = Aggregator::new(registry(), fetcher, Duration::ZERO);
        let (result, summary) = aggregator.integrate_with_summary().await;

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(summary.sources.len(), 3);
        assert_eq!(
            summary.sources[0].outcome,
            SourceOutcome::Failed {
                kind: "network".into(),
                message: "upstream responded with HTTP 500".into(),
            }
        );
        assert!(matches!(
            &summary.sources[1].outcome,
            SourceOutcome::Failed { kind, .. } if kind == "format"
        ));
        assert_eq!(summary.sources[2].outcome, SourceOutcome::Loaded { records: 1 });
    }

    #[tokio::test]
    async fn test_zero_row_source_is_omitted() {
        let fetcher = Arc::new(MapFetcher::new(&[
            ("mem://a", 200, "x;y\n"),
            ("mem://b", 200, ""),
            ("mem://c", 200, r#"var estaciones = {"estaciones":[]};"#),
        ]));
        let aggregator = Aggregator::new(registry(), fetcher, Duration::ZERO);
        let (result, summary) = aggregator.integrate_with_summary().await;

        assert!(result.is_empty());
        assert!(summary
            .sources
            .iter()
            .all(|r| r.outcome == SourceOutcome::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_are_sequential_and_paced() {
        let fetcher = Arc::new(MapFetcher::new(&[
            ("mem://a", 200, "x;y\n1;2\n"),
            ("mem://b", 404, ""),
            ("mem://c", 200, "no literal"),
        ]));
        let aggregator = Aggregator::new(registry(), fetcher.clone(), Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        aggregator.integrate().await;

        let calls = fetcher.calls.lock().unwrap().clone();
        let urls: Vec<_> = calls.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls, vec!["mem://a", "mem://b", "mem://c"]);
        let offsets: Vec<_> = calls
            .iter()
            .map(|(_, t)| t.duration_since(start).as_millis())
            .collect();
        assert!(offsets[0] < 5);
        assert!((1000..1005).contains(&offsets[1]));
        assert!((2000..2005).contains(&offsets[2]));
        // No pause after the last source
        assert!(start.elapsed() < Duration::from_millis(2100));
    }

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, SourceError> {
            if url == "mem://b" {
                panic!("unexpected defect");
            }
            Ok(FetchResponse::new(200, "x;y\n1;2\n"))
        }
    }

    #[tokio::test]
    async fn test_defect_aborts_whole_run() {
        let aggregator = Arc::new(Aggregator::new(
            registry(),
            Arc::new(PanickingFetcher),
            Duration::ZERO,
        ));
        let result = aggregator.run().await;
        assert!(matches!(result, Err(IntegrationError::Internal(_))));
    }

    #[tokio::test]
    async fn test_run_returns_result_and_summary() {
        let fetcher = Arc::new(MapFetcher::new(&[("mem://a", 200, "x;y\n1;2\n")]));
        let aggregator = Arc::new(Aggregator::new(registry(), fetcher, Duration::ZERO));
        let (result, summary) = aggregator.run().await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(summary.loaded_sources(), vec!["A"]);
        assert_eq!(summary.failed_count(), 2);
    }
}
