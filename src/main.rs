use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use feed_integrator::config::Config;
use feed_integrator::infra::http_client::ReqwestFetcher;
use feed_integrator::types::ErrorDocument;
use feed_integrator::{logging, metrics, server, Aggregator, SourceRegistry};

#[derive(Parser)]
#[command(name = "feed_integrator")]
#[command(about = "Integrates public weather and production feeds into one JSON document")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the integration once and print the document to stdout
    Run {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Serve the integration over HTTP
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    let log_guard = logging::init_logging(&config.logging);

    let fetcher = Arc::new(ReqwestFetcher::new(&config.fetch)?);
    let aggregator = Arc::new(Aggregator::new(
        SourceRegistry::default_sources(),
        fetcher,
        config.pipeline.delay(),
    ));

    match cli.command {
        Commands::Run { pretty } => {
            let (status, body) = match aggregator.run().await {
                Ok((result, _summary)) => (0, to_json(&result, pretty)?),
                Err(e) => {
                    error!("Integration run failed: {}", e);
                    let doc = ErrorDocument::new("integration failed", e.to_string());
                    (1, to_json(&doc, pretty)?)
                }
            };
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}")?;
            stdout.flush()?;
            if status != 0 {
                drop(log_guard);
                std::process::exit(status);
            }
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = config.server.metrics_port {
                metrics::init_metrics(port);
            }
            let addr = config.server.bind_addr()?;
            info!("Starting server on {}", addr);
            server::start_server(aggregator, addr).await?;
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
