//! Query Workbench - a multi-tab terminal workbench for a remote query service.

use std::sync::Arc;
use std::time::Duration;

use query_workbench::cli::Cli;
use query_workbench::config::Config;
use query_workbench::error::Result;
use query_workbench::logging;
use query_workbench::service::{HttpQueryService, MockQueryService, QueryService};
use query_workbench::tui;
use tracing::{error, info};

/// Simulated latency of the mock service in the interactive UI, long enough
/// for the progress bar to be visible.
const MOCK_LATENCY: Duration = Duration::from_millis(800);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    // The TUI owns stdout/stderr, so it logs to a file instead.
    if cli.is_headless() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            if !cli.is_headless() {
                eprintln!("Error: {e}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_url_override(cli.url.as_deref())?;

    let service: Arc<dyn QueryService> = if cli.mock_service {
        let mock = MockQueryService::new();
        if cli.is_headless() {
            Arc::new(mock)
        } else {
            Arc::new(mock.with_delay(MOCK_LATENCY))
        }
    } else {
        Arc::new(HttpQueryService::new(&config.service)?)
    };
    info!("Query service: {}", service.describe());

    if cli.is_headless() {
        return tui::headless::run_headless(cli, service, &config.progress).await;
    }

    tui::run(service, &config.progress).await?;
    Ok(0)
}
