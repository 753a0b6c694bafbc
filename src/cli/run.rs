//! Handler for the `run` command.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::signal;
use tracing::{info, warn};

use crate::adapter::{DryRunExecutor, InMemoryMarketBook};
use crate::app::Coordinator;
use crate::cli::{feed, RunArgs};
use crate::config::Config;
use crate::error::Result;
use crate::port::MarketDataSource;

/// Execute the run command.
///
/// Loads the config, applies the feed with the maintenance loop running
/// alongside, waits for admitted and queued jobs to settle (or for Ctrl-C),
/// then prints the final snapshot as JSON on stdout.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    if let Some(mode) = args.risk_mode {
        config.risk.mode = mode;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();
    info!(config = %args.config.display(), "hedgeward starting");

    let book = Arc::new(InMemoryMarketBook::new());
    let market: Arc<dyn MarketDataSource> = book.clone();
    let executor = DryRunExecutor::new(Arc::clone(&market))
        .with_fee_bps(Decimal::from(args.fee_bps))
        .with_delay(Duration::from_millis(args.exec_delay_ms));

    let coordinator = Coordinator::builder(config)
        .executor(Arc::new(executor))
        .market(market)
        .build()?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.jobs {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    feed::apply_with_maintenance(reader, &coordinator, &book).await?;

    tokio::select! {
        () = coordinator.drain() => {
            info!("All jobs settled");
        }
        _ = signal::ctrl_c() => {
            warn!(
                running = coordinator.scheduler().running_count(),
                pending = coordinator.scheduler().pending_count(),
                "Shutdown signal received before the queue drained"
            );
        }
    }

    coordinator.maintain();
    let snapshot = coordinator.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    info!("hedgeward stopped");
    Ok(())
}
