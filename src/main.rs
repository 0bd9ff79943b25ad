use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use mempool_poller::setup;
use mempool_watch::{print_updates, render_table, Args, WatchConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = WatchConfig::load(&args)?;
    info!(base_url = %config.base_url, interval_secs = config.interval_secs, "starting");

    let monitor = setup(config.into_settings())
        .await
        .context("failed to start monitor")?;

    if args.once {
        print!("{}", render_table(monitor.poller().current().as_deref()));
        monitor.stop();
        return Ok(());
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    print_updates(monitor.poller().subscribe(), shutdown, io::stdout().lock())
        .await
        .context("failed to write to stdout")?;

    info!("shutting down");
    monitor.stop();
    Ok(())
}
