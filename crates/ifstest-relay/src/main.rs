//! ifstest-relay: submit IFSTest results to the AppVeyor build worker API
//!
//! Reads IFSTest output from a file or stdin, parses it into test case records
//! and posts them in batches while the log is still being read.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use ifstest_relay::config::Config;
use ifstest_relay::driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries printed results and passthrough
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    info!("Starting ifstest-relay...");

    let summary = driver::run(&config)
        .await
        .context("Failed to relay IFSTest results")?;

    info!(
        records = summary.parse.records,
        sent = summary.send.records_sent,
        dropped = summary.send.records_dropped,
        "Finished"
    );
    Ok(())
}
