//! drugbit command-line entry point.
//!
//! Logging goes to stderr so `--json` output on stdout stays parseable.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use drugbit_client::{CancelToken, DataClient};
use drugbit_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    let client = DataClient::from_app_config(&config)?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    Ok(cli::run(&client, &config, args, &cancel).await)
}
