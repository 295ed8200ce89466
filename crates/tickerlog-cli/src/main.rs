mod chart;
mod cli;
mod commands;
mod error;
mod menu;

use clap::Parser;
use tickerlog_core::{NseIndexClient, YahooGateway};
use tickerlog_store::PriceStore;

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let gateway = YahooGateway::new();
    let listing_source = NseIndexClient::new();
    let store = PriceStore::open_default()?;

    let result = match &cli.command {
        Some(command) => commands::run(command, &cli, &gateway, &listing_source, &store),
        None => menu::run(&cli, &gateway, &listing_source, &store),
    };

    // Release the connection on every exit path that reached open().
    let closed = store.close();
    result?;
    closed?;
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("TICKERLOG_LOG").unwrap_or_else(|_| String::from("warn"));
    let Ok(env_filter) = tracing_subscriber::EnvFilter::try_new(filter) else {
        eprintln!("warning: invalid TICKERLOG_LOG filter, logging disabled");
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
