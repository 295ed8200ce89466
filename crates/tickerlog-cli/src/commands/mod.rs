pub mod compare;
pub mod details;
pub mod history;
pub mod list;
pub mod ma;
pub mod price;

use tickerlog_core::{GatewayError, IndexListingSource, LookbackWindow, MarketDataGateway};
use tickerlog_store::PriceStore;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub fn run(
    command: &Command,
    cli: &Cli,
    gateway: &dyn MarketDataGateway,
    listing_source: &dyn IndexListingSource,
    store: &PriceStore,
) -> Result<(), CliError> {
    let window: LookbackWindow = cli.window.parse()?;

    match command {
        Command::List(args) => list::run(args, listing_source),
        Command::Price(args) => price::run(args, gateway, window),
        Command::Details(args) => details::run(args, gateway),
        Command::Compare(args) => compare::run(args, gateway, store, window),
        Command::Ma(args) => ma::run(args, gateway, window),
        Command::History(args) => history::run(args, store),
    }
}

/// Report a gateway failure as a warning; the caller keeps running and the
/// user may re-issue the request.
pub(crate) fn warn_gateway(context: &str, error: &GatewayError) {
    tracing::warn!(code = error.code(), "{context} unavailable");
    eprintln!("warning: {context} unavailable: {error}");
}
