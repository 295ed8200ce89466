use tickerlog_core::{LookbackWindow, MarketDataGateway, SeriesFetch, Symbol};

use crate::cli::PriceArgs;
use crate::error::CliError;

use super::warn_gateway;

pub fn run(
    args: &PriceArgs,
    gateway: &dyn MarketDataGateway,
    window: LookbackWindow,
) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    match gateway.fetch_series(&symbol, window) {
        Ok(SeriesFetch::Series(series)) => {
            if let Some(latest) = series.latest_close() {
                println!("{symbol} latest close: {latest:.2}");
            }
        }
        Ok(SeriesFetch::NoData) => println!("no data available for {symbol}"),
        Err(error) => warn_gateway(&format!("price for {symbol}"), &error),
    }

    Ok(())
}
