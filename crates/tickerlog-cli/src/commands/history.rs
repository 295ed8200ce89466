use tickerlog_core::Symbol;
use tickerlog_store::PriceStore;

use crate::cli::HistoryArgs;
use crate::error::CliError;

pub fn run(args: &HistoryArgs, store: &PriceStore) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    let observations = store.observations(&symbol)?;
    if observations.is_empty() {
        println!("no observations recorded for {symbol}");
        return Ok(());
    }

    println!("{symbol} observations:");
    for observation in observations {
        println!("{}  {:.2}", observation.date, observation.price);
    }

    Ok(())
}
