//! Interactive numbered menu, the default mode of the binary.
//!
//! Gateway failures and bad input surface as warnings and the loop keeps
//! going; only persistence failures terminate it.

use std::io::{self, BufRead, Write};

use tickerlog_core::{IndexListingSource, LookbackWindow, MarketDataGateway};
use tickerlog_store::PriceStore;

use crate::cli::{Cli, CompareArgs, DetailsArgs, ListArgs, MaArgs, PriceArgs};
use crate::commands::{compare, details, list, ma, price};
use crate::error::CliError;

pub fn run(
    cli: &Cli,
    gateway: &dyn MarketDataGateway,
    listing_source: &dyn IndexListingSource,
    store: &PriceStore,
) -> Result<(), CliError> {
    let window: LookbackWindow = cli.window.parse()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!();
        println!("Stock Market Tracker (NSE India)");
        println!("1. View NSE stock list");
        println!("2. Get latest stock price");
        println!("3. Fetch stock details");
        println!("4. Track multiple stocks");
        println!("5. Plot moving averages for a stock");
        println!("6. Exit");

        let Some(choice) = prompt(&mut input, "Select an option (1-6): ")? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => recover(list::run(
                &ListArgs {
                    index: String::from(tickerlog_core::DEFAULT_INDEX),
                },
                listing_source,
            ))?,
            "2" => {
                let Some(symbol) = prompt_ticker(&mut input)? else {
                    return Ok(());
                };
                recover(price::run(&PriceArgs { symbol }, gateway, window))?;
            }
            "3" => {
                let Some(symbol) = prompt_ticker(&mut input)? else {
                    return Ok(());
                };
                recover(details::run(&DetailsArgs { symbol }, gateway))?;
            }
            "4" => {
                let Some(raw) = prompt(
                    &mut input,
                    "Enter stock tickers (comma-separated, e.g., TCS, RELIANCE, INFY): ",
                )?
                else {
                    return Ok(());
                };
                let symbols: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_owned)
                    .collect();
                if symbols.is_empty() {
                    println!("no tickers entered");
                    continue;
                }
                recover(compare::run(
                    &CompareArgs { symbols },
                    gateway,
                    store,
                    window,
                ))?;
            }
            "5" => {
                let Some(symbol) = prompt_ticker(&mut input)? else {
                    return Ok(());
                };
                recover(ma::run(&MaArgs { symbol }, gateway, window))?;
            }
            "6" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => println!("Invalid choice! Please enter a number between 1-6."),
        }
    }
}

/// Swallow recoverable user errors so the menu keeps running; everything
/// else (store failures, I/O) propagates and terminates the loop.
fn recover(result: Result<(), CliError>) -> Result<(), CliError> {
    match result {
        Err(CliError::Validation(error)) => {
            eprintln!("warning: {error}");
            Ok(())
        }
        other => other,
    }
}

fn prompt_ticker(input: &mut impl BufRead) -> Result<Option<String>, CliError> {
    prompt(input, "Enter stock ticker (e.g., TCS, RELIANCE, INFY): ")
}

/// Read one trimmed line; `None` means end of input (treated as exit).
fn prompt(input: &mut impl BufRead, message: &str) -> Result<Option<String>, CliError> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}
