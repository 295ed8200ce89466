//! CLI argument definitions for tickerlog.
//!
//! Every operation is available as a one-shot subcommand; running with no
//! subcommand starts the interactive numbered menu.

use clap::{Args, Parser, Subcommand};

/// tickerlog - NSE equity tracker with a local price log
///
/// Fetches daily price history and descriptive snapshots for NSE-listed
/// equities, renders comparison and trend charts in the terminal, and logs
/// tracked closing prices to a local DuckDB file.
#[derive(Debug, Parser)]
#[command(
    name = "tickerlog",
    version,
    about = "NSE equity tracker with a local price log"
)]
pub struct Cli {
    /// Trailing window for series fetches (1mo, 3mo, 6mo, 1y).
    #[arg(long, global = true, default_value = "6mo")]
    pub window: String,

    /// Subcommand to run; omit for the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the constituents of an NSE index.
    ///
    /// # Examples
    ///
    ///   tickerlog list
    ///   tickerlog list --index "NIFTY 50"
    List(ListArgs),

    /// Print the latest closing price for a ticker.
    ///
    /// # Examples
    ///
    ///   tickerlog price TCS
    Price(PriceArgs),

    /// Print the descriptive snapshot for a ticker.
    ///
    /// Fields the provider does not supply are shown as "unknown".
    ///
    /// # Examples
    ///
    ///   tickerlog details RELIANCE
    Details(DetailsArgs),

    /// Chart several tickers' close series together and log each latest
    /// close to the local store.
    ///
    /// # Examples
    ///
    ///   tickerlog compare TCS RELIANCE INFY
    Compare(CompareArgs),

    /// Chart one ticker's close series with 50-day and 200-day moving
    /// averages.
    ///
    /// # Examples
    ///
    ///   tickerlog ma TCS --window 1y
    Ma(MaArgs),

    /// Print the locally recorded price observations for a ticker.
    History(HistoryArgs),
}

/// Arguments for the `list` command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// NSE index to list.
    #[arg(long, default_value = "NIFTY 500")]
    pub index: String,
}

/// Arguments for the `price` command.
#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Bare ticker (e.g., TCS, RELIANCE, INFY).
    pub symbol: String,
}

/// Arguments for the `details` command.
#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// Bare ticker.
    pub symbol: String,
}

/// Arguments for the `compare` command.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// One or more bare tickers.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

/// Arguments for the `ma` command.
#[derive(Debug, Args)]
pub struct MaArgs {
    /// Bare ticker.
    pub symbol: String,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Bare ticker.
    pub symbol: String,
}
