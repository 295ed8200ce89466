//! Multi-ticker comparison: fetch, log latest closes, chart together.

use tickerlog_core::{LookbackWindow, MarketDataGateway, PriceSeries, SeriesFetch, Symbol};
use tickerlog_store::PriceStore;

use crate::chart::{self, ChartSeries, ChartView};
use crate::cli::CompareArgs;
use crate::error::CliError;

use super::warn_gateway;

/// One successfully fetched constituent of a comparison batch.
pub struct TrackedSeries {
    pub symbol: Symbol,
    pub series: PriceSeries,
}

pub fn run(
    args: &CompareArgs,
    gateway: &dyn MarketDataGateway,
    store: &PriceStore,
    window: LookbackWindow,
) -> Result<(), CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let tracked = collect_tracked(gateway, store, &symbols, window)?;
    if tracked.is_empty() {
        println!("nothing to compare");
        return Ok(());
    }

    chart::render(&comparison_view(&tracked))
}

/// Fetch each symbol's series and log its latest close.
///
/// One bad ticker never aborts the batch: `NoData` and gateway failures are
/// reported and skipped, and nothing is appended for them. A store failure
/// is fatal and propagates.
pub fn collect_tracked(
    gateway: &dyn MarketDataGateway,
    store: &PriceStore,
    symbols: &[Symbol],
    window: LookbackWindow,
) -> Result<Vec<TrackedSeries>, CliError> {
    let mut tracked = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        match gateway.fetch_series(symbol, window) {
            Ok(SeriesFetch::Series(series)) => {
                if let Some(latest) = series.latest_close() {
                    store.append_observation(symbol, latest)?;
                }
                tracked.push(TrackedSeries {
                    symbol: symbol.clone(),
                    series,
                });
            }
            Ok(SeriesFetch::NoData) => {
                eprintln!("warning: no data available for {symbol}");
            }
            Err(error) => warn_gateway(&format!("series for {symbol}"), &error),
        }
    }

    Ok(tracked)
}

fn comparison_view(tracked: &[TrackedSeries]) -> ChartView {
    let series = tracked
        .iter()
        .enumerate()
        .map(|(index, entry)| ChartSeries {
            name: entry.symbol.to_string(),
            points: entry
                .series
                .bars
                .iter()
                .enumerate()
                .map(|(bar_index, bar)| (bar_index as f64, bar.close))
                .collect(),
            color: chart::palette_color(index),
        })
        .collect();

    ChartView {
        title: String::from("Stock Price Comparison"),
        x_title: String::from("Date"),
        y_title: String::from("Close"),
        x_labels: date_labels(tracked),
        series,
    }
}

/// First/middle/last bar dates of the longest series.
fn date_labels(tracked: &[TrackedSeries]) -> Vec<String> {
    let Some(longest) = tracked.iter().max_by_key(|entry| entry.series.len()) else {
        return Vec::new();
    };
    let bars = &longest.series.bars;
    match bars.len() {
        0 => Vec::new(),
        len => vec![
            bars[0].date.format_iso(),
            bars[len / 2].date.format_iso(),
            bars[len - 1].date.format_iso(),
        ],
    }
}
