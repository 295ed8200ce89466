//! Trend chart: close price with 50-day and 200-day moving averages.

use ratatui::style::Color;
use tickerlog_core::{rolling_mean, LookbackWindow, MarketDataGateway, PriceSeries, SeriesFetch, Symbol};

use crate::chart::{self, ChartSeries, ChartView};
use crate::cli::MaArgs;
use crate::error::CliError;

use super::warn_gateway;

const SHORT_WINDOW: usize = 50;
const LONG_WINDOW: usize = 200;

pub fn run(
    args: &MaArgs,
    gateway: &dyn MarketDataGateway,
    window: LookbackWindow,
) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    match gateway.fetch_series(&symbol, window) {
        Ok(SeriesFetch::Series(series)) => chart::render(&trend_view(&series)),
        Ok(SeriesFetch::NoData) => {
            println!("no data available for {symbol}");
            Ok(())
        }
        Err(error) => {
            warn_gateway(&format!("series for {symbol}"), &error);
            Ok(())
        }
    }
}

fn trend_view(series: &PriceSeries) -> ChartView {
    let closes = series.closes();

    let close_points = closes
        .iter()
        .enumerate()
        .map(|(index, close)| (index as f64, *close))
        .collect();

    let mut chart_series = vec![ChartSeries {
        name: String::from("Closing Price"),
        points: close_points,
        color: Color::Blue,
    }];

    for (window, name, color) in [
        (SHORT_WINDOW, "50-day MA", Color::Yellow),
        (LONG_WINDOW, "200-day MA", Color::Red),
    ] {
        let points = mean_points(&closes, window);
        if !points.is_empty() {
            chart_series.push(ChartSeries {
                name: String::from(name),
                points,
                color,
            });
        }
    }

    let bars = &series.bars;
    let x_labels = match bars.len() {
        0 => Vec::new(),
        len => vec![
            bars[0].date.format_iso(),
            bars[len / 2].date.format_iso(),
            bars[len - 1].date.format_iso(),
        ],
    };

    ChartView {
        title: format!("{} Stock Trend with Moving Averages", series.symbol),
        x_title: String::from("Date"),
        y_title: String::from("Close"),
        x_labels,
        series: chart_series,
    }
}

/// Chart points for one rolling mean; unknown head positions produce no
/// point, so the line starts where the window first fills.
fn mean_points(closes: &[f64], window: usize) -> Vec<(f64, f64)> {
    rolling_mean(closes, window)
        .into_iter()
        .enumerate()
        .filter_map(|(index, mean)| mean.map(|mean| (index as f64, mean)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlog_core::{DailyBar, TradingDate};

    fn series_of_len(len: usize) -> PriceSeries {
        let bars = (0..len)
            .map(|index| {
                let day = index % 28;
                let month = 1 + (index / 28) % 12;
                let year = 2018 + index / 336;
                DailyBar::new(
                    TradingDate::parse(&format!("{year}-{month:02}-{:02}", day + 1))
                        .expect("date"),
                    100.0 + index as f64,
                    101.0 + index as f64,
                    99.0 + index as f64,
                    100.0 + index as f64,
                    None,
                )
                .expect("bar")
            })
            .collect();
        PriceSeries::new(
            Symbol::parse("TCS").expect("symbol"),
            LookbackWindow::OneYear,
            bars,
        )
    }

    #[test]
    fn mean_line_starts_after_window_fills() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + i as f64).collect();
        let points = mean_points(&closes, 50);
        assert_eq!(points.len(), 250 - 49);
        assert_eq!(points[0].0, 49.0);
    }

    #[test]
    fn short_series_omits_the_long_average() {
        let view = trend_view(&series_of_len(120));
        let names: Vec<&str> = view.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Closing Price", "50-day MA"]);
    }

    #[test]
    fn long_series_carries_all_three_lines() {
        let view = trend_view(&series_of_len(250));
        let names: Vec<&str> = view.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Closing Price", "50-day MA", "200-day MA"]);
    }
}
