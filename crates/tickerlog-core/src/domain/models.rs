use serde::{Deserialize, Serialize};

use crate::{LookbackWindow, Symbol, TradingDate, ValidationError};

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl DailyBar {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Chronologically ascending daily bars for one symbol over a bounded window.
///
/// Produced fresh on every fetch; emptiness is handled one level up by
/// [`SeriesFetch`](crate::SeriesFetch), so a `PriceSeries` in circulation
/// always carries at least one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub window: LookbackWindow,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, window: LookbackWindow, bars: Vec<DailyBar>) -> Self {
        Self {
            symbol,
            window,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing price of the most recent bar.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}

/// Point-in-time snapshot of descriptive fields for one symbol.
///
/// Every field is independently optional: `None` means the provider did not
/// supply the value, and it renders as "unknown" rather than a fabricated
/// zero or empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerDescriptor {
    pub symbol: Symbol,
    pub current_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub previous_close: Option<f64>,
}

impl TickerDescriptor {
    pub fn unknown(symbol: Symbol) -> Self {
        Self {
            symbol,
            current_price: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            market_cap: None,
            pe_ratio: None,
            dividend_yield: None,
            previous_close: None,
        }
    }

    /// Labeled fields in display order.
    pub fn fields(&self) -> [(&'static str, Option<f64>); 7] {
        [
            ("Current Price", self.current_price),
            ("52W High", self.fifty_two_week_high),
            ("52W Low", self.fifty_two_week_low),
            ("Market Cap", self.market_cap),
            ("P/E Ratio", self.pe_ratio),
            ("Dividend Yield", self.dividend_yield),
            ("Previous Close", self.previous_close),
        ]
    }

    /// True when the provider supplied none of the seven fields.
    pub fn is_all_unknown(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }
}

/// One index constituent: company name plus exchange-qualified symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub company_name: String,
    pub qualified_symbol: String,
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
