//! Gateway contracts for the external market-data provider.
//!
//! The one load-bearing contract decision lives here: "provider had nothing
//! to say" and "provider could not be reached" are different outcomes with
//! different types. An unknown or delisted ticker produces
//! [`SeriesFetch::NoData`] and the caller proceeds quietly; a transport or
//! resolution failure produces a [`GatewayError`] and surfaces as a warning.

use std::fmt::{Display, Formatter};

use crate::{Listing, LookbackWindow, PriceSeries, Symbol, TickerDescriptor};

/// Gateway-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Provider unreachable or symbol resolution failed (transport layer).
    Unavailable,
    /// Request was malformed before it left the process.
    InvalidRequest,
    /// Provider answered with something the gateway could not interpret.
    Internal,
}

/// Structured gateway error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    message: String,
    retryable: bool,
}

impl GatewayError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> GatewayErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            GatewayErrorKind::Unavailable => "gateway.unavailable",
            GatewayErrorKind::InvalidRequest => "gateway.invalid_request",
            GatewayErrorKind::Internal => "gateway.internal",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for GatewayError {}

/// Two-outcome result of a series fetch.
///
/// `NoData` is not an error: it is how invalid tickers surface to the rest
/// of the system. `Series` always wraps a non-empty series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesFetch {
    NoData,
    Series(PriceSeries),
}

impl SeriesFetch {
    /// Wrap a fetched bar list, collapsing emptiness into `NoData`.
    pub fn from_series(series: PriceSeries) -> Self {
        if series.is_empty() {
            Self::NoData
        } else {
            Self::Series(series)
        }
    }

    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            Self::NoData => None,
            Self::Series(series) => Some(series),
        }
    }
}

/// Provider gateway contract.
///
/// Implementations block the calling thread for the full round trip; there
/// is no cancellation and no retry below this interface.
pub trait MarketDataGateway {
    /// Snapshot of descriptive fields for a bare ticker.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] only when the provider cannot be reached or
    /// the symbol cannot be resolved at the transport level. A reachable
    /// provider with nothing to report yields an all-unknown descriptor.
    fn fetch_descriptor(&self, symbol: &Symbol) -> Result<TickerDescriptor, GatewayError>;

    /// Trailing daily bars for a bare ticker over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] for transport failures. "No data for this
    /// symbol/window" is [`SeriesFetch::NoData`], not an error.
    fn fetch_series(
        &self,
        symbol: &Symbol,
        window: LookbackWindow,
    ) -> Result<SeriesFetch, GatewayError>;
}

/// Exchange index listing contract.
///
/// Kept separate from [`MarketDataGateway`]: the listing comes from a
/// different upstream and any transport failure yields an explicit error,
/// never partial data.
pub trait IndexListingSource {
    fn listings(&self, index: &str) -> Result<Vec<Listing>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DailyBar, TradingDate};

    #[test]
    fn empty_series_collapses_to_no_data() {
        let symbol = Symbol::parse("ZZZZ999").expect("symbol");
        let series = PriceSeries::new(symbol, LookbackWindow::SixMonths, Vec::new());
        assert_eq!(SeriesFetch::from_series(series), SeriesFetch::NoData);
    }

    #[test]
    fn non_empty_series_is_preserved() {
        let symbol = Symbol::parse("TCS").expect("symbol");
        let bar = DailyBar::new(
            TradingDate::parse("2026-02-16").expect("date"),
            100.0,
            101.0,
            99.0,
            100.5,
            Some(10_000),
        )
        .expect("bar");
        let series = PriceSeries::new(symbol, LookbackWindow::SixMonths, vec![bar]);
        let fetch = SeriesFetch::from_series(series.clone());
        assert_eq!(fetch.series(), Some(&series));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            GatewayError::unavailable("down").code(),
            "gateway.unavailable"
        );
        assert!(GatewayError::unavailable("down").retryable());
        assert!(!GatewayError::internal("parse").retryable());
    }
}
