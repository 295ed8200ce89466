//! Core contracts for tickerlog.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Gateway contracts separating "no data" from "unreachable"
//! - Provider adapters (Yahoo chart/summary, NSE index listing)
//! - Rolling-mean analytics over close series

pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod provider;
pub mod rolling;

pub use domain::{
    DailyBar, Exchange, Listing, LookbackWindow, PriceSeries, Symbol, TickerDescriptor,
    TradingDate,
};
pub use error::{CoreError, ValidationError};
pub use gateway::{
    GatewayError, GatewayErrorKind, IndexListingSource, MarketDataGateway, SeriesFetch,
};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use provider::{NseIndexClient, YahooGateway, DEFAULT_INDEX};
pub use rolling::{rolling_mean, RollingMean};
