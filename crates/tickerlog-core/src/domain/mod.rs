//! Canonical domain types: symbols, dates, windows, and market data models.

mod date;
mod models;
mod symbol;
mod window;

pub use date::TradingDate;
pub use models::{DailyBar, Listing, PriceSeries, TickerDescriptor};
pub use symbol::{Exchange, Symbol};
pub use window::LookbackWindow;
