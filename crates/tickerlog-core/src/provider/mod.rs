//! Provider adapters for the gateway contracts.

pub mod nse;
pub mod yahoo;

pub use nse::{NseIndexClient, DEFAULT_INDEX};
pub use yahoo::YahooGateway;
