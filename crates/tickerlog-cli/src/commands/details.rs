use tickerlog_core::{MarketDataGateway, Symbol};

use crate::cli::DetailsArgs;
use crate::error::CliError;

use super::warn_gateway;

pub fn run(args: &DetailsArgs, gateway: &dyn MarketDataGateway) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    match gateway.fetch_descriptor(&symbol) {
        Ok(descriptor) => {
            println!("{symbol} details:");
            for (label, value) in descriptor.fields() {
                println!("{label}: {}", format_field(value));
            }
            if descriptor.is_all_unknown() {
                println!("(provider reported no fields for this symbol)");
            }
        }
        Err(error) => warn_gateway(&format!("details for {symbol}"), &error),
    }

    Ok(())
}

fn format_field(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value}"),
        None => String::from("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_render_as_unknown() {
        assert_eq!(format_field(None), "unknown");
        assert_eq!(format_field(Some(4012.5)), "4012.5");
    }
}
