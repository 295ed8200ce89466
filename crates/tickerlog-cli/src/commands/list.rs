use tickerlog_core::IndexListingSource;

use crate::cli::ListArgs;
use crate::error::CliError;

use super::warn_gateway;

pub fn run(args: &ListArgs, listing_source: &dyn IndexListingSource) -> Result<(), CliError> {
    match listing_source.listings(&args.index) {
        Ok(listings) => {
            println!("{} constituents ({}):", args.index, listings.len());
            for listing in listings {
                println!("{:<48} {}", listing.company_name, listing.qualified_symbol);
            }
        }
        Err(error) => warn_gateway("stock list", &error),
    }

    Ok(())
}
