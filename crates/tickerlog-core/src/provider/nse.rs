use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::gateway::{GatewayError, IndexListingSource};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{Exchange, Listing};

/// Default index when the caller does not name one.
pub const DEFAULT_INDEX: &str = "NIFTY 500";

const NSE_HOME: &str = "https://www.nseindia.com";
const LISTING_TIMEOUT_MS: u64 = 10_000;

/// NSE index constituent listing client.
///
/// The listing endpoint rejects bare requests: a session cookie from the
/// homepage and browser-like headers are required, so every listing call is
/// preceded by a priming request against the same cookie jar.
pub struct NseIndexClient {
    http_client: Arc<dyn HttpClient>,
    exchange: Exchange,
}

impl NseIndexClient {
    pub fn new() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            exchange: Exchange::Nse,
        }
    }

    fn browser_headers(request: HttpRequest) -> HttpRequest {
        request
            .with_header(
                "user-agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36",
            )
            .with_header("accept-language", "en-US,en;q=0.9")
            .with_header("referer", NSE_HOME)
            .with_header("connection", "keep-alive")
    }
}

impl Default for NseIndexClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexListingSource for NseIndexClient {
    fn listings(&self, index: &str) -> Result<Vec<Listing>, GatewayError> {
        debug!(index, "fetching index constituents");

        // Establish the session; the homepage response body is irrelevant.
        let priming = Self::browser_headers(HttpRequest::get(NSE_HOME))
            .with_timeout_ms(LISTING_TIMEOUT_MS);
        let _ = self.http_client.execute(priming);

        let endpoint = format!(
            "{NSE_HOME}/api/equity-stockIndices?index={}",
            urlencoding::encode(index)
        );
        let request =
            Self::browser_headers(HttpRequest::get(endpoint)).with_timeout_ms(LISTING_TIMEOUT_MS);

        let response = self.http_client.execute(request).map_err(|error| {
            GatewayError::unavailable(format!("nse transport error: {}", error.message()))
        })?;

        if !response.is_success() {
            return Err(GatewayError::unavailable(format!(
                "nse returned status {}",
                response.status
            )));
        }

        let payload: NseIndexResponse = serde_json::from_str(&response.body)
            .map_err(|e| GatewayError::internal(format!("failed to parse nse listing: {e}")))?;

        let listings = payload
            .data
            .into_iter()
            .map(|row| {
                let company_name = row
                    .meta
                    .and_then(|meta| meta.company_name)
                    .unwrap_or_else(|| row.symbol.clone());
                Listing {
                    company_name,
                    qualified_symbol: format!("{}{}", row.symbol, self.exchange.suffix()),
                }
            })
            .collect();

        Ok(listings)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NseIndexResponse {
    #[serde(default)]
    data: Vec<NseIndexRow>,
}

#[derive(Debug, Clone, Deserialize)]
struct NseIndexRow {
    symbol: String,
    #[serde(default)]
    meta: Option<NseIndexRowMeta>,
}

#[derive(Debug, Clone, Deserialize)]
struct NseIndexRowMeta {
    #[serde(rename = "companyName", default)]
    company_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};

    struct ScriptedHttpClient {
        listing_body: Option<&'static str>,
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            if request.url.contains("equity-stockIndices") {
                return match self.listing_body {
                    Some(body) => Ok(HttpResponse::ok_json(body)),
                    None => Err(HttpError::new("connection failed")),
                };
            }
            Ok(HttpResponse::ok_json(""))
        }
    }

    #[test]
    fn maps_rows_to_qualified_listings() {
        let body = r#"{
            "data": [
                {"symbol": "TCS", "meta": {"companyName": "Tata Consultancy Services Limited"}},
                {"symbol": "RELIANCE"}
            ]
        }"#;
        let client = NseIndexClient::with_http_client(Arc::new(ScriptedHttpClient {
            listing_body: Some(body),
        }));

        let listings = client.listings(DEFAULT_INDEX).expect("must succeed");
        assert_eq!(listings.len(), 2);
        assert_eq!(
            listings[0].company_name,
            "Tata Consultancy Services Limited"
        );
        assert_eq!(listings[0].qualified_symbol, "TCS.NS");
        assert_eq!(listings[1].company_name, "RELIANCE");
        assert_eq!(listings[1].qualified_symbol, "RELIANCE.NS");
    }

    #[test]
    fn transport_failure_is_unavailable_not_partial() {
        let client = NseIndexClient::with_http_client(Arc::new(ScriptedHttpClient {
            listing_body: None,
        }));

        let error = client.listings(DEFAULT_INDEX).expect_err("must fail");
        assert_eq!(error.code(), "gateway.unavailable");
    }
}
