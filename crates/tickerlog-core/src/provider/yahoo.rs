use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::gateway::{GatewayError, MarketDataGateway, SeriesFetch};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{
    DailyBar, Exchange, LookbackWindow, PriceSeries, Symbol, TickerDescriptor, TradingDate,
};

const YAHOO_REFERER: &str = "https://finance.yahoo.com/";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Session state for Yahoo's unofficial API.
///
/// Yahoo requires a session cookie (planted by visiting fc.yahoo.com, held
/// in the transport's cookie jar) and a crumb token passed as a query
/// parameter. The crumb is cached until a 401/429 invalidates it.
struct YahooSession {
    crumb: Mutex<Option<String>>,
}

impl YahooSession {
    fn new() -> Self {
        Self {
            crumb: Mutex::new(None),
        }
    }

    fn crumb(&self, http_client: &dyn HttpClient) -> Result<String, GatewayError> {
        if let Some(cached) = self
            .crumb
            .lock()
            .expect("yahoo session mutex poisoned")
            .clone()
        {
            return Ok(cached);
        }

        // Plant session cookies first; the response body is irrelevant.
        let cookie_request = HttpRequest::get("https://fc.yahoo.com")
            .with_header("referer", YAHOO_REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);
        let _ = http_client.execute(cookie_request);

        let crumb_endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in crumb_endpoints {
            let request = HttpRequest::get(endpoint)
                .with_header("referer", YAHOO_REFERER)
                .with_timeout_ms(REQUEST_TIMEOUT_MS);

            match http_client.execute(request) {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();

                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }
                    if body.to_lowercase().contains("too many requests") {
                        return Err(GatewayError::unavailable(
                            "yahoo rate limited while fetching crumb",
                        ));
                    }
                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        let crumb = body.to_string();
                        *self.crumb.lock().expect("yahoo session mutex poisoned") =
                            Some(crumb.clone());
                        return Ok(crumb);
                    }
                }
                _ => continue,
            }
        }

        Err(GatewayError::unavailable(
            "failed to obtain yahoo session crumb",
        ))
    }

    fn invalidate(&self) {
        *self.crumb.lock().expect("yahoo session mutex poisoned") = None;
    }
}

/// Yahoo-backed market data gateway.
///
/// Tickers are qualified with the exchange suffix before every upstream
/// call; the spread between "no data" and "unreachable" is decided here and
/// nowhere else.
pub struct YahooGateway {
    http_client: Arc<dyn HttpClient>,
    exchange: Exchange,
    session: YahooSession,
}

impl YahooGateway {
    pub fn new() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            exchange: Exchange::default(),
            session: YahooSession::new(),
        }
    }

    pub fn with_exchange(mut self, exchange: Exchange) -> Self {
        self.exchange = exchange;
        self
    }

    /// Execute a crumb-carrying request, refreshing the session once on
    /// 401/429.
    fn execute_with_auth_retry(
        &self,
        build_endpoint: &dyn Fn(&str) -> String,
    ) -> Result<HttpResponse, GatewayError> {
        let crumb = self.session.crumb(self.http_client.as_ref())?;
        let response = self.execute_get(&build_endpoint(&crumb))?;

        if response.status == 401 || response.status == 429 {
            warn!(status = response.status, "yahoo auth rejected, refreshing session");
            self.session.invalidate();
            let crumb = self.session.crumb(self.http_client.as_ref())?;
            return self.execute_get(&build_endpoint(&crumb));
        }

        Ok(response)
    }

    fn execute_get(&self, endpoint: &str) -> Result<HttpResponse, GatewayError> {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", YAHOO_REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        self.http_client.execute(request).map_err(|error| {
            GatewayError::unavailable(format!("yahoo transport error: {}", error.message()))
        })
    }
}

impl Default for YahooGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataGateway for YahooGateway {
    fn fetch_descriptor(&self, symbol: &Symbol) -> Result<TickerDescriptor, GatewayError> {
        let qualified = self.exchange.qualify(symbol);
        debug!(symbol = %qualified, "fetching descriptor snapshot");

        let response = self.execute_with_auth_retry(&|crumb: &str| {
            format!(
                "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=price,summaryDetail,defaultKeyStatistics&crumb={}",
                urlencoding::encode(&qualified),
                urlencoding::encode(crumb)
            )
        })?;

        // A resolvable request for a symbol yahoo no longer knows comes back
        // as 404 with an error payload: the all-unknown descriptor, not a
        // failure.
        if response.status == 404 {
            return Ok(TickerDescriptor::unknown(symbol.clone()));
        }
        if !response.is_success() {
            return Err(GatewayError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_descriptor(symbol, &response.body)
    }

    fn fetch_series(
        &self,
        symbol: &Symbol,
        window: LookbackWindow,
    ) -> Result<SeriesFetch, GatewayError> {
        let qualified = self.exchange.qualify(symbol);
        debug!(symbol = %qualified, window = %window, "fetching daily series");

        let response = self.execute_with_auth_retry(&|crumb: &str| {
            format!(
                "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval=1d&crumb={}",
                urlencoding::encode(&qualified),
                window.as_str(),
                urlencoding::encode(crumb)
            )
        })?;

        // Unknown symbols surface as 404 ("No data found"): the designed
        // quiet outcome.
        if response.status == 404 {
            return Ok(SeriesFetch::NoData);
        }
        if !response.is_success() {
            return Err(GatewayError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_series(symbol, window, &response.body)
    }
}

fn parse_series(
    symbol: &Symbol,
    window: LookbackWindow,
    body: &str,
) -> Result<SeriesFetch, GatewayError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = &chart_response.chart.error {
        if error.is_not_found() {
            return Ok(SeriesFetch::NoData);
        }
        return Err(GatewayError::unavailable(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let Some(result) = chart_response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
    else {
        return Ok(SeriesFetch::NoData);
    };

    let Some(timestamps) = result.timestamp else {
        // A known symbol with nothing traded in the window has no timestamp
        // array at all.
        return Ok(SeriesFetch::NoData);
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(SeriesFetch::NoData);
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (index, &ts) in timestamps.iter().enumerate() {
        let date = match TradingDate::from_unix_timestamp(ts) {
            Ok(date) => date,
            Err(_) => continue,
        };

        // Rows with missing OHLC entries (halted sessions) are skipped.
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(index),
            quote.high.get(index),
            quote.low.get(index),
            quote.close.get(index),
        ) {
            let volume = quote
                .volume
                .get(index)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());

            if let Ok(bar) = DailyBar::new(date, *open, *high, *low, *close, volume) {
                bars.push(bar);
            }
        }
    }

    Ok(SeriesFetch::from_series(PriceSeries::new(
        symbol.clone(),
        window,
        bars,
    )))
}

fn parse_descriptor(symbol: &Symbol, body: &str) -> Result<TickerDescriptor, GatewayError> {
    let summary_response: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::internal(format!("failed to parse yahoo summary: {e}")))?;

    if let Some(error) = &summary_response.quote_summary.error {
        if error.is_not_found() {
            return Ok(TickerDescriptor::unknown(symbol.clone()));
        }
        return Err(GatewayError::unavailable(format!(
            "yahoo summary API error: {}",
            error.describe()
        )));
    }

    let Some(result) = summary_response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
    else {
        return Ok(TickerDescriptor::unknown(symbol.clone()));
    };

    let price = result.price;
    let detail = result.summary_detail;
    let stats = result.default_key_statistics;

    Ok(TickerDescriptor {
        symbol: symbol.clone(),
        current_price: price
            .as_ref()
            .and_then(|p| raw(&p.regular_market_price)),
        fifty_two_week_high: detail
            .as_ref()
            .and_then(|d| raw(&d.fifty_two_week_high)),
        fifty_two_week_low: detail.as_ref().and_then(|d| raw(&d.fifty_two_week_low)),
        market_cap: price
            .as_ref()
            .and_then(|p| raw(&p.market_cap))
            .or_else(|| stats.as_ref().and_then(|s| raw(&s.market_cap))),
        pe_ratio: detail
            .as_ref()
            .and_then(|d| raw(&d.trailing_pe))
            .or_else(|| stats.as_ref().and_then(|s| raw(&s.forward_pe))),
        dividend_yield: detail.as_ref().and_then(|d| raw(&d.dividend_yield)),
        previous_close: price
            .as_ref()
            .and_then(|p| raw(&p.regular_market_previous_close))
            .or_else(|| detail.as_ref().and_then(|d| raw(&d.previous_close))),
    })
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(YahooRawValue::to_option)
}

// Yahoo chart API response structures.

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

// Yahoo quoteSummary API response structures.

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(default)]
    price: Option<YahooPriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooKeyStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooPriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<YahooRawValue>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<YahooRawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "fiftyTwoWeekHigh", default)]
    fifty_two_week_high: Option<YahooRawValue>,
    #[serde(rename = "fiftyTwoWeekLow", default)]
    fifty_two_week_low: Option<YahooRawValue>,
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<YahooRawValue>,
    #[serde(rename = "previousClose", default)]
    previous_close: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooKeyStatistics {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(rename = "forwardPE", default)]
    forward_pe: Option<YahooRawValue>,
}

/// Yahoo wraps numeric fields in an object carrying the raw value plus
/// formatted strings; only the raw value matters here.
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl YahooRawValue {
    fn to_option(&self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn is_not_found(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("not found"))
    }

    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::from("unspecified error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpError;
    use std::collections::HashMap;

    /// Scripted transport: canned response per URL fragment.
    struct ScriptedHttpClient {
        responses: HashMap<&'static str, HttpResponse>,
    }

    impl ScriptedHttpClient {
        fn new(entries: Vec<(&'static str, HttpResponse)>) -> Self {
            Self {
                responses: entries.into_iter().collect(),
            }
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.responses
                .iter()
                .find(|(fragment, _)| request.url.contains(*fragment))
                .map(|(_, response)| Ok(response.clone()))
                .unwrap_or_else(|| Err(HttpError::new("unscripted url")))
        }
    }

    fn gateway(entries: Vec<(&'static str, HttpResponse)>) -> YahooGateway {
        let mut entries = entries;
        entries.push(("getcrumb", HttpResponse::ok_json("testcrumb")));
        entries.push(("fc.yahoo.com", HttpResponse::ok_json("")));
        YahooGateway::with_http_client(Arc::new(ScriptedHttpClient::new(entries)))
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1755484200, 1755570600, 1755657000],
                "indicators": {
                    "quote": [{
                        "open": [100.0, 102.5, null],
                        "high": [103.0, 104.0, 105.0],
                        "low": [99.0, 101.0, 101.5],
                        "close": [102.0, 103.5, 104.2],
                        "volume": [120000, 98000, 87000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_series_and_skips_null_rows() {
        let gateway = gateway(vec![(
            "v8/finance/chart/TCS.NS",
            HttpResponse::ok_json(CHART_BODY),
        )]);
        let symbol = Symbol::parse("TCS").expect("symbol");

        let fetch = gateway
            .fetch_series(&symbol, LookbackWindow::SixMonths)
            .expect("fetch must succeed");

        let series = fetch.series().expect("series present");
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest_close(), Some(103.5));
        assert_eq!(series.bars[0].date.format_iso(), "2025-08-18");
    }

    #[test]
    fn unknown_symbol_yields_no_data_not_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let gateway = gateway(vec![(
            "v8/finance/chart/ZZZZ999.NS",
            HttpResponse {
                status: 404,
                body: body.to_string(),
            },
        )]);
        let symbol = Symbol::parse("ZZZZ999").expect("symbol");

        let fetch = gateway
            .fetch_series(&symbol, LookbackWindow::SixMonths)
            .expect("no-data is not an error");
        assert_eq!(fetch, SeriesFetch::NoData);
    }

    #[test]
    fn missing_timestamp_array_yields_no_data() {
        let body = r#"{"chart":{"result":[{"timestamp":null,"indicators":{"quote":[{}]}}],"error":null}}"#;
        let fetch = parse_series(
            &Symbol::parse("TCS").expect("symbol"),
            LookbackWindow::SixMonths,
            body,
        )
        .expect("must parse");
        assert_eq!(fetch, SeriesFetch::NoData);
    }

    #[test]
    fn transport_failure_is_unavailable() {
        let gateway =
            YahooGateway::with_http_client(Arc::new(ScriptedHttpClient::new(Vec::new())));
        let symbol = Symbol::parse("TCS").expect("symbol");

        let error = gateway
            .fetch_series(&symbol, LookbackWindow::SixMonths)
            .expect_err("must fail");
        assert_eq!(error.code(), "gateway.unavailable");
    }

    const SUMMARY_BODY: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "regularMarketPrice": {"raw": 4012.5},
                    "regularMarketPreviousClose": {"raw": 3998.0},
                    "marketCap": {"raw": 1451000000000.0}
                },
                "summaryDetail": {
                    "fiftyTwoWeekHigh": {"raw": 4592.25},
                    "fiftyTwoWeekLow": {"raw": 3311.0},
                    "trailingPE": {"raw": 29.8},
                    "dividendYield": {"raw": 0.0125}
                },
                "defaultKeyStatistics": {}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_descriptor_fields() {
        let gateway = gateway(vec![(
            "quoteSummary/TCS.NS",
            HttpResponse::ok_json(SUMMARY_BODY),
        )]);
        let symbol = Symbol::parse("TCS").expect("symbol");

        let descriptor = gateway.fetch_descriptor(&symbol).expect("must succeed");
        assert_eq!(descriptor.current_price, Some(4012.5));
        assert_eq!(descriptor.previous_close, Some(3998.0));
        assert_eq!(descriptor.fifty_two_week_high, Some(4592.25));
        assert_eq!(descriptor.pe_ratio, Some(29.8));
        assert!(!descriptor.is_all_unknown());
    }

    #[test]
    fn delisted_symbol_yields_all_unknown_descriptor() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for ticker symbol: GONE.NS"}}}"#;
        let gateway = gateway(vec![(
            "quoteSummary/GONE.NS",
            HttpResponse {
                status: 404,
                body: body.to_string(),
            },
        )]);
        let symbol = Symbol::parse("GONE").expect("symbol");

        let descriptor = gateway
            .fetch_descriptor(&symbol)
            .expect("delisted is not an error");
        assert!(descriptor.is_all_unknown());
    }

    #[test]
    fn descriptor_with_sparse_modules_keeps_known_fields() {
        let body = r#"{"quoteSummary":{"result":[{"price":{"regularMarketPrice":{"raw":512.0}}}],"error":null}}"#;
        let descriptor = parse_descriptor(&Symbol::parse("IDEA").expect("symbol"), body)
            .expect("must parse");
        assert_eq!(descriptor.current_price, Some(512.0));
        assert_eq!(descriptor.market_cap, None);
        assert!(!descriptor.is_all_unknown());
    }
}
