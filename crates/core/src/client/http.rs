use crate::client::error::FetchError;
use crate::client::types::{SearchEnvelope, SentimentEnvelope, StockEnvelope, INVALID_TICKER};
use crate::client::{normalize_ticker, MarketDataClient};
use crate::config::Settings;
use crate::domain::market::{SentimentIndex, StockSnapshot, TickerMatch};
use anyhow::Context;
use reqwest::{StatusCode, Url};
use std::time::{Duration, Instant};

pub const DEFAULT_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ROUTE_STOCK: &str = "stock";
const ROUTE_SEARCH: &str = "search";
const ROUTE_FEAR_GREED: &str = "fear-greed";

/// Error bodies are echoed into messages; keep them short.
const MAX_BODY_IN_ERROR: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpMarketDataClient {
    http: reqwest::Client,
    base_url: Url,
    prefix: Vec<String>,
}

impl HttpMarketDataClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.require_api_base_url()?,
            &settings.api_prefix,
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    pub fn new(base_url: &str, prefix: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid backend base URL: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "backend base URL must be hierarchical: {base_url}"
        );

        let prefix = prefix
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;

        Ok(Self {
            http,
            base_url,
            prefix,
        })
    }

    /// `<base><prefix>/<route>[/<arg>]`, with `arg` percent-encoded as one segment.
    pub fn endpoint(&self, route: &str, arg: Option<&str>) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::Url(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(self.prefix.iter());
            segments.push(route);
            if let Some(arg) = arg {
                segments.push(arg);
            }
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<(StatusCode, String), FetchError> {
        let t0 = Instant::now();
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        let text = res.text().await?;
        tracing::debug!(
            %url,
            status = status.as_u16(),
            elapsed_ms = t0.elapsed().as_millis(),
            "backend response"
        );
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl MarketDataClient for HttpMarketDataClient {
    fn provider_name(&self) -> &'static str {
        "backend_http_json"
    }

    async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot, FetchError> {
        let ticker = normalize_ticker(ticker)?;
        let url = self.endpoint(ROUTE_STOCK, Some(&ticker))?;
        let (status, body) = self.get_text(url).await?;
        parse_stock_response(&ticker, status, &body)
    }

    async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(ROUTE_SEARCH, Some(query))?;
        let (status, body) = self.get_text(url).await?;
        parse_search_response(status, &body)
    }

    async fn fetch_sentiment(&self) -> Result<SentimentIndex, FetchError> {
        let url = self.endpoint(ROUTE_FEAR_GREED, None)?;
        let (status, body) = self.get_text(url).await?;
        parse_sentiment_response(status, &body)
    }
}

fn status_error(status: StatusCode, body: &str) -> FetchError {
    let body: String = body.chars().take(MAX_BODY_IN_ERROR).collect();
    FetchError::Status {
        status: status.as_u16(),
        body,
    }
}

pub(crate) fn parse_stock_response(
    ticker: &str,
    status: StatusCode,
    body: &str,
) -> Result<StockSnapshot, FetchError> {
    let not_found = || FetchError::NotFound {
        ticker: ticker.to_string(),
    };
    if status == StatusCode::NOT_FOUND {
        return Err(not_found());
    }

    let envelope = match serde_json::from_str::<StockEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => return Err(status_error(status, body)),
        Err(err) => return Err(err.into()),
    };

    if envelope.error.as_deref() == Some(INVALID_TICKER) {
        return Err(not_found());
    }
    if !envelope.success {
        let reason = envelope
            .message
            .or(envelope.error)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(FetchError::Backend(reason));
    }
    if !status.is_success() {
        return Err(status_error(status, body));
    }

    envelope
        .data
        .ok_or_else(|| FetchError::Backend(format!("no data found for {ticker}")))
}

pub(crate) fn parse_search_response(
    status: StatusCode,
    body: &str,
) -> Result<Vec<TickerMatch>, FetchError> {
    match serde_json::from_str::<SearchEnvelope>(body) {
        Ok(envelope) => Ok(envelope.into_matches()),
        Err(_) if status == StatusCode::NOT_FOUND => Ok(Vec::new()),
        Err(_) if !status.is_success() => Err(status_error(status, body)),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn parse_sentiment_response(
    status: StatusCode,
    body: &str,
) -> Result<SentimentIndex, FetchError> {
    let envelope = match serde_json::from_str::<SentimentEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => return Err(status_error(status, body)),
        Err(err) => return Err(err.into()),
    };

    match envelope.data {
        Some(data) if envelope.success => Ok(data),
        _ => Err(FetchError::Backend(
            envelope
                .message
                .or(envelope.error)
                .unwrap_or_else(|| "sentiment unavailable".to_string()),
        )),
    }
}
