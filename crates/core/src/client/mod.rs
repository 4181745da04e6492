pub mod error;
pub mod http;
pub mod types;

use crate::client::error::FetchError;
use crate::domain::market::{SentimentIndex, StockSnapshot, TickerMatch};

/// Read-only access to the market data backend.
#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot, FetchError>;

    async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, FetchError>;

    async fn fetch_sentiment(&self) -> Result<SentimentIndex, FetchError>;
}

/// Tickers are matched upper-case; blank input never reaches the backend.
pub fn normalize_ticker(raw: &str) -> Result<String, FetchError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(FetchError::EmptyTicker);
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_tickers() {
        assert_eq!(normalize_ticker("  kambi.st ").unwrap(), "KAMBI.ST");
        assert!(matches!(normalize_ticker("   "), Err(FetchError::EmptyTicker)));
    }
}
