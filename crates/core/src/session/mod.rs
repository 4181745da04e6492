//! Per-user analysis session: cached market sentiment, last-request-wins
//! analysis and debounced ticker search.

pub mod debounce;
pub mod sequence;

use crate::analysis::{analyze, AnalysisContext, AnalysisReport};
use crate::client::error::FetchError;
use crate::client::MarketDataClient;
use crate::domain::market::{SentimentIndex, TickerMatch};
use crate::session::debounce::SearchDebouncer;
use crate::session::sequence::{RequestSequencer, Sequenced};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub struct AnalysisSession {
    client: Arc<dyn MarketDataClient>,
    sentiment: RwLock<Option<SentimentIndex>>,
    requests: RequestSequencer,
    search: SearchDebouncer,
}

impl AnalysisSession {
    pub fn new(client: Arc<dyn MarketDataClient>, search_debounce: Duration) -> Self {
        Self {
            client,
            sentiment: RwLock::new(None),
            requests: RequestSequencer::new(),
            search: SearchDebouncer::new(search_debounce),
        }
    }

    /// Creates the session and loads market sentiment once. A sentiment failure is
    /// logged and the session carries on without it.
    pub async fn start(client: Arc<dyn MarketDataClient>, search_debounce: Duration) -> Self {
        let session = Self::new(client, search_debounce);
        if let Err(err) = session.refresh_sentiment().await {
            tracing::warn!(
                provider = session.client.provider_name(),
                error = %err,
                "market sentiment unavailable; scoring without it"
            );
        }
        session
    }

    pub fn client(&self) -> &Arc<dyn MarketDataClient> {
        &self.client
    }

    /// Re-fetches sentiment. On failure the previously cached value is kept.
    pub async fn refresh_sentiment(&self) -> Result<SentimentIndex, FetchError> {
        let fresh = self.client.fetch_sentiment().await?;
        tracing::info!(
            score = fresh.score,
            rating = %fresh.rating,
            trend = fresh.trend.as_str(),
            "market sentiment loaded"
        );
        *self.sentiment.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    pub async fn sentiment(&self) -> Option<SentimentIndex> {
        self.sentiment.read().await.clone()
    }

    pub async fn context_for(&self, ticker: &str) -> Result<AnalysisContext, FetchError> {
        let stock = self.client.fetch_stock(ticker).await?;
        Ok(AnalysisContext::builder(stock)
            .sentiment(self.sentiment().await)
            .build())
    }

    /// Fetch and analyze, independent of any other request.
    pub async fn analyze_ticker(&self, ticker: &str) -> Result<AnalysisReport, FetchError> {
        let ctx = self.context_for(ticker).await?;
        let report = analyze(&ctx);
        tracing::info!(
            symbol = %report.symbol,
            total = report.scores.total,
            tier = %report.tier,
            "analysis complete"
        );
        Ok(report)
    }

    /// Like [`Self::analyze_ticker`], but a result (or error) that arrives after a
    /// newer call has started is dropped.
    pub async fn analyze_latest(
        &self,
        ticker: &str,
    ) -> Result<Sequenced<AnalysisReport>, FetchError> {
        let token = self.requests.begin();
        let result = self.analyze_ticker(ticker).await;
        match self.requests.settle(token, result) {
            Sequenced::Current(result) => result.map(Sequenced::Current),
            Sequenced::Superseded => Ok(Sequenced::Superseded),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Sequenced<Vec<TickerMatch>>, FetchError> {
        self.search.search(self.client.as_ref(), query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{SentimentTrend, StockSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeClient {
        sentiment_fails: bool,
        searches: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MarketDataClient for FakeClient {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot, FetchError> {
            match ticker {
                "SLOW" => tokio::time::sleep(Duration::from_millis(150)).await,
                "MISSING" => {
                    return Err(FetchError::NotFound {
                        ticker: ticker.to_string(),
                    })
                }
                _ => {}
            }
            Ok(StockSnapshot {
                symbol: ticker.to_string(),
                current_price: Some(100.0),
                ..Default::default()
            })
        }

        async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, FetchError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TickerMatch {
                symbol: query.to_uppercase(),
                name: None,
                exchange: None,
                quote_type: None,
            }])
        }

        async fn fetch_sentiment(&self) -> Result<SentimentIndex, FetchError> {
            if self.sentiment_fails {
                return Err(FetchError::Backend("Unable to fetch market sentiment data".into()));
            }
            Ok(SentimentIndex {
                score: 85.0,
                rating: "Extreme Greed".into(),
                vix: Some(11.2),
                previous_vix: Some(11.9),
                trend: SentimentTrend::Increasing,
                source: "fake".into(),
            })
        }
    }

    fn session_with(client: FakeClient) -> (Arc<FakeClient>, AnalysisSession) {
        let client = Arc::new(client);
        let session = AnalysisSession::new(client.clone(), Duration::from_millis(40));
        (client, session)
    }

    #[tokio::test]
    async fn start_loads_sentiment_into_every_analysis() {
        let session =
            AnalysisSession::start(Arc::new(FakeClient::default()), Duration::from_millis(1)).await;
        assert_eq!(session.sentiment().await.map(|s| s.score), Some(85.0));

        let report = session.analyze_ticker("AAPL").await.unwrap();
        assert_eq!(report.scores.sentiment, 5);
    }

    #[tokio::test]
    async fn start_survives_sentiment_failure() {
        let client = FakeClient {
            sentiment_fails: true,
            ..Default::default()
        };
        let session = AnalysisSession::start(Arc::new(client), Duration::from_millis(1)).await;
        assert!(session.sentiment().await.is_none());

        let report = session.analyze_ticker("AAPL").await.unwrap();
        assert_eq!(report.scores.sentiment, 0);
        assert_eq!(report.scores.technical, 2);
    }

    #[tokio::test]
    async fn newer_analysis_wins() {
        let (_, session) = session_with(FakeClient::default());
        let (slow, fast) = tokio::join!(session.analyze_latest("SLOW"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.analyze_latest("FAST").await
        });

        assert!(slow.unwrap().is_superseded());
        let fast = fast.unwrap().into_current().unwrap();
        assert_eq!(fast.symbol, "FAST");
    }

    #[tokio::test]
    async fn not_found_surfaces_for_the_current_request() {
        let (_, session) = session_with(FakeClient::default());
        let err = session.analyze_latest("MISSING").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn stale_success_does_not_mask_newer_failure() {
        let (_, session) = session_with(FakeClient::default());
        let (older, newer) = tokio::join!(session.analyze_latest("SLOW"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.analyze_latest("MISSING").await
        });
        // The newer request failed; the older success must not resurface.
        assert!(older.unwrap().is_superseded());
        assert!(newer.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn debounced_search_only_sends_the_last_query() {
        let (client, session) = session_with(FakeClient::default());
        let (first, second) = tokio::join!(session.search("ap"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.search("appl").await
        });

        assert!(first.unwrap().is_superseded());
        let hits = second.unwrap().into_current().unwrap();
        assert_eq!(hits[0].symbol, "APPL");
        assert_eq!(client.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_keeps_previous_sentiment_on_failure() {
        let (_, session) = session_with(FakeClient::default());
        session.refresh_sentiment().await.unwrap();

        let failing = AnalysisSession::new(
            Arc::new(FakeClient {
                sentiment_fails: true,
                ..Default::default()
            }),
            Duration::from_millis(1),
        );
        *failing.sentiment.write().await = session.sentiment().await;
        assert!(failing.refresh_sentiment().await.is_err());
        assert_eq!(failing.sentiment().await.map(|s| s.score), Some(85.0));
    }
}
