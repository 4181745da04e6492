use crate::client::error::FetchError;
use crate::client::MarketDataClient;
use crate::domain::market::TickerMatch;
use crate::session::sequence::{RequestSequencer, Sequenced};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Holds each keystroke's lookup back for a fixed delay; only the newest one is sent
/// and only the newest result is delivered.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    requests: RequestSequencer,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            requests: RequestSequencer::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn search<C>(
        &self,
        client: &C,
        query: &str,
    ) -> Result<Sequenced<Vec<TickerMatch>>, FetchError>
    where
        C: MarketDataClient + ?Sized,
    {
        let token = self.requests.begin();
        tokio::time::sleep(self.delay).await;
        if !self.requests.is_current(token) {
            return Ok(Sequenced::Superseded);
        }

        let result = client.search(query).await;
        if !self.requests.is_current(token) {
            return Ok(Sequenced::Superseded);
        }
        Ok(Sequenced::Current(result?))
    }
}
