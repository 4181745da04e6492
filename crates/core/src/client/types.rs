//! Wire envelopes returned by the backend. Every route wraps its payload in
//! `{ success, data | quotes, error, message }`.

use crate::domain::market::{SentimentIndex, StockSnapshot, TickerMatch};
use serde::{Deserialize, Serialize};

/// Error code the backend uses for unknown symbols.
pub const INVALID_TICKER: &str = "invalid_ticker";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<StockSnapshot>,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<SentimentIndex>,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "results")]
    pub quotes: Vec<RawQuote>,
}

/// Search hit as sent upstream; name and exchange come under several keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuote {
    pub symbol: Option<String>,
    pub shortname: Option<String>,
    pub longname: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    #[serde(rename = "exchDisp")]
    pub exch_disp: Option<String>,
    #[serde(rename = "quoteType")]
    pub quote_type: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RawQuote {
    pub fn into_match(self) -> Option<TickerMatch> {
        let symbol = non_blank(self.symbol)?;
        Some(TickerMatch {
            symbol,
            name: non_blank(self.shortname)
                .or_else(|| non_blank(self.longname))
                .or_else(|| non_blank(self.name)),
            exchange: non_blank(self.exchange).or_else(|| non_blank(self.exch_disp)),
            quote_type: non_blank(self.quote_type),
        })
    }
}

impl SearchEnvelope {
    /// An unsuccessful search is just "no matches".
    pub fn into_matches(self) -> Vec<TickerMatch> {
        if !self.success {
            return Vec::new();
        }
        self.quotes
            .into_iter()
            .filter_map(RawQuote::into_match)
            .collect()
    }
}
