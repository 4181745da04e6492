use crate::domain::sector::Sector;
use serde::{Deserialize, Serialize};

/// The backend fills unknown fundamentals with `0`, so zero means "not reported".
pub(crate) fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Indicator values arrive as `null` when missing; zero is a real reading there.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub current_price: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub pe_ratio: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub eps: Option<f64>,
    pub book_value: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub technical: Option<TechnicalIndicators>,
}

impl StockSnapshot {
    pub fn sector(&self) -> Sector {
        self.sector
            .as_deref()
            .map(Sector::from_name)
            .unwrap_or(Sector::Other)
    }

    pub fn display_name(&self) -> &str {
        self.company_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.symbol)
    }

    pub fn price(&self) -> Option<f64> {
        reported(self.current_price)
    }

    pub fn pe(&self) -> Option<f64> {
        reported(self.pe_ratio)
    }

    /// Low, high and current price when all three are reported.
    pub fn fifty_two_week_range(&self) -> Option<(f64, f64, f64)> {
        Some((
            reported(self.fifty_two_week_low)?,
            reported(self.fifty_two_week_high)?,
            self.price()?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub avg_volume: Option<f64>,
    pub current_volume: Option<f64>,
    pub wave_pattern: Option<String>,
    pub entry_level: Option<f64>,
    pub support_level: Option<f64>,
    pub resistance_level: Option<f64>,
}

impl TechnicalIndicators {
    pub fn rsi(&self) -> Option<f64> {
        finite(self.rsi)
    }

    pub fn macd_pair(&self) -> Option<(f64, f64)> {
        Some((finite(self.macd)?, finite(self.macd_signal)?))
    }

    pub fn sma50(&self) -> Option<f64> {
        finite(self.sma50)
    }

    pub fn sma_pair(&self) -> Option<(f64, f64)> {
        Some((finite(self.sma50)?, finite(self.sma200)?))
    }

    /// Elliott-wave levels, only when entry, support and resistance are all set.
    pub fn wave_levels(&self) -> Option<WaveLevels> {
        Some(WaveLevels {
            entry: reported(self.entry_level)?,
            support: reported(self.support_level)?,
            resistance: reported(self.resistance_level)?,
            pattern: self
                .wave_pattern
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveLevels {
    pub entry: f64,
    pub support: f64,
    pub resistance: f64,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentTrend {
    Increasing,
    Decreasing,
    Stable,
    #[default]
    Unknown,
}

impl SentimentTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentTrend::Increasing => "increasing",
            SentimentTrend::Decreasing => "decreasing",
            SentimentTrend::Stable => "stable",
            SentimentTrend::Unknown => "unknown",
        }
    }
}

impl From<String> for SentimentTrend {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "increasing" => SentimentTrend::Increasing,
            "decreasing" => SentimentTrend::Decreasing,
            // The VIX proxy reports an unchanged reading as "neutral".
            "stable" | "neutral" => SentimentTrend::Stable,
            _ => SentimentTrend::Unknown,
        }
    }
}

impl From<SentimentTrend> for String {
    fn from(value: SentimentTrend) -> Self {
        value.as_str().to_string()
    }
}

/// Market-wide fear & greed reading; not tied to any ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentIndex {
    pub score: f64,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub vix: Option<f64>,
    #[serde(default)]
    pub previous_vix: Option<f64>,
    #[serde(default)]
    pub trend: SentimentTrend,
    #[serde(default)]
    pub source: String,
}

/// One autocomplete hit from the ticker search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMatch {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub quote_type: Option<String>,
}
