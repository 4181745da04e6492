//! Human-facing readings of the raw indicators, shown next to the scores.

use crate::domain::market::{SentimentIndex, StockSnapshot, TechnicalIndicators};
use crate::engine::scoring::{fifty_two_week_position, RSI_OVERBOUGHT, RSI_OVERSOLD};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiStatus {
    Overbought,
    Oversold,
    Neutral,
}

/// Same strict bounds as the scoring: 30 and 70 are neutral.
pub fn rsi_status(rsi: f64) -> RsiStatus {
    if rsi > RSI_OVERBOUGHT {
        RsiStatus::Overbought
    } else if rsi < RSI_OVERSOLD {
        RsiStatus::Oversold
    } else {
        RsiStatus::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Uptrend,
    Downtrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeStatus {
    BelowSector,
    AboveSector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentMood {
    ExtremeGreed,
    Greed,
    Neutral,
    Fear,
    ExtremeFear,
}

/// Classifies the backend's rating text ("Extreme Greed", "Fear", ...).
pub fn sentiment_mood(rating: &str) -> SentimentMood {
    let rating = rating.to_ascii_lowercase();
    let extreme = rating.contains("extreme");
    if rating.contains("greed") {
        if extreme {
            SentimentMood::ExtremeGreed
        } else {
            SentimentMood::Greed
        }
    } else if rating.contains("neutral") {
        SentimentMood::Neutral
    } else if extreme {
        SentimentMood::ExtremeFear
    } else {
        SentimentMood::Fear
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub status: RsiStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub rsi: Option<RsiReading>,
    pub macd: Option<Momentum>,
    pub trend: Option<Trend>,
    pub fifty_two_week_position_pct: Option<f64>,
    pub sector_pe: f64,
    pub pe_status: Option<PeStatus>,
    pub sentiment_mood: Option<SentimentMood>,
}

pub fn signals(
    stock: &StockSnapshot,
    technical: Option<&TechnicalIndicators>,
    sentiment: Option<&SentimentIndex>,
) -> Signals {
    let price = stock.price();
    let sector_pe = stock.sector().pe();

    let rsi = technical.and_then(TechnicalIndicators::rsi).map(|value| RsiReading {
        value,
        status: rsi_status(value),
    });

    let macd = technical
        .and_then(TechnicalIndicators::macd_pair)
        .map(|(macd, signal)| {
            if macd > signal {
                Momentum::Bullish
            } else {
                Momentum::Bearish
            }
        });

    let trend = match (technical.and_then(TechnicalIndicators::sma_pair), price) {
        (Some((sma50, sma200)), Some(p)) if p > sma50 && p > sma200 => Some(Trend::Uptrend),
        (Some(_), Some(_)) => Some(Trend::Downtrend),
        _ => None,
    };

    // Equal to the sector average reads as "above", as the dashboard showed it.
    let pe_status = stock.pe().map(|pe| {
        if pe < sector_pe {
            PeStatus::BelowSector
        } else {
            PeStatus::AboveSector
        }
    });

    Signals {
        rsi,
        macd,
        trend,
        fifty_two_week_position_pct: fifty_two_week_position(stock).map(|p| p * 100.0),
        sector_pe,
        pe_status,
        sentiment_mood: sentiment.map(|s| sentiment_mood(&s.rating)),
    }
}
