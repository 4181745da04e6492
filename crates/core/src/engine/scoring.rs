//! Three-pillar scoring: fundamentals, technicals and market sentiment, 0-5 each.

use crate::domain::market::{SentimentIndex, StockSnapshot, TechnicalIndicators};
use crate::domain::recommendation::ScoreResult;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Re-centres the raw technical range of -4..=+4 into something clampable.
const TECHNICAL_OFFSET: i32 = 2;

/// Missing inputs contribute nothing; this never fails.
pub fn compute_scores(
    stock: &StockSnapshot,
    technical: Option<&TechnicalIndicators>,
    sentiment: Option<&SentimentIndex>,
) -> ScoreResult {
    ScoreResult::new(
        fundamental_points(stock),
        technical_points(stock, technical) + TECHNICAL_OFFSET,
        sentiment_points(sentiment),
    )
}

/// Unclamped fundamentals accumulator.
pub fn fundamental_points(stock: &StockSnapshot) -> i32 {
    let mut points = 0;

    let sector_pe = stock.sector().pe();
    if let Some(pe) = stock.pe() {
        if pe < sector_pe * 0.7 {
            points += 2;
        } else if pe < sector_pe {
            points += 1;
        } else if pe > sector_pe * 1.5 {
            points -= 1;
        }
    }

    if let Some(position) = fifty_two_week_position(stock) {
        if position < 0.3 {
            points += 2;
        } else if position < 0.5 {
            points += 1;
        } else if position > 0.9 {
            points -= 1;
        }
    }

    if stock.revenue_growth.is_some_and(|g| g > 0.15) {
        points += 1;
    }
    if stock.earnings_growth.is_some_and(|g| g > 0.10) {
        points += 1;
    }

    points
}

/// Where the price sits in its 52-week range, 0.0 at the low and 1.0 at the high.
/// `None` for a missing or degenerate range.
pub fn fifty_two_week_position(stock: &StockSnapshot) -> Option<f64> {
    let (low, high, price) = stock.fifty_two_week_range()?;
    let range = high - low;
    if range <= 0.0 {
        return None;
    }
    Some((price - low) / range)
}

/// Unclamped, un-offset technical accumulator in -4..=+4.
pub fn technical_points(stock: &StockSnapshot, technical: Option<&TechnicalIndicators>) -> i32 {
    let Some(technical) = technical else {
        return 0;
    };
    let mut points = 0;

    // Exactly 30 or 70 is neutral.
    if let Some(rsi) = technical.rsi() {
        if rsi < RSI_OVERSOLD {
            points += 2;
        } else if rsi > RSI_OVERBOUGHT {
            points -= 2;
        }
    }

    if let Some((macd, signal)) = technical.macd_pair() {
        points += if macd > signal { 1 } else { -1 };
    }

    if let Some((sma50, sma200)) = technical.sma_pair() {
        points += if sma50 > sma200 { 1 } else { -1 };
    }

    if let (Some(sma50), Some(price)) = (technical.sma50(), stock.price()) {
        if price > sma50 {
            points += 1;
        }
    }

    points
}

/// Absolute banding of the fear & greed score. No data is 0, extreme fear is 1.
pub fn sentiment_points(sentiment: Option<&SentimentIndex>) -> i32 {
    let Some(sentiment) = sentiment else {
        return 0;
    };
    let score = sentiment.score;
    if score > 70.0 {
        5
    } else if score > 60.0 {
        4
    } else if score > 40.0 {
        3
    } else if score > 25.0 {
        2
    } else {
        1
    }
}
