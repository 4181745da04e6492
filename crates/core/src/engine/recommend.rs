use crate::domain::market::{StockSnapshot, TechnicalIndicators};
use crate::domain::recommendation::{
    ActionBand, ActionPlan, EntryAdvice, RecommendationTier, ScoreResult,
};
use crate::engine::bands::{band_for, ACTION_BANDS, ACTION_FLOOR, TIER_BANDS, TIER_FLOOR};

/// A wave entry this close to the current price counts as "at market".
const AT_MARKET_TOLERANCE: f64 = 0.02;
const WAVE_STOP_FACTOR: f64 = 0.96;

const BULLISH_ENTRY_LOW: f64 = 0.98;
const BULLISH_ENTRY_HIGH: f64 = 1.02;
const BULLISH_STOP: f64 = 0.92;
const BULLISH_TARGET: f64 = 1.15;

const NEUTRAL_PULLBACK: f64 = 0.95;
const NEUTRAL_STOP: f64 = 0.92;
const NEUTRAL_TARGET: f64 = 1.08;

/// Protective stop for holders when the score says stay out.
const BEARISH_STOP: f64 = 0.97;

pub fn tier_for(total: u8, max_total: u8) -> RecommendationTier {
    band_for(&TIER_BANDS, TIER_FLOOR, total, max_total)
}

pub fn action_band_for(total: u8, max_total: u8) -> ActionBand {
    band_for(&ACTION_BANDS, ACTION_FLOOR, total, max_total)
}

pub fn action_plan(
    scores: &ScoreResult,
    stock: &StockSnapshot,
    technical: Option<&TechnicalIndicators>,
) -> ActionPlan {
    let band = action_band_for(scores.total, scores.max_total);
    let price = stock.price();
    let wave = technical.and_then(TechnicalIndicators::wave_levels);

    let (entry, stop_loss, target, conditional) = match (band, &wave) {
        (ActionBand::Bullish, Some(w)) => (
            classify_wave_entry(w.entry, price),
            Some(w.entry * WAVE_STOP_FACTOR),
            Some(w.resistance),
            false,
        ),
        (ActionBand::Bullish, None) => match price {
            Some(p) => (
                EntryAdvice::Range {
                    low: p * BULLISH_ENTRY_LOW,
                    high: p * BULLISH_ENTRY_HIGH,
                },
                Some(p * BULLISH_STOP),
                Some(p * BULLISH_TARGET),
                false,
            ),
            None => (EntryAdvice::Unpriced, None, None, false),
        },
        // Reference only: even a price sitting on the wave entry is no buy signal here.
        (ActionBand::Neutral, Some(w)) => (
            EntryAdvice::MonitorLevel { price: w.entry },
            Some(w.entry * WAVE_STOP_FACTOR),
            Some(w.resistance),
            true,
        ),
        (ActionBand::Neutral, None) => match price {
            Some(p) => (
                EntryAdvice::WaitForPullback {
                    price: p * NEUTRAL_PULLBACK,
                },
                Some(p * NEUTRAL_STOP),
                Some(p * NEUTRAL_TARGET),
                false,
            ),
            None => (EntryAdvice::Unpriced, None, None, false),
        },
        (ActionBand::Bearish, w) => (
            EntryAdvice::NotRecommended {
                reference: w.as_ref().map(|w| w.entry),
            },
            price.map(|p| p * BEARISH_STOP),
            None,
            false,
        ),
    };

    ActionPlan {
        band,
        headline: band.headline().to_string(),
        entry,
        stop_loss,
        target,
        conditional,
        wave,
    }
}

fn classify_wave_entry(entry: f64, price: Option<f64>) -> EntryAdvice {
    let Some(price) = price else {
        return EntryAdvice::MonitorLevel { price: entry };
    };
    if ((entry - price) / price).abs() <= AT_MARKET_TOLERANCE {
        EntryAdvice::BuyNow { price: entry }
    } else if entry > price {
        EntryAdvice::WaitForRally { price: entry }
    } else {
        EntryAdvice::GoodEntryZone { price: entry }
    }
}
