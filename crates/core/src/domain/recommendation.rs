use crate::domain::market::WaveLevels;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_COMPONENT_SCORE: u8 = 5;
pub const MAX_TOTAL_SCORE: u8 = 3 * MAX_COMPONENT_SCORE;

/// Three-pillar score. Built only through [`ScoreResult::new`], which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub fundamentals: u8,
    pub technical: u8,
    pub sentiment: u8,
    pub total: u8,
    pub max_total: u8,
}

impl ScoreResult {
    pub fn new(fundamentals: i32, technical: i32, sentiment: i32) -> Self {
        let fundamentals = clamp_component(fundamentals);
        let technical = clamp_component(technical);
        let sentiment = clamp_component(sentiment);
        Self {
            fundamentals,
            technical,
            sentiment,
            total: fundamentals + technical + sentiment,
            max_total: MAX_TOTAL_SCORE,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.max_total == 0 {
            return 0.0;
        }
        f64::from(self.total) / f64::from(self.max_total) * 100.0
    }
}

fn clamp_component(raw: i32) -> u8 {
    // Lossless: the clamped value fits in 0..=5.
    raw.clamp(0, i32::from(MAX_COMPONENT_SCORE)) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationTier {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl RecommendationTier {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationTier::StrongBuy => "STRONG BUY",
            RecommendationTier::Buy => "BUY",
            RecommendationTier::Hold => "HOLD",
            RecommendationTier::Sell => "SELL",
            RecommendationTier::StrongSell => "STRONG SELL",
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse band that drives the action plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBand {
    Bullish,
    Neutral,
    Bearish,
}

impl ActionBand {
    pub fn headline(&self) -> &'static str {
        match self {
            ActionBand::Bullish => "Consider buying on dips",
            ActionBand::Neutral => "Hold current position or wait",
            ActionBand::Bearish => "Avoid or consider selling",
        }
    }
}

/// What to do about entering a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryAdvice {
    /// Wave entry within 2% of the current price.
    BuyNow { price: f64 },
    /// Wave entry sits above the current price.
    WaitForRally { price: f64 },
    /// Wave entry sits below the current price.
    GoodEntryZone { price: f64 },
    /// Fallback entry band around the current price.
    Range { low: f64, high: f64 },
    /// Reference level to watch. Never a buy instruction.
    MonitorLevel { price: f64 },
    /// Wait for a pullback to roughly this price.
    WaitForPullback { price: f64 },
    NotRecommended { reference: Option<f64> },
    /// No current price to derive an entry from.
    Unpriced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub band: ActionBand,
    pub headline: String,
    pub entry: EntryAdvice,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
    /// Stop and target only apply to someone who decides to enter anyway.
    pub conditional: bool,
    pub wave: Option<WaveLevels>,
}
