//! Percentage thresholds shared by the tier mapping and the action plan.
//!
//! The two tables intentionally differ: the action plan only distinguishes
//! three bands and puts its bullish cut at 60%, so a BUY scored between 55%
//! and 59% still gets the wait-and-hold plan. Both are checked the same way,
//! highest threshold first, lower bound inclusive.

use crate::domain::recommendation::{ActionBand, RecommendationTier};

pub const TIER_BANDS: [(u32, RecommendationTier); 4] = [
    (70, RecommendationTier::StrongBuy),
    (55, RecommendationTier::Buy),
    (40, RecommendationTier::Hold),
    (25, RecommendationTier::Sell),
];
pub const TIER_FLOOR: RecommendationTier = RecommendationTier::StrongSell;

pub const ACTION_BANDS: [(u32, ActionBand); 2] =
    [(60, ActionBand::Bullish), (40, ActionBand::Neutral)];
pub const ACTION_FLOOR: ActionBand = ActionBand::Bearish;

/// `total / max_total >= threshold_pct / 100`, in integers so 9/15 is exactly 60%.
pub fn reaches(total: u8, max_total: u8, threshold_pct: u32) -> bool {
    max_total > 0 && u32::from(total) * 100 >= threshold_pct * u32::from(max_total)
}

/// First band whose threshold the score reaches, else `floor`.
pub fn band_for<T: Copy>(table: &[(u32, T)], floor: T, total: u8, max_total: u8) -> T {
    table
        .iter()
        .find(|(threshold, _)| reaches(total, max_total, *threshold))
        .map(|(_, band)| *band)
        .unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_descending() {
        assert!(TIER_BANDS.windows(2).all(|w| w[0].0 > w[1].0));
        assert!(ACTION_BANDS.windows(2).all(|w| w[0].0 > w[1].0));
    }

    #[test]
    fn reaches_is_inclusive_and_exact() {
        assert!(reaches(9, 15, 60));
        assert!(!reaches(8, 15, 60));
        assert!(reaches(6, 15, 40));
        assert!(!reaches(5, 15, 40));
        assert!(!reaches(0, 0, 0));
    }
}
