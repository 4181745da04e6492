//! One analysis = one immutable context in, one report out.

use crate::domain::market::{SentimentIndex, StockSnapshot, TechnicalIndicators};
use crate::domain::recommendation::{ActionPlan, RecommendationTier, ScoreResult};
use crate::engine::recommend::{action_plan, tier_for};
use crate::engine::scoring::compute_scores;
use crate::engine::signals::{signals, Signals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a single analysis reads. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    stock: StockSnapshot,
    technical: Option<TechnicalIndicators>,
    sentiment: Option<SentimentIndex>,
    as_of: DateTime<Utc>,
}

impl AnalysisContext {
    pub fn builder(stock: StockSnapshot) -> AnalysisContextBuilder {
        AnalysisContextBuilder {
            stock,
            technical: None,
            sentiment: None,
            as_of: None,
        }
    }

    pub fn stock(&self) -> &StockSnapshot {
        &self.stock
    }

    pub fn technical(&self) -> Option<&TechnicalIndicators> {
        self.technical.as_ref()
    }

    pub fn sentiment(&self) -> Option<&SentimentIndex> {
        self.sentiment.as_ref()
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisContextBuilder {
    stock: StockSnapshot,
    technical: Option<TechnicalIndicators>,
    sentiment: Option<SentimentIndex>,
    as_of: Option<DateTime<Utc>>,
}

impl AnalysisContextBuilder {
    /// Overrides the indicators nested in the snapshot.
    pub fn technical(mut self, technical: Option<TechnicalIndicators>) -> Self {
        self.technical = technical;
        self
    }

    pub fn sentiment(mut self, sentiment: Option<SentimentIndex>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn build(mut self) -> AnalysisContext {
        // Indicators travel inside the stock payload; lift them out so they live in one place.
        let nested = self.stock.technical.take();
        AnalysisContext {
            technical: self.technical.or(nested),
            stock: self.stock,
            sentiment: self.sentiment,
            as_of: self.as_of.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub as_of: DateTime<Utc>,
    pub symbol: String,
    pub display_name: String,
    pub scores: ScoreResult,
    pub percentage: f64,
    pub tier: RecommendationTier,
    pub action_plan: ActionPlan,
    pub signals: Signals,
    pub stock: StockSnapshot,
    pub technical: Option<TechnicalIndicators>,
    pub sentiment: Option<SentimentIndex>,
}

pub fn analyze(ctx: &AnalysisContext) -> AnalysisReport {
    let stock = ctx.stock();
    let technical = ctx.technical();
    let sentiment = ctx.sentiment();

    let scores = compute_scores(stock, technical, sentiment);
    let tier = tier_for(scores.total, scores.max_total);

    AnalysisReport {
        as_of: ctx.as_of(),
        symbol: stock.symbol.clone(),
        display_name: stock.display_name().to_string(),
        scores,
        percentage: scores.percentage(),
        tier,
        action_plan: action_plan(&scores, stock, technical),
        signals: signals(stock, technical, sentiment),
        stock: stock.clone(),
        technical: technical.cloned(),
        sentiment: sentiment.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::SentimentTrend;
    use crate::domain::recommendation::{ActionBand, EntryAdvice};
    use chrono::TimeZone;

    fn stock() -> StockSnapshot {
        StockSnapshot {
            symbol: "TST".into(),
            company_name: Some("Test Corp".into()),
            sector: Some("Technology".into()),
            pe_ratio: Some(10.0),
            current_price: Some(105.0),
            fifty_two_week_low: Some(95.0),
            fifty_two_week_high: Some(200.0),
            revenue_growth: Some(0.2),
            earnings_growth: Some(0.12),
            technical: Some(TechnicalIndicators {
                rsi: Some(25.0),
                macd: Some(1.0),
                macd_signal: Some(0.5),
                sma50: Some(100.0),
                sma200: Some(90.0),
                wave_pattern: Some("Wave 2/4 Correction - Near Support".into()),
                entry_level: Some(104.0),
                support_level: Some(100.0),
                resistance_level: Some(130.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn greed() -> SentimentIndex {
        SentimentIndex {
            score: 65.0,
            rating: "Greed".into(),
            vix: Some(14.0),
            previous_vix: Some(14.5),
            trend: SentimentTrend::Increasing,
            source: "VIX (Volatility Index)".into(),
        }
    }

    #[test]
    fn builder_lifts_nested_technicals() {
        let ctx = AnalysisContext::builder(stock()).build();
        assert!(ctx.stock().technical.is_none());
        assert_eq!(ctx.technical().and_then(|t| t.rsi), Some(25.0));
    }

    #[test]
    fn explicit_technicals_win_over_nested() {
        let ctx = AnalysisContext::builder(stock())
            .technical(Some(TechnicalIndicators::default()))
            .build();
        assert_eq!(ctx.technical(), Some(&TechnicalIndicators::default()));
    }

    #[test]
    fn full_analysis_is_a_strong_buy() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        let ctx = AnalysisContext::builder(stock())
            .sentiment(Some(greed()))
            .as_of(as_of)
            .build();
        let report = analyze(&ctx);

        // Fundamentals: P/E +2, 52W position 0.095 +2, growth +1, earnings +1 -> 5.
        assert_eq!(report.scores.fundamentals, 5);
        assert_eq!(report.scores.technical, 5);
        assert_eq!(report.scores.sentiment, 4);
        assert_eq!(report.scores.total, 14);
        assert_eq!(report.tier, RecommendationTier::StrongBuy);
        assert_eq!(report.action_plan.band, ActionBand::Bullish);
        assert_eq!(report.action_plan.entry, EntryAdvice::BuyNow { price: 104.0 });
        assert_eq!(report.display_name, "Test Corp");
        assert_eq!(report.as_of, as_of);
    }

    #[test]
    fn analysis_is_repeatable() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        let ctx = AnalysisContext::builder(stock()).as_of(as_of).build();
        assert_eq!(analyze(&ctx), analyze(&ctx));
    }

    #[test]
    fn bare_snapshot_still_produces_a_report() {
        let ctx = AnalysisContext::builder(StockSnapshot {
            symbol: "EMPTY".into(),
            ..Default::default()
        })
        .build();
        let report = analyze(&ctx);
        assert_eq!(report.scores.fundamentals, 0);
        assert_eq!(report.scores.technical, 2);
        assert_eq!(report.scores.sentiment, 0);
        assert_eq!(report.tier, RecommendationTier::StrongSell);
        assert_eq!(
            report.action_plan.entry,
            EntryAdvice::NotRecommended { reference: None }
        );
    }
}
