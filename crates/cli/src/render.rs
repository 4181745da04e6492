//! Plain-text rendering for terminal output.

use stonks_core::analysis::AnalysisReport;
use stonks_core::domain::market::{SentimentIndex, TickerMatch};
use stonks_core::domain::recommendation::EntryAdvice;
use stonks_core::domain::valuation::{DcfMethod, IntrinsicMethod, ValuationDecision, ValuationResult};
use stonks_core::engine::signals::{Momentum, PeStatus, RsiStatus, SentimentMood, Trend};

pub const DISCLAIMER: &str =
    "For informational purposes only. Not financial advice; do your own research.";

/// Market-cap style formatting: `$1.23T`, `$4.56B`, `$7.89M`, else plain dollars.
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(n) = value.filter(|n| n.is_finite() && *n != 0.0) else {
        return "N/A".to_string();
    };
    if n >= 1e12 {
        format!("${:.2}T", n / 1e12)
    } else if n >= 1e9 {
        format!("${:.2}B", n / 1e9)
    } else if n >= 1e6 {
        format!("${:.2}M", n / 1e6)
    } else {
        format!("${n:.2}")
    }
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"))
}

pub fn describe_entry(entry: &EntryAdvice) -> String {
    match entry {
        EntryAdvice::BuyNow { price } => format!("${price:.2} (buy now, near current price)"),
        EntryAdvice::WaitForRally { price } => format!("${price:.2} (wait for rally)"),
        EntryAdvice::GoodEntryZone { price } => format!("${price:.2} (good entry zone)"),
        EntryAdvice::Range { low, high } => format!("${low:.2} - ${high:.2}"),
        EntryAdvice::MonitorLevel { price } => format!("Monitor ${price:.2}"),
        EntryAdvice::WaitForPullback { price } => {
            format!("Wait for better entry around ${price:.2}")
        }
        EntryAdvice::NotRecommended { reference: Some(price) } => {
            format!("Not recommended (wait for ${price:.2})")
        }
        EntryAdvice::NotRecommended { reference: None } => "Not recommended".to_string(),
        EntryAdvice::Unpriced => "N/A (no current price)".to_string(),
    }
}

pub fn report(report: &AnalysisReport) -> String {
    let stock = &report.stock;
    let scores = &report.scores;
    let signals = &report.signals;
    let plan = &report.action_plan;

    let mut lines = vec![
        format!("{} ({})", report.display_name, report.symbol),
        format!(
            "Price: {}   52W: {} - {}   Market cap: {}",
            money(stock.price()),
            money(stock.fifty_two_week_low),
            money(stock.fifty_two_week_high),
            format_large_number(stock.market_cap),
        ),
        String::new(),
        format!(
            "{}  {}/{} ({:.0}%)",
            report.tier, scores.total, scores.max_total, report.percentage
        ),
        format!(
            "  Fundamentals {}/5   Technical {}/5   Sentiment {}/5",
            scores.fundamentals, scores.technical, scores.sentiment
        ),
        String::new(),
    ];

    let pe_status = match signals.pe_status {
        Some(PeStatus::BelowSector) => "below sector",
        Some(PeStatus::AboveSector) => "above sector",
        None => "",
    };
    lines.push(format!(
        "P/E: {} {} (sector avg {:.0})",
        stock.pe().map_or_else(|| "N/A".to_string(), |pe| format!("{pe:.2}")),
        pe_status,
        signals.sector_pe,
    ));
    if let Some(rsi) = signals.rsi {
        let status = match rsi.status {
            RsiStatus::Overbought => "OVERBOUGHT",
            RsiStatus::Oversold => "OVERSOLD",
            RsiStatus::Neutral => "NEUTRAL",
        };
        lines.push(format!("RSI: {:.1} {status}", rsi.value));
    }
    if let Some(macd) = signals.macd {
        let momentum = match macd {
            Momentum::Bullish => "bullish",
            Momentum::Bearish => "bearish",
        };
        lines.push(format!("MACD: {momentum}"));
    }
    if let Some(trend) = signals.trend {
        let trend = match trend {
            Trend::Uptrend => "uptrend",
            Trend::Downtrend => "downtrend",
        };
        lines.push(format!("Trend: {trend}"));
    }
    if let Some(pos) = signals.fifty_two_week_position_pct {
        lines.push(format!("52W position: {pos:.0}%"));
    }
    match (&report.sentiment, signals.sentiment_mood) {
        (Some(s), Some(mood)) => lines.push(format!("Market mood: {} ({:.0}/100)", mood_label(mood), s.score)),
        _ => lines.push("Market mood: unavailable".to_string()),
    }

    lines.push(String::new());
    lines.push(format!("Action: {}", plan.headline));
    lines.push(format!("  Entry:     {}", describe_entry(&plan.entry)));
    lines.push(format!("  Stop loss: {}", money(plan.stop_loss)));
    lines.push(format!("  Target:    {}", money(plan.target)));
    if plan.conditional {
        lines.push("  (stop and target apply only if you enter anyway)".to_string());
    }
    if let Some(wave) = &plan.wave {
        lines.push(format!(
            "  Support: ${:.2}   Resistance: ${:.2}",
            wave.support, wave.resistance
        ));
    }

    lines.push(String::new());
    lines.push(DISCLAIMER.to_string());
    lines.join("\n")
}

fn mood_label(mood: SentimentMood) -> &'static str {
    match mood {
        SentimentMood::ExtremeGreed => "Extreme Greed",
        SentimentMood::Greed => "Greed",
        SentimentMood::Neutral => "Neutral",
        SentimentMood::Fear => "Fear",
        SentimentMood::ExtremeFear => "Extreme Fear",
    }
}

pub fn valuation(result: &ValuationResult) -> String {
    let decision = match result.decision {
        ValuationDecision::Buy => "BUY",
        ValuationDecision::Hold => "HOLD",
        ValuationDecision::Sell => "SELL",
    };
    let intrinsic_method = match result.intrinsic_method {
        IntrinsicMethod::DividendDiscount => "dividend discount",
        IntrinsicMethod::PriceMultipleFallback => "price multiple fallback",
    };

    let mut lines = vec![
        format!("{} ({})", result.company_name, result.sector),
        format!("Price: ${:.2}", result.stock_price),
        format!(
            "P/E: {:.2} (sector avg {:.0})",
            result.pe_ratio, result.sector_pe
        ),
        format!(
            "Growth {:.1}%   Required return {:.1}%",
            result.growth_rate * 100.0,
            result.required_return * 100.0
        ),
        format!("Estimated dividend: ${:.2}", result.estimated_dividend),
        format!(
            "Intrinsic value: ${:.2} ({intrinsic_method})",
            result.intrinsic_value
        ),
    ];
    match &result.dcf {
        Some(dcf) => {
            let method = match dcf.method {
                DcfMethod::Perpetuity => "perpetuity",
                DcfMethod::FiveYearProjection => "5-year projection",
            };
            lines.push(format!("DCF value: ${:.2} ({method})", dcf.value));
        }
        None => lines.push("DCF value: N/A".to_string()),
    }
    lines.push(format!(
        "P/B: {}",
        result
            .pb_ratio
            .map_or_else(|| "N/A".to_string(), |pb| format!("{pb:.2}"))
    ));
    lines.push(String::new());
    lines.push(format!("Decision: {decision} (score {:+})", result.score));
    lines.push(DISCLAIMER.to_string());
    lines.join("\n")
}

pub fn sentiment(index: &SentimentIndex) -> String {
    let vix = index
        .vix
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));
    format!(
        "Fear & Greed: {:.0}/100 {} (VIX {vix}, trend {}, source {})",
        index.score,
        index.rating,
        index.trend.as_str(),
        if index.source.is_empty() { "unknown" } else { &index.source },
    )
}

pub fn matches(query: &str, found: &[TickerMatch]) -> String {
    if found.is_empty() {
        return format!("No matches for '{query}'");
    }
    found
        .iter()
        .map(|m| {
            format!(
                "{:<8} {}  [{}]",
                m.symbol,
                m.name.as_deref().unwrap_or(""),
                m.exchange.as_deref().unwrap_or("-"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonks_core::analysis::{analyze, AnalysisContext};
    use stonks_core::domain::market::StockSnapshot;
    use stonks_core::domain::valuation::ValuationInputs;
    use stonks_core::engine::valuation::valuate;

    #[test]
    fn large_numbers_get_suffixes() {
        assert_eq!(format_large_number(Some(2.5e12)), "$2.50T");
        assert_eq!(format_large_number(Some(3.21e9)), "$3.21B");
        assert_eq!(format_large_number(Some(45_000_000.0)), "$45.00M");
        assert_eq!(format_large_number(Some(999.5)), "$999.50");
        assert_eq!(format_large_number(Some(0.0)), "N/A");
        assert_eq!(format_large_number(None), "N/A");
    }

    #[test]
    fn entry_descriptions() {
        assert_eq!(
            describe_entry(&EntryAdvice::Range { low: 98.0, high: 102.0 }),
            "$98.00 - $102.00"
        );
        assert_eq!(
            describe_entry(&EntryAdvice::NotRecommended { reference: Some(95.0) }),
            "Not recommended (wait for $95.00)"
        );
        assert_eq!(
            describe_entry(&EntryAdvice::MonitorLevel { price: 42.0 }),
            "Monitor $42.00"
        );
    }

    #[test]
    fn report_without_sentiment_says_so() {
        let stock = StockSnapshot {
            symbol: "ACME".into(),
            company_name: Some("Acme Corp".into()),
            current_price: Some(100.0),
            market_cap: Some(1.5e9),
            ..Default::default()
        };
        let out = report(&analyze(&AnalysisContext::builder(stock).build()));

        assert!(out.starts_with("Acme Corp (ACME)"));
        assert!(out.contains("Market cap: $1.50B"));
        assert!(out.contains("STRONG SELL  2/15 (13%)"));
        assert!(out.contains("Market mood: unavailable"));
        assert!(out.contains("Avoid or consider selling"));
        assert!(out.ends_with(DISCLAIMER));
    }

    #[test]
    fn valuation_lists_missing_dcf_as_na() {
        let result = valuate(ValuationInputs {
            company_name: Some("Acme".into()),
            stock_price: Some(50.0),
            eps: Some(5.0),
            growth_rate: Some(0.08),
            required_return: Some(0.10),
            sector: Some("Industrials".into()),
            ..Default::default()
        })
        .unwrap();
        let out = valuation(&result);

        assert!(out.contains("DCF value: N/A"));
        assert!(out.contains("P/B: N/A"));
        assert!(out.contains("(dividend discount)"));
        assert!(out.contains("Decision: BUY"));
    }

    #[test]
    fn empty_search_is_reported() {
        assert_eq!(matches("zzz", &[]), "No matches for 'zzz'");
    }
}
