//! Manual-input valuation: dividend discount, DCF, P/B and a BUY/HOLD/SELL call.
//!
//! This is a separate scoring scheme from the three-pillar engine and shares no
//! thresholds with it.

use crate::domain::valuation::{
    DcfMethod, DcfValuation, IntrinsicMethod, ValidationError, ValuationDecision,
    ValuationInputs, ValuationRequest, ValuationResult,
};

/// Share of earnings assumed to be paid out as dividends.
pub const PAYOUT_RATIO: f64 = 0.4;
pub const FALLBACK_PRICE_MULTIPLE: f64 = 1.2;
pub const TERMINAL_GROWTH: f64 = 0.02;
pub const PROJECTION_YEARS: i32 = 5;

pub const BUY_SCORE: i32 = 3;
pub const SELL_SCORE: i32 = -3;

pub fn valuate(inputs: ValuationInputs) -> Result<ValuationResult, ValidationError> {
    let request = inputs.validate()?;
    Ok(valuate_request(&request))
}

pub fn valuate_request(req: &ValuationRequest) -> ValuationResult {
    let sector_pe = req.sector.pe();
    let pe_ratio = req.stock_price / req.eps;
    let estimated_dividend = req.eps * PAYOUT_RATIO;
    let (intrinsic_value, intrinsic_method) = intrinsic_value(
        estimated_dividend,
        req.stock_price,
        req.growth_rate,
        req.required_return,
    );
    let dcf = req
        .fcf
        .map(|fcf| dcf_value(fcf, req.growth_rate, req.required_return));
    let pb_ratio = req.book_value.map(|bv| req.stock_price / bv);

    let score = decision_score(
        req.stock_price,
        pe_ratio,
        sector_pe,
        intrinsic_value,
        dcf.map(|d| d.value),
        pb_ratio,
    );

    tracing::debug!(
        company = %req.company_name,
        pe_ratio,
        intrinsic_value,
        ?intrinsic_method,
        score,
        "valuation computed"
    );

    ValuationResult {
        company_name: req.company_name.clone(),
        sector: req.sector,
        sector_pe,
        stock_price: req.stock_price,
        pe_ratio,
        growth_rate: req.growth_rate,
        required_return: req.required_return,
        estimated_dividend,
        intrinsic_value,
        intrinsic_method,
        dcf,
        pb_ratio,
        score,
        decision: decision_for(score),
    }
}

/// Gordon growth on the estimated dividend. When the required return does not
/// exceed growth the model has no finite answer, so price × 1.2 is used.
pub fn intrinsic_value(
    dividend: f64,
    price: f64,
    growth: f64,
    required_return: f64,
) -> (f64, IntrinsicMethod) {
    if required_return > growth {
        (
            dividend / (required_return - growth),
            IntrinsicMethod::DividendDiscount,
        )
    } else {
        (
            price * FALLBACK_PRICE_MULTIPLE,
            IntrinsicMethod::PriceMultipleFallback,
        )
    }
}

pub fn dcf_value(fcf: f64, growth: f64, required_return: f64) -> DcfValuation {
    if required_return > growth {
        return DcfValuation {
            value: fcf / (required_return - growth),
            method: DcfMethod::Perpetuity,
        };
    }
    DcfValuation {
        value: projected_dcf(fcf, growth, required_return),
        method: DcfMethod::FiveYearProjection,
    }
}

/// Five explicit years plus a terminal value growing at [`TERMINAL_GROWTH`].
/// The terminal term is skipped when the required return cannot discount it.
fn projected_dcf(fcf: f64, growth: f64, required_return: f64) -> f64 {
    let mut total = 0.0;
    let mut last_fcf = fcf;
    for year in 1..=PROJECTION_YEARS {
        last_fcf = fcf * (1.0 + growth).powi(year);
        total += last_fcf / (1.0 + required_return).powi(year);
    }

    if required_return > TERMINAL_GROWTH {
        let terminal = last_fcf * (1.0 + TERMINAL_GROWTH) / (required_return - TERMINAL_GROWTH);
        total += terminal / (1.0 + required_return).powi(PROJECTION_YEARS);
    }
    total
}

pub fn decision_score(
    price: f64,
    pe_ratio: f64,
    sector_pe: f64,
    intrinsic_value: f64,
    dcf_value: Option<f64>,
    pb_ratio: Option<f64>,
) -> i32 {
    let mut score = 0;

    // A loss-making company has no meaningful P/E to compare.
    if pe_ratio > 0.0 {
        let deviation = (pe_ratio - sector_pe) / sector_pe;
        score += if deviation <= -0.3 {
            2
        } else if deviation <= -0.1 {
            1
        } else if deviation >= 0.5 {
            -2
        } else if deviation >= 0.2 {
            -1
        } else {
            0
        };
    }

    let upside = (intrinsic_value - price) / price;
    score += if upside >= 0.3 {
        2
    } else if upside >= 0.1 {
        1
    } else if upside <= -0.3 {
        -2
    } else if upside <= -0.1 {
        -1
    } else {
        0
    };

    if let Some(dcf) = dcf_value {
        let upside = (dcf - price) / price;
        if upside >= 0.2 {
            score += 1;
        } else if upside <= -0.2 {
            score -= 1;
        }
    }

    if let Some(pb) = pb_ratio {
        if pb < 1.5 {
            score += 1;
        } else if pb > 5.0 {
            score -= 1;
        }
    }

    score
}

pub fn decision_for(score: i32) -> ValuationDecision {
    if score >= BUY_SCORE {
        ValuationDecision::Buy
    } else if score <= SELL_SCORE {
        ValuationDecision::Sell
    } else {
        ValuationDecision::Hold
    }
}
