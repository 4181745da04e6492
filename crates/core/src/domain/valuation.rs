use crate::domain::sector::Sector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Required return assumed when the form leaves it blank.
pub const DEFAULT_REQUIRED_RETURN: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("required_return must be greater than -1 (got {0})")]
    RequiredReturnOutOfRange(f64),
}

/// Raw manual-entry form. Every field may be missing until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationInputs {
    pub company_name: Option<String>,
    pub stock_price: Option<f64>,
    pub eps: Option<f64>,
    pub book_value: Option<f64>,
    /// Decimal, e.g. `0.08`. Defaults to the sector's typical growth.
    pub growth_rate: Option<f64>,
    /// Decimal, e.g. `0.10`.
    pub required_return: Option<f64>,
    pub sector: Option<String>,
    pub fcf: Option<f64>,
}

/// Inputs that passed validation; the only thing the valuation engine accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationRequest {
    pub company_name: String,
    pub stock_price: f64,
    pub eps: f64,
    pub book_value: Option<f64>,
    pub growth_rate: f64,
    pub required_return: f64,
    pub sector: Sector,
    pub fcf: Option<f64>,
}

impl ValuationInputs {
    pub fn validate(self) -> Result<ValuationRequest, ValidationError> {
        let company_name = self
            .company_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::Missing {
                field: "company_name",
            })?;

        let stock_price = required_number("stock_price", self.stock_price)?;
        if stock_price < 0.0 {
            return Err(ValidationError::NotPositive {
                field: "stock_price",
                value: stock_price,
            });
        }
        let eps = required_number("eps", self.eps)?;

        let sector = self
            .sector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Sector::from_name)
            .ok_or(ValidationError::Missing { field: "sector" })?;

        let growth_rate = match self.growth_rate {
            Some(g) => finite_number("growth_rate", g)?,
            None => sector.typical_growth(),
        };

        let required_return = match self.required_return {
            Some(r) => finite_number("required_return", r)?,
            None => DEFAULT_REQUIRED_RETURN,
        };
        if required_return <= -1.0 {
            return Err(ValidationError::RequiredReturnOutOfRange(required_return));
        }

        Ok(ValuationRequest {
            company_name,
            stock_price,
            eps,
            book_value: optional_number("book_value", self.book_value)?,
            growth_rate,
            required_return,
            sector,
            fcf: optional_number("fcf", self.fcf)?,
        })
    }
}

fn finite_number(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

/// Missing and zero are the same thing for a required form field.
fn required_number(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    match value {
        None => Err(ValidationError::Missing { field }),
        Some(v) if v == 0.0 => Err(ValidationError::Missing { field }),
        Some(v) => finite_number(field, v),
    }
}

/// Zero on an optional field means "not supplied".
fn optional_number(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if v == 0.0 => Ok(None),
        Some(v) => finite_number(field, v).map(Some),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrinsicMethod {
    DividendDiscount,
    /// Required return does not exceed growth; price × 1.2 stands in.
    PriceMultipleFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DcfMethod {
    Perpetuity,
    FiveYearProjection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub value: f64,
    pub method: DcfMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationDecision {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub company_name: String,
    pub sector: Sector,
    pub sector_pe: f64,
    pub stock_price: f64,
    pub pe_ratio: f64,
    pub growth_rate: f64,
    pub required_return: f64,
    pub estimated_dividend: f64,
    pub intrinsic_value: f64,
    pub intrinsic_method: IntrinsicMethod,
    /// `None` when no free cash flow was supplied.
    pub dcf: Option<DcfValuation>,
    /// `None` when no book value was supplied.
    pub pb_ratio: Option<f64>,
    pub score: i32,
    pub decision: ValuationDecision,
}
