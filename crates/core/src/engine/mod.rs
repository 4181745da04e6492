//! Pure scoring, recommendation and valuation logic. Nothing here does I/O.

pub mod bands;
pub mod recommend;
pub mod scoring;
pub mod signals;
pub mod valuation;
