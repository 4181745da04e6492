pub mod market;
pub mod recommendation;
pub mod sector;
pub mod valuation;
