use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference P/E used when a sector is unknown.
pub const DEFAULT_SECTOR_PE: f64 = 20.0;

/// Typical growth rate used when a sector is unknown.
pub const DEFAULT_SECTOR_GROWTH: f64 = 0.06;

/// Market sectors as reported by the backend (Yahoo-style names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Sector {
    Technology,
    ConsumerCyclical,
    Healthcare,
    FinancialServices,
    CommunicationServices,
    Industrials,
    Energy,
    Utilities,
    RealEstate,
    BasicMaterials,
    ConsumerDefensive,
    Other,
}

/// Per-sector reference values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorReference {
    pub pe: f64,
    pub typical_growth: f64,
}

impl Sector {
    pub const ALL: [Sector; 12] = [
        Sector::Technology,
        Sector::ConsumerCyclical,
        Sector::Healthcare,
        Sector::FinancialServices,
        Sector::CommunicationServices,
        Sector::Industrials,
        Sector::Energy,
        Sector::Utilities,
        Sector::RealEstate,
        Sector::BasicMaterials,
        Sector::ConsumerDefensive,
        Sector::Other,
    ];

    /// Total lookup: unknown, blank or differently-cased names fall back to `Other`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| *s != Sector::Other && s.name().eq_ignore_ascii_case(name))
            .unwrap_or(Sector::Other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::ConsumerCyclical => "Consumer Cyclical",
            Sector::Healthcare => "Healthcare",
            Sector::FinancialServices => "Financial Services",
            Sector::CommunicationServices => "Communication Services",
            Sector::Industrials => "Industrials",
            Sector::Energy => "Energy",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
            Sector::BasicMaterials => "Basic Materials",
            Sector::ConsumerDefensive => "Consumer Defensive",
            Sector::Other => "Other",
        }
    }

    pub fn reference(&self) -> SectorReference {
        let (pe, typical_growth) = match self {
            Sector::Technology => (30.0, 0.12),
            Sector::ConsumerCyclical => (20.0, 0.08),
            Sector::Healthcare => (25.0, 0.08),
            Sector::FinancialServices => (15.0, 0.06),
            Sector::CommunicationServices => (20.0, 0.08),
            Sector::Industrials => (18.0, 0.06),
            Sector::Energy => (12.0, 0.04),
            Sector::Utilities => (16.0, 0.03),
            Sector::RealEstate => (25.0, 0.05),
            Sector::BasicMaterials => (14.0, 0.05),
            Sector::ConsumerDefensive => (18.0, 0.04),
            Sector::Other => (DEFAULT_SECTOR_PE, DEFAULT_SECTOR_GROWTH),
        };
        SectorReference { pe, typical_growth }
    }

    pub fn pe(&self) -> f64 {
        self.reference().pe
    }

    pub fn typical_growth(&self) -> f64 {
        self.reference().typical_growth
    }
}

impl From<String> for Sector {
    fn from(value: String) -> Self {
        Sector::from_name(&value)
    }
}

impl From<Sector> for String {
    fn from(value: Sector) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
