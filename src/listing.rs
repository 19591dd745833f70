use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Diesel,
    Petrol,
    Cng,
    Electric,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmission {
    Manual,
    Automatic,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerHistory {
    First,
    Second,
    Third,
    Fourth,
    Unregistered,
}

// Keyword tables are checked in order against lower-cased card text; first hit wins.
pub const FUEL_KEYWORDS: &[(&str, FuelType)] = &[
    ("diesel", FuelType::Diesel),
    ("petrol", FuelType::Petrol),
    ("cng", FuelType::Cng),
    ("electric", FuelType::Electric),
];

pub const TRANSMISSION_KEYWORDS: &[(&str, Transmission)] = &[
    ("manual", Transmission::Manual),
    ("automatic", Transmission::Automatic),
];

pub const OWNER_PHRASES: &[(&str, OwnerHistory)] = &[
    ("first owner", OwnerHistory::First),
    ("second owner", OwnerHistory::Second),
    ("third owner", OwnerHistory::Third),
    ("fourth owner", OwnerHistory::Fourth),
    ("unregistered", OwnerHistory::Unregistered),
];

fn first_keyword<T: Copy>(table: &[(&str, T)], lowered: &str) -> Option<T> {
    table
        .iter()
        .find(|(kw, _)| lowered.contains(kw))
        .map(|(_, v)| *v)
}

impl FuelType {
    /// Classify from already lower-cased text.
    pub fn classify(lowered: &str) -> Self {
        first_keyword(FUEL_KEYWORDS, lowered).unwrap_or(FuelType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::Petrol => "Petrol",
            FuelType::Cng => "CNG",
            FuelType::Electric => "Electric",
            FuelType::Unknown => "Unknown",
        }
    }
}

impl Transmission {
    pub fn classify(lowered: &str) -> Self {
        first_keyword(TRANSMISSION_KEYWORDS, lowered).unwrap_or(Transmission::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
            Transmission::Unknown => "Unknown",
        }
    }
}

impl OwnerHistory {
    pub fn classify(lowered: &str) -> Option<Self> {
        first_keyword(OWNER_PHRASES, lowered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerHistory::First => "First Owner",
            OwnerHistory::Second => "Second Owner",
            OwnerHistory::Third => "Third Owner",
            OwnerHistory::Fourth => "Fourth Owner",
            OwnerHistory::Unregistered => "Unregistered",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OwnerHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplementary fields scraped from a listing's detail page.
/// The default value is the "nothing found" result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub owner: Option<OwnerHistory>,
    pub emi: Option<String>,
}

/// One scraped car advertisement. Identified only by its position in the
/// enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub distance_driven: String,
    pub fuel: FuelType,
    pub transmission: Transmission,
    pub detail_url: String,
    /// Filled by enrichment.
    pub owner: Option<OwnerHistory>,
    /// Filled by enrichment.
    pub emi: Option<String>,
}

impl Listing {
    pub fn apply_detail(&mut self, detail: DetailFields) {
        self.owner = detail.owner;
        self.emi = detail.emi;
    }
}
