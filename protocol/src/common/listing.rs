//! Listing data model
//!
//! Catalog entries and the closed enumerations shared by the catalog and the
//! upload flow. Amounts, usage counts and timestamps are stored structured;
//! display strings are derived from them, never parsed back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Returned when an enumeration id is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// ============================================================================
// Category
// ============================================================================

/// Model category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Nlp,
    ComputerVision,
    Prediction,
    Classification,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Nlp,
        Category::ComputerVision,
        Category::Prediction,
        Category::Classification,
        Category::Other,
    ];

    /// Wire id (e.g. "computer-vision")
    pub fn id(&self) -> &'static str {
        match self {
            Category::Nlp => "nlp",
            Category::ComputerVision => "computer-vision",
            Category::Prediction => "prediction",
            Category::Classification => "classification",
            Category::Other => "other",
        }
    }

    /// Long label used in the upload flow
    pub fn label(&self) -> &'static str {
        match self {
            Category::Nlp => "Natural Language Processing",
            Category::ComputerVision => "Computer Vision",
            Category::Prediction => "Prediction Models",
            Category::Classification => "Classification",
            Category::Other => "Other",
        }
    }

    /// Short label used by the marketplace filter bar
    pub fn short_label(&self) -> &'static str {
        match self {
            Category::Nlp => "NLP",
            Category::ComputerVision => "Computer Vision",
            Category::Prediction => "Prediction",
            Category::Classification => "Classification",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or(UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// License
// ============================================================================

/// License under which a listing is sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum License {
    SingleUse,
    Subscription,
    Commercial,
    OpenSource,
}

impl License {
    pub const ALL: [License; 4] = [
        License::SingleUse,
        License::Subscription,
        License::Commercial,
        License::OpenSource,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            License::SingleUse => "single-use",
            License::Subscription => "subscription",
            License::Commercial => "commercial",
            License::OpenSource => "open-source",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            License::SingleUse => "Single Use",
            License::Subscription => "Subscription",
            License::Commercial => "Commercial License",
            License::OpenSource => "Open Source",
        }
    }

    /// Short description of the access terms
    pub fn terms(&self) -> &'static str {
        match self {
            License::SingleUse => "One-time payment",
            License::Subscription => "Monthly/Yearly",
            License::Commercial => "Enterprise pricing",
            License::OpenSource => "Free to use",
        }
    }

    /// Map a free-text catalog label onto the enumeration.
    ///
    /// Ids and labels of the enumeration itself are accepted as-is; the legacy
    /// catalog labels fold into the nearest tier.
    pub fn from_catalog_label(label: &str) -> Option<License> {
        if let Ok(license) = label.parse::<License>() {
            return Some(license);
        }

        match label.trim().to_lowercase().as_str() {
            "single use" | "standard" => Some(License::SingleUse),
            "subscription" | "professional" => Some(License::Subscription),
            "commercial" | "commercial license" | "enterprise" | "medical" => {
                Some(License::Commercial)
            }
            "open source" | "research" => Some(License::OpenSource),
            _ => None,
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for License {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        License::ALL
            .into_iter()
            .find(|l| l.id() == wanted)
            .ok_or(UnknownVariant {
                kind: "license",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Price / Performance
// ============================================================================

/// Listing price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

impl Price {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Parse a display price such as "25.00 BDAG".
    ///
    /// Every character except digits and '.' is dropped from the amount; the
    /// currency is the first purely alphabetic token.
    pub fn parse(text: &str) -> Option<Price> {
        let numeric: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let amount = Decimal::from_str(&numeric).ok()?;

        let currency = text
            .split_whitespace()
            .find(|t| t.chars().all(|c| c.is_alphabetic()))
            .unwrap_or_default();

        Some(Self::new(amount, currency))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.currency.is_empty() {
            write!(f, "{:.2}", self.amount)
        } else {
            write!(f, "{:.2} {}", self.amount, self.currency)
        }
    }
}

/// Benchmark figures published with a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    /// Accuracy in percent, 0-100
    pub accuracy: u8,
    /// Mean inference latency in milliseconds
    pub speed_ms: u32,
}

// ============================================================================
// Listing
// ============================================================================

/// A tokenized model offered on the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub price: Price,
    pub license: License,
    /// Average rating in [0, 5]
    pub rating: f32,
    /// Number of calls served
    pub usage: u64,
    pub performance: Performance,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub trending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ids_round_trip_through_from_str() {
        assert_eq!("computer-vision".parse::<Category>(), Ok(Category::ComputerVision));
        assert_eq!(" NLP ".parse::<Category>(), Ok(Category::Nlp));
        assert!("audio".parse::<Category>().is_err());
    }

    #[test]
    fn test_license_from_catalog_label() {
        assert_eq!(License::from_catalog_label("Enterprise"), Some(License::Commercial));
        assert_eq!(License::from_catalog_label("Professional"), Some(License::Subscription));
        assert_eq!(License::from_catalog_label("Research"), Some(License::OpenSource));
        assert_eq!(License::from_catalog_label("Standard"), Some(License::SingleUse));
        assert_eq!(License::from_catalog_label("open-source"), Some(License::OpenSource));
        assert_eq!(License::from_catalog_label("Bespoke"), None);
    }

    #[test]
    fn test_price_parse_and_display() {
        let price = Price::parse("120.00 BDAG").unwrap();
        assert_eq!(price.amount, Decimal::new(12000, 2));
        assert_eq!(price.currency, "BDAG");
        assert_eq!(price.to_string(), "120.00 BDAG");

        assert!(Price::parse("free").is_none());
    }

    #[test]
    fn test_price_display_pads_to_two_places() {
        let price = Price::new(Decimal::new(25, 0), "BDAG");
        assert_eq!(price.to_string(), "25.00 BDAG");
    }

    #[test]
    fn test_listing_category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::ComputerVision).unwrap();
        assert_eq!(json, "\"computer-vision\"");
    }
}
