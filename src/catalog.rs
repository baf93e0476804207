//! In-memory catalog of model listings

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use aichainx_protocol::common::{Category, License, ModelListing, Performance, Price};

use crate::error::{MarketError, Result};

/// Read-only collection with unique listing ids
#[derive(Debug, Clone)]
pub struct Catalog {
    listings: Vec<ModelListing>,
}

/// Headline numbers for the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub listings: usize,
    pub creators: usize,
    pub trending: usize,
    pub total_usage: u64,
}

impl Catalog {
    pub fn new(listings: Vec<ModelListing>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(listings.len());
        for listing in &listings {
            if !seen.insert(listing.id.as_str()) {
                return Err(MarketError::duplicate_listing(&listing.id));
            }
        }
        Ok(Self { listings })
    }

    /// The built-in sample listings, with update times anchored at `now`
    pub fn sample_at(now: DateTime<Utc>) -> Self {
        Self {
            listings: SAMPLE.iter().map(|seed| seed.build(now)).collect(),
        }
    }

    pub fn sample() -> Self {
        Self::sample_at(Utc::now())
    }

    pub fn get(&self, id: &str) -> Result<&ModelListing> {
        self.listings
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| MarketError::listing_not_found(id))
    }

    pub fn all(&self) -> &[ModelListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Listing count per category, in enumeration order
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.listings.iter().filter(|l| l.category == c).count()))
            .collect()
    }

    /// Case-insensitive match on the creator attribution
    pub fn by_creator(&self, creator: &str) -> Vec<&ModelListing> {
        let wanted = creator.trim().to_lowercase();
        self.listings
            .iter()
            .filter(|l| l.creator.to_lowercase() == wanted)
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let creators: BTreeSet<&str> = self.listings.iter().map(|l| l.creator.as_str()).collect();
        CatalogStats {
            listings: self.listings.len(),
            creators: creators.len(),
            trending: self.listings.iter().filter(|l| l.trending).count(),
            total_usage: self.listings.iter().map(|l| l.usage).sum(),
        }
    }
}

// ============================================================================
// Sample data
// ============================================================================

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: Category,
    tags: &'static [&'static str],
    price_cents: i64,
    license: &'static str,
    rating: f32,
    usage: u64,
    accuracy: u8,
    speed_ms: u32,
    creator: &'static str,
    created_day: u32,
    updated_days_ago: i64,
    trending: bool,
}

impl Seed {
    fn build(&self, now: DateTime<Utc>) -> ModelListing {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, self.created_day)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
            .and_utc();

        ModelListing {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            price: Price::new(Decimal::new(self.price_cents, 2), "BDAG"),
            license: License::from_catalog_label(self.license).unwrap_or(License::SingleUse),
            rating: self.rating,
            usage: self.usage,
            performance: Performance {
                accuracy: self.accuracy,
                speed_ms: self.speed_ms,
            },
            creator: self.creator.to_string(),
            created_at,
            updated_at: now - Duration::days(self.updated_days_ago),
            trending: self.trending,
        }
    }
}

const SAMPLE: [Seed; 9] = [
    Seed {
        id: "1a2b3c4d-5e6f-7g8h-9i0j-1k2l3m4n5o6p",
        name: "Advanced Sentiment Analyzer",
        description: "State-of-the-art sentiment analysis model trained on millions of social media posts and reviews. Provides accurate emotion detection with confidence scores.",
        category: Category::Nlp,
        tags: &["sentiment", "nlp", "emotions", "social-media", "reviews"],
        price_cents: 2500,
        license: "Commercial",
        rating: 4.9,
        usage: 12_400,
        accuracy: 94,
        speed_ms: 120,
        creator: "DataScience Labs",
        created_day: 15,
        updated_days_ago: 2,
        trending: true,
    },
    Seed {
        id: "2b3c4d5e-6f7g-8h9i-0j1k-2l3m4n5o6p7q",
        name: "ImageClassify Pro",
        description: "High-performance image classification model capable of identifying 10,000+ object categories with exceptional accuracy.",
        category: Category::ComputerVision,
        tags: &["classification", "computer-vision", "object-detection", "deep-learning"],
        price_cents: 4000,
        license: "Enterprise",
        rating: 4.7,
        usage: 8_900,
        accuracy: 96,
        speed_ms: 85,
        creator: "VisionAI Research",
        created_day: 20,
        updated_days_ago: 7,
        trending: true,
    },
    Seed {
        id: "3c4d5e6f-7g8h-9i0j-1k2l-3m4n5o6p7q8r",
        name: "Stock Market Predictor",
        description: "Advanced financial forecasting model using technical indicators and market sentiment to predict stock price movements.",
        category: Category::Prediction,
        tags: &["finance", "prediction", "stocks", "trading", "market-analysis"],
        price_cents: 6000,
        license: "Professional",
        rating: 4.6,
        usage: 5_200,
        accuracy: 87,
        speed_ms: 200,
        creator: "FinTech Innovations",
        created_day: 10,
        updated_days_ago: 3,
        trending: false,
    },
    Seed {
        id: "4d5e6f7g-8h9i-0j1k-2l3m-4n5o6p7q8r9s",
        name: "Medical Diagnosis Assistant",
        description: "AI-powered diagnostic tool trained on medical imaging data to assist healthcare professionals in early disease detection.",
        category: Category::Classification,
        tags: &["medical", "diagnosis", "healthcare", "imaging", "disease-detection"],
        price_cents: 12000,
        license: "Medical",
        rating: 4.8,
        usage: 3_100,
        accuracy: 92,
        speed_ms: 150,
        creator: "MedAI Solutions",
        created_day: 8,
        updated_days_ago: 5,
        trending: false,
    },
    Seed {
        id: "5e6f7g8h-9i0j-1k2l-3m4n-5o6p7q8r9s0t",
        name: "Language Translator Pro",
        description: "Multi-language translation model supporting 100+ languages with context-aware translations and cultural nuances.",
        category: Category::Nlp,
        tags: &["translation", "multilingual", "nlp", "language", "communication"],
        price_cents: 3500,
        license: "Standard",
        rating: 4.5,
        usage: 15_700,
        accuracy: 89,
        speed_ms: 95,
        creator: "Global Language AI",
        created_day: 25,
        updated_days_ago: 4,
        trending: true,
    },
    Seed {
        id: "6f7g8h9i-0j1k-2l3m-4n5o-6p7q8r9s0t1u",
        name: "Fraud Detection Engine",
        description: "Real-time fraud detection system for financial transactions using advanced anomaly detection algorithms.",
        category: Category::Classification,
        tags: &["fraud", "security", "finance", "anomaly-detection", "real-time"],
        price_cents: 8000,
        license: "Enterprise",
        rating: 4.9,
        usage: 7_300,
        accuracy: 98,
        speed_ms: 45,
        creator: "SecureFinance AI",
        created_day: 12,
        updated_days_ago: 1,
        trending: true,
    },
    Seed {
        id: "7g8h9i0j-1k2l-3m4n-5o6p-7q8r9s0t1u2v",
        name: "Content Recommendation System",
        description: "Personalized content recommendation engine using collaborative filtering and deep learning for enhanced user engagement.",
        category: Category::Prediction,
        tags: &["recommendation", "personalization", "content", "user-engagement", "collaborative-filtering"],
        price_cents: 4500,
        license: "Commercial",
        rating: 4.4,
        usage: 9_800,
        accuracy: 85,
        speed_ms: 110,
        creator: "ContentAI Labs",
        created_day: 18,
        updated_days_ago: 6,
        trending: false,
    },
    Seed {
        id: "8h9i0j1k-2l3m-4n5o-6p7q-8r9s0t1u2v3w",
        name: "Voice Recognition Pro",
        description: "Advanced speech-to-text model with noise cancellation and speaker identification capabilities for various audio environments.",
        category: Category::Nlp,
        tags: &["speech", "voice", "recognition", "audio", "transcription"],
        price_cents: 5500,
        license: "Professional",
        rating: 4.7,
        usage: 6_500,
        accuracy: 93,
        speed_ms: 180,
        creator: "AudioTech AI",
        created_day: 22,
        updated_days_ago: 2,
        trending: false,
    },
    Seed {
        id: "9i0j1k2l-3m4n-5o6p-7q8r-9s0t1u2v3w4x",
        name: "Climate Prediction Model",
        description: "Environmental forecasting system for climate change analysis and weather pattern prediction using satellite data.",
        category: Category::Prediction,
        tags: &["climate", "weather", "environment", "satellite", "forecasting"],
        price_cents: 9000,
        license: "Research",
        rating: 4.6,
        usage: 2_900,
        accuracy: 88,
        speed_ms: 250,
        creator: "ClimateAI Research",
        created_day: 5,
        updated_days_ago: 7,
        trending: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::tests::utils::test_helpers::reference_now;

    #[test]
    fn test_sample_has_nine_unique_listings() {
        let catalog = Catalog::sample_at(reference_now());
        assert_eq!(catalog.len(), 9);
        assert!(Catalog::new(catalog.all().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let catalog = Catalog::sample_at(reference_now());
        let mut listings = catalog.all().to_vec();
        listings.push(listings[0].clone());

        let err = Catalog::new(listings).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateListing);
    }

    #[test]
    fn test_get_unknown_id() {
        let catalog = Catalog::sample_at(reference_now());
        assert_eq!(
            catalog.get("missing").unwrap_err().code(),
            ErrorCode::ListingNotFound
        );
        assert_eq!(
            catalog.get("6f7g8h9i-0j1k-2l3m-4n5o-6p7q8r9s0t1u").unwrap().name,
            "Fraud Detection Engine"
        );
    }

    #[test]
    fn test_sample_licenses_unified() {
        let catalog = Catalog::sample_at(reference_now());
        let license_of = |name: &str| {
            catalog
                .all()
                .iter()
                .find(|l| l.name == name)
                .map(|l| l.license)
                .unwrap()
        };
        assert_eq!(license_of("Medical Diagnosis Assistant"), License::Commercial);
        assert_eq!(license_of("Stock Market Predictor"), License::Subscription);
        assert_eq!(license_of("Language Translator Pro"), License::SingleUse);
        assert_eq!(license_of("Climate Prediction Model"), License::OpenSource);
    }

    #[test]
    fn test_category_counts_from_data() {
        let counts = Catalog::sample_at(reference_now()).category_counts();
        assert_eq!(
            counts,
            vec![
                (Category::Nlp, 3),
                (Category::ComputerVision, 1),
                (Category::Prediction, 3),
                (Category::Classification, 2),
                (Category::Other, 0),
            ]
        );
    }

    #[test]
    fn test_updated_at_anchored_to_now() {
        let now = reference_now();
        let catalog = Catalog::sample_at(now);
        let fraud = catalog.get("6f7g8h9i-0j1k-2l3m-4n5o-6p7q8r9s0t1u").unwrap();
        assert_eq!(now - fraud.updated_at, Duration::days(1));
    }

    #[test]
    fn test_stats_and_by_creator() {
        let catalog = Catalog::sample_at(reference_now());
        let stats = catalog.stats();
        assert_eq!(stats.listings, 9);
        assert_eq!(stats.creators, 9);
        assert_eq!(stats.trending, 4);
        assert_eq!(stats.total_usage, 71_800);

        assert_eq!(catalog.by_creator("datascience labs").len(), 1);
        assert!(catalog.by_creator("nobody").is_empty());
    }
}
