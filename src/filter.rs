//! Marketplace search, category filter and sort
//!
//! A query selects the listings whose name or description contains the search
//! text (case-insensitive) and whose category matches, then orders them by the
//! chosen key. All sorts are stable, so ties keep catalog order. Without a
//! recognised sort key the filtered input order is returned unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use aichainx_protocol::common::{Category, ModelListing, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Trending first, then by usage descending
    Trending,
    /// Most recently updated first
    Newest,
    Rating,
    PriceLow,
    PriceHigh,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Trending,
        SortKey::Newest,
        SortKey::Rating,
        SortKey::PriceLow,
        SortKey::PriceHigh,
    ];

    /// `None` for unrecognised keys
    pub fn parse(key: &str) -> Option<SortKey> {
        let wanted = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.id() == wanted)
    }

    pub fn id(&self) -> &'static str {
        match self {
            SortKey::Trending => "trending",
            SortKey::Newest => "newest",
            SortKey::Rating => "rating",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Trending => "Trending",
            SortKey::Newest => "Newest",
            SortKey::Rating => "Highest Rated",
            SortKey::PriceLow => "Price: Low to High",
            SortKey::PriceHigh => "Price: High to Low",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => write!(f, "{}", c),
        }
    }
}

/// Listing-view state: search text, category and sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: Option<SortKey>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: CategoryFilter::All,
            sort: Some(SortKey::Trending),
        }
    }
}

impl ListingQuery {
    pub fn new(search: impl Into<String>, category: CategoryFilter, sort: Option<SortKey>) -> Self {
        Self {
            search: search.into(),
            category,
            sort,
        }
    }

    pub fn matches(&self, listing: &ModelListing) -> bool {
        let needle = self.search.to_lowercase();
        let text_hit = needle.is_empty()
            || listing.name.to_lowercase().contains(&needle)
            || listing.description.to_lowercase().contains(&needle);
        text_hit && self.category.matches(listing.category)
    }

    /// Filter then sort; `now` anchors the recency ordering
    pub fn apply<'a>(&self, listings: &'a [ModelListing], now: DateTime<Utc>) -> Vec<&'a ModelListing> {
        let mut results: Vec<&ModelListing> = listings.iter().filter(|l| self.matches(l)).collect();

        match self.sort {
            Some(SortKey::Trending) => results.sort_by(|a, b| {
                b.trending
                    .cmp(&a.trending)
                    .then_with(|| b.usage.cmp(&a.usage))
            }),
            Some(SortKey::Newest) => results.sort_by_key(|l| now - l.updated_at),
            Some(SortKey::Rating) => results.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
            Some(SortKey::PriceLow) => results.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            Some(SortKey::PriceHigh) => {
                results.sort_by(|a, b| a.price.amount.cmp(&b.price.amount));
                results.reverse();
            }
            None => {}
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::tests::utils::test_helpers::reference_now;

    fn names<'a>(results: &[&'a ModelListing]) -> Vec<&'a str> {
        results.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("Sentiment", CategoryFilter::All, Some(SortKey::Trending));

        let results = query.apply(catalog.all(), reference_now());

        // The predictor only mentions "market sentiment" in its description.
        assert_eq!(
            names(&results),
            vec!["Advanced Sentiment Analyzer", "Stock Market Predictor"]
        );
    }

    #[test]
    fn test_every_result_contains_search_text() {
        let catalog = Catalog::sample_at(reference_now());
        for needle in ["pro", "FINANCIAL", "model", "x", ""] {
            let query = ListingQuery::new(needle, CategoryFilter::All, None);
            let results = query.apply(catalog.all(), reference_now());
            let lower = needle.to_lowercase();

            for listing in catalog.all() {
                let hit = listing.name.to_lowercase().contains(&lower)
                    || listing.description.to_lowercase().contains(&lower);
                assert_eq!(results.iter().any(|r| r.id == listing.id), hit, "{needle}");
            }
        }
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("", "classification".parse().unwrap(), None);
        let results = query.apply(catalog.all(), reference_now());

        assert_eq!(
            names(&results),
            vec!["Medical Diagnosis Assistant", "Fraud Detection Engine"]
        );
    }

    #[test]
    fn test_trending_order() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("", CategoryFilter::All, Some(SortKey::Trending));
        let results = query.apply(catalog.all(), reference_now());

        let split = results.iter().position(|l| !l.trending).unwrap();
        assert!(results[split..].iter().all(|l| !l.trending));
        assert_eq!(
            names(&results[..split]),
            vec![
                "Language Translator Pro",
                "Advanced Sentiment Analyzer",
                "ImageClassify Pro",
                "Fraud Detection Engine",
            ]
        );
        assert!(results[split..].windows(2).all(|w| w[0].usage >= w[1].usage));
    }

    #[test]
    fn test_newest_uses_updated_at() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("", CategoryFilter::All, Some(SortKey::Newest));
        let results = query.apply(catalog.all(), reference_now());

        assert_eq!(results[0].name, "Fraud Detection Engine");
        // Equal distances keep catalog order.
        assert_eq!(results[1].name, "Advanced Sentiment Analyzer");
        assert_eq!(results[2].name, "Voice Recognition Pro");
        assert_eq!(results[8].name, "Climate Prediction Model");
    }

    #[test]
    fn test_rating_descending() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("", CategoryFilter::All, Some(SortKey::Rating));
        let results = query.apply(catalog.all(), reference_now());

        assert!(results.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert_eq!(results[0].name, "Advanced Sentiment Analyzer");
        assert_eq!(results[1].name, "Fraud Detection Engine");
    }

    #[test]
    fn test_price_high_is_exact_reverse_of_price_low() {
        let catalog = Catalog::sample_at(reference_now());
        let low = ListingQuery::new("", CategoryFilter::All, Some(SortKey::PriceLow))
            .apply(catalog.all(), reference_now());
        let mut high = ListingQuery::new("", CategoryFilter::All, Some(SortKey::PriceHigh))
            .apply(catalog.all(), reference_now());

        assert!(low.windows(2).all(|w| w[0].price.amount <= w[1].price.amount));
        high.reverse();
        assert_eq!(names(&low), names(&high));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let catalog = Catalog::sample_at(reference_now());
        for key in SortKey::ALL {
            let query = ListingQuery::new("a", CategoryFilter::All, Some(key));
            let first = query.apply(catalog.all(), reference_now());
            let second = query.apply(catalog.all(), reference_now());
            assert_eq!(names(&first), names(&second), "{key}");
        }
    }

    #[test]
    fn test_unknown_sort_key_keeps_input_order() {
        let catalog = Catalog::sample_at(reference_now());
        assert_eq!(SortKey::parse("popularity"), None);

        let query = ListingQuery::new("", CategoryFilter::All, SortKey::parse("popularity"));
        let results = query.apply(catalog.all(), reference_now());
        let input: Vec<&str> = catalog.all().iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names(&results), input);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let catalog = Catalog::sample_at(reference_now());
        let query = ListingQuery::new("quantum teleporter", CategoryFilter::All, None);
        assert!(query.apply(catalog.all(), reference_now()).is_empty());
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!("ALL".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "nlp".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Nlp))
        );
        assert!("music".parse::<CategoryFilter>().is_err());
    }
}
