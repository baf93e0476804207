//! Creator dashboard: one creator's listings and aggregate numbers

use rust_decimal::Decimal;

use aichainx_protocol::common::ModelListing;

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub active_models: usize,
    pub total_usage: u64,
    /// `None` when the creator has no listings
    pub average_rating: Option<f32>,
    /// Sum of listed prices, in the catalog currency
    pub listed_value: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreatorDashboard<'a> {
    creator: String,
    listings: Vec<&'a ModelListing>,
}

impl<'a> CreatorDashboard<'a> {
    pub fn for_creator(catalog: &'a Catalog, creator: &str) -> Self {
        Self {
            creator: creator.trim().to_string(),
            listings: catalog.by_creator(creator),
        }
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn listings(&self) -> &[&'a ModelListing] {
        &self.listings
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// What to tell a creator with no listings. Catalog listings carry
    /// organisation names, so an account email never matches one.
    pub fn empty_state_hint(&self) -> String {
        if self.creator.contains('@') {
            format!(
                "Listings are published under organisation names, not account emails like {}. \
                 Run `aichainx dashboard --creator \"<organisation>\"` to view one.",
                self.creator
            )
        } else {
            format!(
                "No listings are published under \"{}\". Run `aichainx upload` to publish one, \
                 or pass `--creator` with another organisation name.",
                self.creator
            )
        }
    }

    pub fn stats(&self) -> DashboardStats {
        let count = self.listings.len();
        let average_rating = if count == 0 {
            None
        } else {
            let sum: f32 = self.listings.iter().map(|l| l.rating).sum();
            Some(sum / count as f32)
        };

        DashboardStats {
            active_models: count,
            total_usage: self.listings.iter().map(|l| l.usage).sum(),
            average_rating,
            listed_value: self.listings.iter().map(|l| l.price.amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::reference_now;

    #[test]
    fn test_known_creator() {
        let catalog = Catalog::sample_at(reference_now());
        let dashboard = CreatorDashboard::for_creator(&catalog, "datascience labs");

        let stats = dashboard.stats();
        assert_eq!(dashboard.listings().len(), 1);
        assert_eq!(stats.active_models, 1);
        assert_eq!(stats.total_usage, 12_400);
        assert_eq!(stats.listed_value, Decimal::new(2500, 2));
        assert!((stats.average_rating.unwrap() - 4.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_creator_is_empty() {
        let catalog = Catalog::sample_at(reference_now());
        let dashboard = CreatorDashboard::for_creator(&catalog, "new@aichainx.io");

        assert!(dashboard.is_empty());
        let stats = dashboard.stats();
        assert_eq!(stats.active_models, 0);
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.listed_value, Decimal::ZERO);
    }

    #[test]
    fn test_empty_hint_for_email_points_to_creator_flag() {
        let catalog = Catalog::sample_at(reference_now());
        let dashboard = CreatorDashboard::for_creator(&catalog, "new@aichainx.io");

        let hint = dashboard.empty_state_hint();
        assert!(hint.contains("organisation names"));
        assert!(hint.contains("--creator"));
    }

    #[test]
    fn test_empty_hint_for_unknown_organisation() {
        let catalog = Catalog::sample_at(reference_now());
        let dashboard = CreatorDashboard::for_creator(&catalog, "Nobody Labs");

        let hint = dashboard.empty_state_hint();
        assert!(hint.contains("\"Nobody Labs\""));
        assert!(hint.contains("aichainx upload"));
    }
}
