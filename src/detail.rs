//! Model detail view

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use aichainx_protocol::common::{ModelListing, UnknownVariant};

use crate::catalog::Catalog;
use crate::display;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Overview,
    Performance,
    Integration,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [
        DetailTab::Overview,
        DetailTab::Performance,
        DetailTab::Integration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DetailTab::Overview => "overview",
            DetailTab::Performance => "performance",
            DetailTab::Integration => "integration",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Performance => "Performance",
            DetailTab::Integration => "Integration",
        }
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DetailTab {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        // "code" is the older name of the integration tab
        if wanted == "code" {
            return Ok(DetailTab::Integration);
        }
        DetailTab::ALL
            .into_iter()
            .find(|t| t.id() == wanted)
            .ok_or(UnknownVariant {
                kind: "tab",
                value: s.to_string(),
            })
    }
}

/// One listing plus the selected tab
#[derive(Debug, Clone)]
pub struct ModelDetailView<'a> {
    listing: &'a ModelListing,
    tab: DetailTab,
}

impl<'a> ModelDetailView<'a> {
    /// Fails with `ListingNotFound` for an unknown id
    pub fn open(catalog: &'a Catalog, id: &str) -> Result<Self> {
        Ok(Self {
            listing: catalog.get(id)?,
            tab: DetailTab::default(),
        })
    }

    pub fn listing(&self) -> &'a ModelListing {
        self.listing
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: DetailTab) {
        self.tab = tab;
    }

    /// Summary facts shown beside every tab
    pub fn summary(&self, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let l = self.listing;
        vec![
            ("Category", l.category.short_label().to_string()),
            ("Creator", l.creator.clone()),
            ("Price", l.price.to_string()),
            ("License", format!("{} ({})", l.license.label(), l.license.terms())),
            ("Rating", display::format_rating(l.rating)),
            ("Usage", display::format_usage(l.usage)),
            ("Updated", display::format_relative(l.updated_at, now)),
            ("Created", l.created_at.format("%Y-%m-%d").to_string()),
        ]
    }

    pub fn performance(&self) -> Vec<(&'static str, String)> {
        let p = self.listing.performance;
        vec![
            ("Accuracy", format!("{}%", p.accuracy)),
            ("Latency", format!("{}ms", p.speed_ms)),
        ]
    }

    /// SDK quick-start for this listing
    pub fn sdk_snippet(&self) -> String {
        format!(
            "// Install the SDK\n\
             npm install @aichainx/sdk\n\
             \n\
             // Initialize the model\n\
             import {{ AIChainX }} from '@aichainx/sdk';\n\
             \n\
             const model = new AIChainX('{id}');\n\
             \n\
             // Make predictions\n\
             const result = await model.predict({{\n  input: \"Your input data here\"\n}});\n\
             \n\
             console.log(result);",
            id = self.listing.id
        )
    }

    /// Solidity consumer of the registry contract at `contract_address`
    pub fn contract_snippet(&self, contract_address: &str) -> String {
        format!(
            "// Solidity contract example\n\
             pragma solidity ^0.8.19;\n\
             \n\
             interface IAIModel {{\n    function execute(bytes calldata input) external returns (bytes memory);\n}}\n\
             \n\
             contract MyDApp {{\n    // {name} ({id})\n    IAIModel public model = IAIModel({address});\n\
             \n    function processData(string memory data) public returns (string memory) {{\n        bytes memory result = model.execute(abi.encode(data));\n        return abi.decode(result, (string));\n    }}\n}}",
            name = self.listing.name,
            id = self.listing.id,
            address = contract_address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::tests::utils::test_helpers::reference_now;

    const SENTIMENT: &str = "1a2b3c4d-5e6f-7g8h-9i0j-1k2l3m4n5o6p";

    #[test]
    fn test_open_unknown_listing() {
        let catalog = Catalog::sample_at(reference_now());
        let err = ModelDetailView::open(&catalog, "nope").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ListingNotFound);
    }

    #[test]
    fn test_defaults_to_overview_and_switches_tab() {
        let catalog = Catalog::sample_at(reference_now());
        let mut view = ModelDetailView::open(&catalog, SENTIMENT).unwrap();
        assert_eq!(view.tab(), DetailTab::Overview);

        view.select_tab("code".parse().unwrap());
        assert_eq!(view.tab(), DetailTab::Integration);
    }

    #[test]
    fn test_summary_formats_fields() {
        let catalog = Catalog::sample_at(reference_now());
        let view = ModelDetailView::open(&catalog, SENTIMENT).unwrap();
        let summary = view.summary(reference_now());
        let get = |k: &str| summary.iter().find(|(label, _)| *label == k).map(|(_, v)| v.clone());

        assert_eq!(get("Price").as_deref(), Some("25.00 BDAG"));
        assert_eq!(get("Usage").as_deref(), Some("12.4K"));
        assert_eq!(get("Updated").as_deref(), Some("2 days ago"));
        assert_eq!(get("License").as_deref(), Some("Commercial License (Enterprise pricing)"));
    }

    #[test]
    fn test_snippets_embed_listing() {
        let catalog = Catalog::sample_at(reference_now());
        let view = ModelDetailView::open(&catalog, SENTIMENT).unwrap();

        assert!(view
            .sdk_snippet()
            .contains(&format!("new AIChainX('{}')", SENTIMENT)));
        let solidity = view.contract_snippet("0x358AA13c52544ECCEF6B0ADD0f801012ADAD5eE3");
        assert!(solidity.contains("IAIModel(0x358AA13c52544ECCEF6B0ADD0f801012ADAD5eE3)"));
        assert!(solidity.contains("pragma solidity ^0.8.19;"));
    }

    #[test]
    fn test_performance_rows() {
        let catalog = Catalog::sample_at(reference_now());
        let view = ModelDetailView::open(&catalog, SENTIMENT).unwrap();
        assert_eq!(
            view.performance(),
            vec![("Accuracy", "94%".to_string()), ("Latency", "120ms".to_string())]
        );
    }
}
