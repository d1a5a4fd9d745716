//! Categorical inclusion filters over the cleaned table.
//!
//! A record is kept when its region is selected AND its category is
//! selected. An empty set on either side selects nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{SalesTable, SalesView};

/// Values a caller can choose from, read off the cleaned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &SalesTable) -> Self {
        Self {
            regions: table.distinct_regions().into_iter().collect(),
            categories: table.distinct_categories().into_iter().collect(),
        }
    }
}

/// Selected regions and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterSelection {
    /// Every value present in the table.
    pub fn all(table: &SalesTable) -> Self {
        Self {
            regions: table.distinct_regions(),
            categories: table.distinct_categories(),
        }
    }

    /// Build a selection where `None` means "all values of the table".
    pub fn from_parts(
        table: &SalesTable,
        regions: Option<Vec<String>>,
        categories: Option<Vec<String>>,
    ) -> Self {
        Self {
            regions: regions
                .map(|r| r.into_iter().collect())
                .unwrap_or_else(|| table.distinct_regions()),
            categories: categories
                .map(|c| c.into_iter().collect())
                .unwrap_or_else(|| table.distinct_categories()),
        }
    }

    pub fn matches(&self, region: &str, category: &str) -> bool {
        self.regions.contains(region) && self.categories.contains(category)
    }
}

/// Apply a selection, producing a read-only view in table order.
pub fn apply<'a>(table: &'a SalesTable, selection: &FilterSelection) -> SalesView<'a> {
    let records = table
        .records()
        .iter()
        .filter(|r| selection.matches(&r.region, &r.category))
        .collect();

    SalesView::new(table.headers(), records)
}
