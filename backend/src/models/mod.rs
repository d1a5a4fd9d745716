//! Domain models for the sales analytics pipeline.
//!
//! - [`SalesRecord`] - One cleaned row with typed date and amount
//! - [`SalesTable`] - The cleaned, immutable dataset
//! - [`SalesView`] - A read-only filtered subset of a table
//! - [`KnownColumns`] - Positions of the fixed column set in the header
//! - [`Month`] - Calendar month with an explicit ordinal
//! - Grouping keys ([`ProductKey`], [`SubCategoryKey`], [`CustomerKey`], [`YearMonth`])
//! - [`DatasetNotice`] - Informational notices about the dataset

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CleaningError;

// =============================================================================
// Column Names
// =============================================================================

pub const ORDER_ID: &str = "Order ID";
pub const ORDER_DATE: &str = "Order Date";
pub const SALES: &str = "Sales";
pub const REGION: &str = "Region";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const PRODUCT_NAME: &str = "Product Name";
pub const CUSTOMER_NAME: &str = "Customer Name";
pub const SEGMENT: &str = "Segment";

/// Columns every downstream aggregation depends on.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    ORDER_ID,
    ORDER_DATE,
    SALES,
    REGION,
    CATEGORY,
    SUB_CATEGORY,
    PRODUCT_NAME,
    CUSTOMER_NAME,
    SEGMENT,
];

/// Optional analytical columns. Their absence disables profit analysis.
pub const PROFIT: &str = "Profit";
pub const PROFIT_COLUMNS: [&str; 3] = [PROFIT, "Cost Price", "Quantity"];

/// Date format of the order date column.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// =============================================================================
// Known Columns
// =============================================================================

/// Header positions of the fixed column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownColumns {
    pub order_id: usize,
    pub order_date: usize,
    pub sales: usize,
    pub region: usize,
    pub category: usize,
    pub sub_category: usize,
    pub product_name: usize,
    pub customer_name: usize,
    pub segment: usize,
}

impl KnownColumns {
    /// Locate every required column, or report all of the missing ones.
    pub fn locate(headers: &[String]) -> Result<Self, CleaningError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CleaningError::MissingColumns(missing));
        }

        let at = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            order_id: at(ORDER_ID),
            order_date: at(ORDER_DATE),
            sales: at(SALES),
            region: at(REGION),
            category: at(CATEGORY),
            sub_category: at(SUB_CATEGORY),
            product_name: at(PRODUCT_NAME),
            customer_name: at(CUSTOMER_NAME),
            segment: at(SEGMENT),
        })
    }
}

// =============================================================================
// Month
// =============================================================================

/// Calendar month. Ordering follows the ordinal (January = 1), never the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
    July = 7,
    August = 8,
    September = 9,
    October = 10,
    November = 11,
    December = 12,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month for a 1-based ordinal.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal.checked_sub(1)? as usize).copied()
    }

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Sales Record
// =============================================================================

/// One cleaned sales row.
///
/// `cells` holds every column of the source row in header order, with the
/// date and sales cells rewritten to their canonical text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub customer_name: String,
    pub segment: String,
    pub sales: f64,
    #[serde(skip)]
    pub cells: Vec<String>,
}

impl SalesRecord {
    pub fn year(&self) -> i32 {
        self.order_date.year()
    }

    pub fn month(&self) -> Month {
        // chrono months are always 1..=12
        Month::from_ordinal(self.order_date.month()).unwrap_or(Month::January)
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year(),
            month: self.month(),
        }
    }
}

// =============================================================================
// Sales Table / View
// =============================================================================

/// The cleaned dataset. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    headers: Vec<String>,
    columns: KnownColumns,
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(headers: Vec<String>, columns: KnownColumns, records: Vec<SalesRecord>) -> Self {
        Self {
            headers,
            columns,
            records,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &KnownColumns {
        &self.columns
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.headers.len())
    }

    /// A view over every record.
    pub fn view(&self) -> SalesView<'_> {
        SalesView::new(&self.headers, self.records.iter().collect())
    }

    /// Sorted distinct regions.
    pub fn distinct_regions(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.region.clone()).collect()
    }

    /// Sorted distinct categories.
    pub fn distinct_categories(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.category.clone()).collect()
    }
}

/// Read-only subset of a [`SalesTable`], in table order.
#[derive(Debug, Clone)]
pub struct SalesView<'a> {
    headers: &'a [String],
    records: Vec<&'a SalesRecord>,
}

impl<'a> SalesView<'a> {
    pub fn new(headers: &'a [String], records: Vec<&'a SalesRecord>) -> Self {
        Self { headers, records }
    }

    pub fn headers(&self) -> &'a [String] {
        self.headers
    }

    pub fn records(&self) -> &[&'a SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Grouping Keys
// =============================================================================

/// Product × category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductKey {
    pub product_name: String,
    pub category: String,
}

/// Category × sub-category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryKey {
    pub category: String,
    pub sub_category: String,
}

/// Customer × segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerKey {
    pub customer_name: String,
    pub segment: String,
}

/// Time bucket. Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

// =============================================================================
// Dataset Notices
// =============================================================================

/// Informational notices raised once per dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DatasetNotice {
    /// No `Profit` column: profit margin and loss-making product analyses are
    /// unavailable and all insights are based on sales only.
    #[serde(rename_all = "camelCase")]
    ProfitColumnsMissing { missing: Vec<String> },
}

impl DatasetNotice {
    pub fn message(&self) -> String {
        match self {
            Self::ProfitColumnsMissing { missing } => format!(
                "Dataset has no {} column(s): profit margin and loss-making product analysis are unavailable, insights use Sales only",
                missing.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_month_ordering_is_calendar_order() {
        assert!(Month::January < Month::February);
        assert!(Month::April < Month::August);
        // Alphabetically "April" < "August" < "December" < "February"...
        assert!(Month::February < Month::December);
        assert_eq!(Month::from_ordinal(3), Some(Month::March));
        assert_eq!(Month::from_ordinal(0), None);
        assert_eq!(Month::from_ordinal(13), None);
        assert_eq!(Month::December.ordinal(), 12);
    }

    #[test]
    fn test_year_month_orders_by_year_first() {
        let dec_2022 = YearMonth { year: 2022, month: Month::December };
        let jan_2023 = YearMonth { year: 2023, month: Month::January };
        let feb_2023 = YearMonth { year: 2023, month: Month::February };
        assert!(dec_2022 < jan_2023);
        assert!(jan_2023 < feb_2023);
    }

    #[test]
    fn test_locate_known_columns() {
        let h = headers(&[
            "Row ID", "Order ID", "Order Date", "Customer Name", "Segment", "Region",
            "Product Name", "Category", "Sub-Category", "Sales",
        ]);
        let cols = KnownColumns::locate(&h).unwrap();
        assert_eq!(cols.order_id, 1);
        assert_eq!(cols.order_date, 2);
        assert_eq!(cols.sales, 9);
        assert_eq!(cols.sub_category, 8);
    }

    #[test]
    fn test_locate_reports_every_missing_column() {
        let h = headers(&["Order ID", "Region", "Category"]);
        match KnownColumns::locate(&h) {
            Err(CleaningError::MissingColumns(missing)) => {
                assert!(missing.contains(&"Order Date".to_string()));
                assert!(missing.contains(&"Sales".to_string()));
                assert_eq!(missing.len(), 6);
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_notice_message_mentions_sales_only() {
        let notice = DatasetNotice::ProfitColumnsMissing {
            missing: vec!["Profit".into(), "Quantity".into()],
        };
        let msg = notice.message();
        assert!(msg.contains("Profit, Quantity"));
        assert!(msg.contains("Sales only"));
    }
}
