//! Group-by aggregations over a filtered [`SalesView`].
//!
//! # Architecture
//!
//! ```text
//! SalesView (rows)               →  AggregationResult (ranked)
//! ┌────────────────────────┐       ┌──────────────────────┐
//! │ Region: East, 100      │       │ East   300           │
//! │ Region: West,  50      │  →    │ West    50           │
//! │ Region: East, 200      │       └──────────────────────┘
//! └────────────────────────┘
//! ```
//!
//! Rankings sort by summed sales descending, ties by ascending key.
//! Time series sort chronologically instead. Empty views give empty
//! results and zero metrics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::{CustomerKey, ProductKey, SalesRecord, SalesView, SubCategoryKey, YearMonth};

/// One group and its summed sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal<K> {
    pub key: K,
    pub sales: f64,
}

/// Ordered group totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationResult<K> {
    entries: Vec<GroupTotal<K>>,
}

impl<K> AggregationResult<K> {
    pub fn entries(&self) -> &[GroupTotal<K>] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<GroupTotal<K>> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&GroupTotal<K>> {
        self.entries.first()
    }

    /// Keep the first `n` entries. Fewer than `n` groups are returned as-is.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Sum over all entries.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.sales).sum()
    }
}

impl<K> Default for AggregationResult<K> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

/// Scalar KPIs of a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_sales: f64,
    pub total_orders: usize,
    pub unique_products: usize,
    pub unique_customers: usize,
}

fn accumulate<K, F>(view: &SalesView<'_>, key_fn: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let mut groups = BTreeMap::new();
    for record in view.iter() {
        *groups.entry(key_fn(record)).or_insert(0.0) += record.sales;
    }
    groups
}

/// Sum sales per key; descending by sum, ties ascending by key.
pub fn grouped_sum<K, F>(view: &SalesView<'_>, key_fn: F) -> AggregationResult<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    // BTreeMap yields keys ascending and the sort is stable, so ties keep key order.
    let mut entries: Vec<GroupTotal<K>> = accumulate(view, key_fn)
        .into_iter()
        .map(|(key, sales)| GroupTotal { key, sales })
        .collect();
    entries.sort_by(|a, b| b.sales.total_cmp(&a.sales));

    AggregationResult { entries }
}

/// Sum sales per key, ordered by ascending key.
pub fn chronological_sum<K, F>(view: &SalesView<'_>, key_fn: F) -> AggregationResult<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let entries = accumulate(view, key_fn)
        .into_iter()
        .map(|(key, sales)| GroupTotal { key, sales })
        .collect();

    AggregationResult { entries }
}

/// [`grouped_sum`] truncated to `n` groups.
pub fn top_n<K, F>(view: &SalesView<'_>, key_fn: F, n: usize) -> AggregationResult<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    grouped_sum(view, key_fn).top(n)
}

pub fn sales_by_product(view: &SalesView<'_>) -> AggregationResult<ProductKey> {
    grouped_sum(view, |r| ProductKey {
        product_name: r.product_name.clone(),
        category: r.category.clone(),
    })
}

pub fn sales_by_region(view: &SalesView<'_>) -> AggregationResult<String> {
    grouped_sum(view, |r| r.region.clone())
}

pub fn sales_by_category(view: &SalesView<'_>) -> AggregationResult<String> {
    grouped_sum(view, |r| r.category.clone())
}

pub fn sales_by_sub_category(view: &SalesView<'_>) -> AggregationResult<SubCategoryKey> {
    grouped_sum(view, |r| SubCategoryKey {
        category: r.category.clone(),
        sub_category: r.sub_category.clone(),
    })
}

pub fn sales_by_customer(view: &SalesView<'_>) -> AggregationResult<CustomerKey> {
    grouped_sum(view, |r| CustomerKey {
        customer_name: r.customer_name.clone(),
        segment: r.segment.clone(),
    })
}

/// Monthly totals, by year then calendar month.
pub fn monthly_sales(view: &SalesView<'_>) -> AggregationResult<YearMonth> {
    chronological_sum(view, SalesRecord::year_month)
}

/// Yearly totals, oldest first.
pub fn sales_by_year(view: &SalesView<'_>) -> AggregationResult<i32> {
    chronological_sum(view, SalesRecord::year)
}

/// Total sales and distinct counts in a single pass.
pub fn key_metrics(view: &SalesView<'_>) -> KeyMetrics {
    let mut total_sales = 0.0;
    let mut orders = HashSet::new();
    let mut products = HashSet::new();
    let mut customers = HashSet::new();

    for record in view.iter() {
        total_sales += record.sales;
        orders.insert(record.order_id.as_str());
        products.insert(record.product_name.as_str());
        customers.insert(record.customer_name.as_str());
    }

    KeyMetrics {
        total_sales,
        total_orders: orders.len(),
        unique_products: products.len(),
        unique_customers: customers.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Month, SalesTable};
    use crate::parser::parse_str;
    use crate::transform::clean::clean;

    const HEADER: &str =
        "Order ID,Order Date,Customer Name,Segment,Region,Product Name,Category,Sub-Category,Sales";

    fn table(body: &str) -> SalesTable {
        let raw = parse_str(&format!("{}\n{}", HEADER, body), ',', "utf-8".into()).unwrap();
        clean(&raw).unwrap().0
    }

    fn example() -> SalesTable {
        table(
            "CA-1,01/03/2023,A,Consumer,East,Chair,Furniture,Chairs,100\n\
             CA-2,15/03/2023,B,Corporate,West,Phone,Technology,Phones,50\n\
             CA-3,02/04/2023,C,Consumer,East,Phone,Technology,Phones,200",
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_grouped_sum_by_region() {
        let table = example();
        let result = sales_by_region(&table.view());

        assert_eq!(
            result.entries(),
            &[
                GroupTotal { key: "East".to_string(), sales: 300.0 },
                GroupTotal { key: "West".to_string(), sales: 50.0 },
            ]
        );
        assert_eq!(
            result.top(1).entries(),
            &[GroupTotal { key: "East".to_string(), sales: 300.0 }]
        );
    }

    #[test]
    fn test_monthly_sales_example() {
        let table = example();
        let result = monthly_sales(&table.view());
        let months: Vec<(i32, Month, f64)> = result
            .entries()
            .iter()
            .map(|e| (e.key.year, e.key.month, e.sales))
            .collect();

        assert_eq!(
            months,
            vec![(2023, Month::March, 150.0), (2023, Month::April, 200.0)]
        );
    }

    #[test]
    fn test_monthly_sales_not_alphabetical() {
        let table = table(
            "CA-1,10/02/2023,A,Consumer,East,P,Furniture,Chairs,1\n\
             CA-2,10/01/2023,A,Consumer,East,P,Furniture,Chairs,2\n\
             CA-3,10/12/2022,A,Consumer,East,P,Furniture,Chairs,3\n\
             CA-4,10/08/2023,A,Consumer,East,P,Furniture,Chairs,4\n\
             CA-5,10/04/2023,A,Consumer,East,P,Furniture,Chairs,5",
        );
        let keys: Vec<YearMonth> = monthly_sales(&table.view())
            .entries()
            .iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(
            keys,
            vec![
                YearMonth { year: 2022, month: Month::December },
                YearMonth { year: 2023, month: Month::January },
                YearMonth { year: 2023, month: Month::February },
                YearMonth { year: 2023, month: Month::April },
                YearMonth { year: 2023, month: Month::August },
            ]
        );
    }

    #[test]
    fn test_sales_by_year() {
        let table = table(
            "CA-1,10/02/2024,A,Consumer,East,P,Furniture,Chairs,1\n\
             CA-2,10/01/2023,A,Consumer,East,P,Furniture,Chairs,2\n\
             CA-3,10/12/2023,A,Consumer,East,P,Furniture,Chairs,3",
        );
        let years: Vec<(i32, f64)> = sales_by_year(&table.view())
            .entries()
            .iter()
            .map(|e| (e.key, e.sales))
            .collect();
        assert_eq!(years, vec![(2023, 5.0), (2024, 1.0)]);
    }

    #[test]
    fn test_ties_broken_by_ascending_key() {
        let table = table(
            "CA-1,01/01/2023,A,Consumer,West,P,Furniture,Chairs,10\n\
             CA-2,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10\n\
             CA-3,01/01/2023,A,Consumer,Central,P,Furniture,Chairs,10\n\
             CA-4,01/01/2023,A,Consumer,South,P,Furniture,Chairs,20",
        );
        let keys: Vec<String> = sales_by_region(&table.view())
            .into_entries()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["South", "Central", "East", "West"]);
    }

    #[test]
    fn test_compound_keys() {
        let table = table(
            "CA-1,01/01/2023,Ann,Consumer,East,Chair,Furniture,Chairs,10\n\
             CA-2,01/01/2023,Ann,Consumer,East,Chair,Furniture,Chairs,15\n\
             CA-3,01/01/2023,Bob,Corporate,East,Phone,Technology,Phones,20",
        );
        let view = table.view();

        let products = sales_by_product(&view);
        assert_eq!(products.first().unwrap().key.product_name, "Chair");
        assert!(approx(products.first().unwrap().sales, 25.0));

        let subs = sales_by_sub_category(&view);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs.first().unwrap().key.sub_category, "Chairs");

        let customers = sales_by_customer(&view);
        assert_eq!(
            customers.first().unwrap().key,
            CustomerKey { customer_name: "Ann".into(), segment: "Consumer".into() }
        );
        assert_eq!(sales_by_category(&view).len(), 2);
    }

    #[test]
    fn test_conservation_of_totals() {
        let table = table(
            "CA-1,01/01/2023,A,Consumer,East,P1,Furniture,Chairs,10.1\n\
             CA-2,02/02/2023,B,Corporate,West,P2,Technology,Phones,20.2\n\
             CA-3,03/03/2024,C,Consumer,East,P3,Office Supplies,Paper,30.3\n\
             CA-4,04/04/2024,A,Home Office,South,P1,Furniture,Chairs,40.4",
        );
        let view = table.view();
        let direct: f64 = view.iter().map(|r| r.sales).sum();

        assert!(approx(sales_by_region(&view).total(), direct));
        assert!(approx(sales_by_category(&view).total(), direct));
        assert!(approx(sales_by_product(&view).total(), direct));
        assert!(approx(sales_by_sub_category(&view).total(), direct));
        assert!(approx(sales_by_customer(&view).total(), direct));
        assert!(approx(monthly_sales(&view).total(), direct));
        assert!(approx(sales_by_year(&view).total(), direct));
        assert!(approx(key_metrics(&view).total_sales, direct));
    }

    #[test]
    fn test_top_n_prefix_consistency() {
        let table = table(
            "CA-1,01/01/2023,A,Consumer,East,P1,Furniture,Chairs,5\n\
             CA-2,01/01/2023,A,Consumer,East,P2,Furniture,Chairs,9\n\
             CA-3,01/01/2023,A,Consumer,East,P3,Furniture,Chairs,1\n\
             CA-4,01/01/2023,A,Consumer,East,P4,Furniture,Chairs,9\n\
             CA-5,01/01/2023,A,Consumer,East,P5,Furniture,Chairs,7",
        );
        let view = table.view();
        let key = |r: &SalesRecord| r.product_name.clone();

        for k in 0..=6 {
            let top = top_n(&view, key, k);
            assert!(top.len() <= k);
            assert!(top.entries().windows(2).all(|w| w[0].sales >= w[1].sales));
            for m in 0..=3 {
                assert_eq!(top_n(&view, key, k + m).top(k), top);
            }
        }
        // Fewer groups than requested: everything, no padding
        assert_eq!(top_n(&view, key, 50).len(), 5);
    }

    #[test]
    fn test_key_metrics_distinct_counts() {
        let table = table(
            "CA-1,01/01/2023,Ann,Consumer,East,Chair,Furniture,Chairs,10\n\
             CA-1,01/01/2023,Ann,Consumer,East,Desk,Furniture,Tables,15\n\
             CA-2,02/01/2023,Bob,Corporate,East,Chair,Furniture,Chairs,20",
        );
        let metrics = key_metrics(&table.view());

        assert!(approx(metrics.total_sales, 45.0));
        assert_eq!(metrics.total_orders, 2);
        assert_eq!(metrics.unique_products, 2);
        assert_eq!(metrics.unique_customers, 2);
    }

    #[test]
    fn test_empty_view_gives_empty_results() {
        let table = example();
        let view = SalesView::new(table.headers(), Vec::new());

        assert!(sales_by_region(&view).is_empty());
        assert!(sales_by_product(&view).top(15).is_empty());
        assert!(monthly_sales(&view).is_empty());
        assert!(sales_by_year(&view).is_empty());
        assert_eq!(key_metrics(&view), KeyMetrics::default());
    }
}
