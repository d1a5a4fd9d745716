//! REST API types for the dashboard frontend.
//!
//! Payloads are ready to render: aggregation results are arrays of
//! `{ key, sales }` in display order.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::DatasetNotice;
use crate::transform::clean::CleaningReport;
use crate::transform::filter::FilterOptions;
use crate::transform::pipeline::{Dashboard, DatasetOverview, PreparedDataset};

/// Filter query string: `?regions=East,West&categories=Furniture`.
///
/// An absent parameter selects every value; a present but empty one selects
/// nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub regions: Option<String>,
    pub categories: Option<String>,
}

impl FilterQuery {
    pub fn regions(&self) -> Option<Vec<String>> {
        self.regions.as_deref().map(split_list)
    }

    pub fn categories(&self) -> Option<Vec<String>> {
        self.categories.as_deref().map(split_list)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Response of `/api/dashboard`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Unique request identifier
    pub request_id: String,

    /// Status: "ready" or "empty" (selection matched no rows)
    pub status: String,

    pub dashboard: Dashboard,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            status: if dashboard.filtered_rows == 0 { "empty" } else { "ready" }.to_string(),
            dashboard,
        }
    }
}

/// Response of `/api/options`: what a UI needs to draw its filter widgets
/// and the cleaning summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub options: FilterOptions,
    pub overview: DatasetOverview,
    pub report: CleaningReport,
    pub notices: Vec<DatasetNotice>,
}

impl From<&PreparedDataset> for OptionsResponse {
    fn from(dataset: &PreparedDataset) -> Self {
        Self {
            options: FilterOptions::from_table(&dataset.table),
            overview: dataset.overview.clone(),
            report: dataset.report.clone(),
            notices: dataset.notices.clone(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_parameter_means_all() {
        let query = FilterQuery::default();
        assert_eq!(query.regions(), None);
        assert_eq!(query.categories(), None);
    }

    #[test]
    fn test_empty_parameter_means_none() {
        let query = FilterQuery {
            regions: Some(String::new()),
            categories: Some("Furniture, Technology ,".into()),
        };
        assert_eq!(query.regions(), Some(vec![]));
        assert_eq!(
            query.categories(),
            Some(vec!["Furniture".to_string(), "Technology".to_string()])
        );
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Required column(s) missing: Sales");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Required column(s) missing: Sales");
    }
}
