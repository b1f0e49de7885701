use anyhow::Result;
use serde::Serialize;

use crate::model::{Filter, Stats, TestResult};
use crate::view::DashboardView;

/// JSON snapshot of the dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsExport<'a> {
    pub generated_at: String,
    pub filter: Filter,
    pub search_term: &'a str,
    pub stats: Stats,
    pub error: Option<&'a str>,
    /// Visible results only
    pub results: &'a [TestResult],
}

impl<'a> ResultsExport<'a> {
    pub fn from_view(view: &'a DashboardView) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            filter: view.filter,
            search_term: &view.search_term,
            stats: view.stats,
            error: view.error.as_deref(),
            results: &view.visible,
        }
    }
}

pub fn render(view: &DashboardView) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ResultsExport::from_view(view))?)
}
