//! Render model: everything a front-end needs to draw the dashboard.

use crate::controller::{Controls, DashboardState};
use crate::model::{Filter, Stats, TestResult, TestStatus};

pub const TITLE: &str = "🔍 FlakeSense";
pub const SUBTITLE: &str = "Smart QA Platform for Test Analysis";
pub const LOADING_MESSAGE: &str = "Loading test results...";
pub const EMPTY_MESSAGE: &str = "📋 No tests yet. Click \"Run Tests\" to start!";
pub const NO_MATCH_MESSAGE: &str = "No results match the current filter.";

pub const COLUMNS: [&str; 6] = ["Test Name", "Status", "Type", "Flaky?", "Log", "Timestamp"];

/// Snapshot of the dashboard, derived from [`DashboardState`]
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub controls: Controls,
    pub error: Option<String>,
    /// Stats over all results, not just the visible ones
    pub stats: Stats,
    pub filter: Filter,
    pub search_term: String,
    pub auto_refresh: bool,
    /// Results that pass the filter and search, in backend order
    pub visible: Vec<TestResult>,
    pub body: ViewBody,
}

/// What the results section shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewBody {
    Loading,
    Empty,
    NoMatch,
    Table(Vec<ResultRow>),
}

impl ViewBody {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ViewBody::Loading => Some(LOADING_MESSAGE),
            ViewBody::Empty => Some(EMPTY_MESSAGE),
            ViewBody::NoMatch => Some(NO_MATCH_MESSAGE),
            ViewBody::Table(_) => None,
        }
    }
}

/// One table row, already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub status: TestStatus,
    pub status_label: String,
    pub kind_label: String,
    pub flaky: bool,
    pub flaky_label: &'static str,
    pub log_label: String,
    pub timestamp_label: String,
}

impl ResultRow {
    pub fn from_result(result: &TestResult) -> Self {
        Self {
            name: result.name.clone(),
            status: result.status,
            status_label: result.status.label(),
            kind_label: or_dash(&result.kind),
            flaky: result.flaky,
            flaky_label: if result.flaky { "✅" } else { "❌" },
            log_label: or_dash(&result.log),
            timestamp_label: result.display_timestamp(),
        }
    }

    /// CSS-style class for the classification: lowercased, first space to '-'
    pub fn kind_class(&self) -> String {
        if self.kind_label == "-" {
            String::new()
        } else {
            self.kind_label.to_lowercase().replacen(' ', "-", 1)
        }
    }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

impl DashboardView {
    pub fn from_state(state: &DashboardState) -> Self {
        let visible: Vec<TestResult> = state.filtered().into_iter().cloned().collect();

        let body = if state.is_loading {
            ViewBody::Loading
        } else if state.results.is_empty() {
            ViewBody::Empty
        } else if visible.is_empty() {
            ViewBody::NoMatch
        } else {
            ViewBody::Table(visible.iter().map(ResultRow::from_result).collect())
        };

        Self {
            controls: state.controls(),
            error: state.error.clone(),
            stats: state.stats(),
            filter: state.filter,
            search_term: state.search_term.clone(),
            auto_refresh: state.auto_refresh,
            visible,
            body,
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        match &self.body {
            ViewBody::Table(rows) => rows,
            _ => &[],
        }
    }

    /// Error banner text, e.g. "⚠️ Backend is offline or unreachable"
    pub fn error_banner(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("⚠️ {}", e))
    }
}
