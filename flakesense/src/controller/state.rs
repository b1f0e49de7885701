use crate::model::{compute_stats, filter_results, Filter, Stats, TestResult};

/// User-facing message for every backend failure
pub const BACKEND_UNREACHABLE: &str = "Backend is offline or unreachable";

/// Dashboard state, owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    /// Results in backend order, replaced wholesale on every successful fetch
    pub results: Vec<TestResult>,
    pub is_loading: bool,
    pub is_running: bool,
    pub error: Option<String>,
    pub filter: Filter,
    pub search_term: String,
    pub auto_refresh: bool,
}

impl DashboardState {
    pub fn stats(&self) -> Stats {
        compute_stats(&self.results)
    }

    pub fn filtered(&self) -> Vec<&TestResult> {
        filter_results(&self.results, self.filter, &self.search_term)
    }

    pub fn controls(&self) -> Controls {
        Controls {
            run: if self.is_running {
                Control::busy("🔄 Running Tests...")
            } else {
                Control::idle("▶️ Run Tests")
            },
            refresh: if self.is_loading {
                Control::busy("🔄 Loading...")
            } else {
                Control::idle("🔄 Refresh")
            },
        }
    }
}

/// A clickable control and its current label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub enabled: bool,
    pub label: &'static str,
}

impl Control {
    fn idle(label: &'static str) -> Self {
        Self {
            enabled: true,
            label,
        }
    }

    fn busy(label: &'static str) -> Self {
        Self {
            enabled: false,
            label,
        }
    }
}

/// Run and Refresh controls, gated by the running/loading flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub run: Control,
    pub refresh: Control,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = DashboardState::default();
        assert!(state.results.is_empty());
        assert!(!state.is_loading && !state.is_running);
        assert_eq!(state.error, None);
        assert_eq!(state.filter, Filter::All);
        assert_eq!(state.search_term, "");
        assert!(!state.auto_refresh);
    }

    #[test]
    fn test_controls_follow_flags_independently() {
        let mut state = DashboardState::default();
        let controls = state.controls();
        assert!(controls.run.enabled && controls.refresh.enabled);
        assert_eq!(controls.run.label, "▶️ Run Tests");
        assert_eq!(controls.refresh.label, "🔄 Refresh");

        state.is_running = true;
        let controls = state.controls();
        assert!(!controls.run.enabled);
        assert!(controls.refresh.enabled);
        assert_eq!(controls.run.label, "🔄 Running Tests...");

        state.is_loading = true;
        let controls = state.controls();
        assert!(!controls.run.enabled && !controls.refresh.enabled);
        assert_eq!(controls.refresh.label, "🔄 Loading...");
    }
}
