use super::result::{TestResult, TestStatus};
use serde::{Deserialize, Serialize};

/// Aggregate counts over a result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub flaky: usize,
    /// Whole percent of passing results, 0 for an empty list
    pub pass_rate: u32,
}

/// Compute stats over the full (unfiltered) result list
pub fn compute_stats(results: &[TestResult]) -> Stats {
    let (passed, failed, flaky) = results.iter().fold((0, 0, 0), |(p, f, fl), result| {
        let fl = if result.flaky { fl + 1 } else { fl };
        match result.status {
            TestStatus::Pass => (p + 1, f, fl),
            TestStatus::Fail => (p, f + 1, fl),
        }
    });

    let total = results.len();
    let pass_rate = if total > 0 {
        (passed as f64 / total as f64 * 100.0).round() as u32
    } else {
        0
    };

    Stats {
        total,
        passed,
        failed,
        flaky,
        pass_rate,
    }
}
