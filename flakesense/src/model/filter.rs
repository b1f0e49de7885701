use super::result::{TestResult, TestStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row filter applied before the search term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pass,
    Fail,
    Flaky,
}

impl Filter {
    pub const VARIANTS: [Filter; 4] = [Filter::All, Filter::Pass, Filter::Fail, Filter::Flaky];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pass => "pass",
            Filter::Fail => "fail",
            Filter::Flaky => "flaky",
        }
    }

    pub fn matches(&self, result: &TestResult) -> bool {
        match self {
            Filter::All => true,
            Filter::Pass => result.status == TestStatus::Pass,
            Filter::Fail => result.status == TestStatus::Fail,
            // The flag is authoritative, whatever the status or classification
            Filter::Flaky => result.flaky,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pass" | "passed" => Ok(Filter::Pass),
            "fail" | "failed" => Ok(Filter::Fail),
            "flaky" => Ok(Filter::Flaky),
            other => Err(format!(
                "Unknown filter: {} (expected one of: all, pass, fail, flaky)",
                other
            )),
        }
    }
}

/// Apply `filter`, then a case-insensitive search over name, type and log.
///
/// Preserves input order. An empty search term matches everything.
pub fn filter_results<'a>(
    results: &'a [TestResult],
    filter: Filter,
    search_term: &str,
) -> Vec<&'a TestResult> {
    let needle = search_term.to_lowercase();
    results
        .iter()
        .filter(|result| filter.matches(result))
        .filter(|result| needle.is_empty() || result.matches_lowercase(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<TestResult> {
        let make = |name: &str, status, kind: &str, flaky, log: &str| TestResult {
            name: name.to_string(),
            status,
            kind: kind.to_string(),
            flaky,
            log: log.to_string(),
            timestamp: "2025-07-09T10:00:00.000Z".to_string(),
        };
        vec![
            make("login", TestStatus::Pass, "", false, ""),
            make(
                "payment",
                TestStatus::Fail,
                "Flaky",
                true,
                "TimeoutError: Payment gateway timeout",
            ),
            make(
                "signup",
                TestStatus::Fail,
                "Real Bug",
                false,
                "AssertionError: Email validation failed",
            ),
            make(
                "logout",
                TestStatus::Fail,
                "Infra Issue",
                false,
                "ElementNotFoundError: Logout button not found",
            ),
            // flag and classification disagree
            make("checkout", TestStatus::Pass, "", true, ""),
        ]
    }

    fn names(results: &[&TestResult]) -> Vec<String> {
        results.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_all_is_identity() {
        let results = fixture();
        assert_eq!(filter_results(&results, Filter::All, "").len(), results.len());
    }

    #[test]
    fn test_status_filters() {
        let results = fixture();
        assert_eq!(
            names(&filter_results(&results, Filter::Pass, "")),
            vec!["login", "checkout"]
        );
        assert_eq!(
            names(&filter_results(&results, Filter::Fail, "")),
            vec!["payment", "signup", "logout"]
        );
    }

    #[test]
    fn test_flaky_uses_flag_only() {
        let results = fixture();
        let flaky = filter_results(&results, Filter::Flaky, "");
        assert_eq!(names(&flaky), vec!["payment", "checkout"]);
        assert!(flaky.iter().all(|r| r.flaky));
    }

    #[test]
    fn test_search_is_case_insensitive_or() {
        let results = fixture();
        // log text
        assert_eq!(
            names(&filter_results(&results, Filter::All, "TIMEOUT")),
            vec!["payment"]
        );
        // classification
        assert_eq!(
            names(&filter_results(&results, Filter::All, "real bug")),
            vec!["signup"]
        );
        // name or log: "log" hits login/logout by name
        assert_eq!(
            names(&filter_results(&results, Filter::All, "log")),
            vec!["login", "logout"]
        );
    }

    #[test]
    fn test_filter_then_search() {
        let results = fixture();
        assert_eq!(
            names(&filter_results(&results, Filter::Fail, "log")),
            vec!["logout"]
        );
        assert!(filter_results(&results, Filter::Pass, "timeout").is_empty());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("FLAKY".parse::<Filter>(), Ok(Filter::Flaky));
        assert_eq!("passed".parse::<Filter>(), Ok(Filter::Pass));
        assert!("broken".parse::<Filter>().is_err());
        for filter in Filter::VARIANTS {
            assert_eq!(filter.to_string().parse::<Filter>(), Ok(filter));
        }
    }
}
