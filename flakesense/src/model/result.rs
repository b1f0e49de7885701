use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification emitted for timing-dependent failures
pub const KIND_FLAKY: &str = "Flaky";
/// Classification emitted for environment failures
pub const KIND_INFRA_ISSUE: &str = "Infra Issue";
/// Classification emitted for genuine assertion failures
pub const KIND_REAL_BUG: &str = "Real Bug";

/// Display format for timestamps in tables and reports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Test outcome as reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Pass,
    Fail,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "Pass",
            TestStatus::Fail => "Fail",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✅",
            TestStatus::Fail => "❌",
        }
    }

    /// Status cell text, e.g. "✅ Pass"
    pub fn label(&self) -> String {
        format!("{} {}", self.icon(), self.as_str())
    }
}

/// A single test record produced by the backend.
///
/// `kind` and `flaky` are stored as received. The backend usually pairs
/// `flaky == true` with `kind == "Flaky"` but nothing here relies on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    #[serde(default)]
    pub name: String,
    pub status: TestStatus,
    /// Classification: "", "Flaky", "Infra Issue", "Real Bug" (or anything else the backend sends)
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub flaky: bool,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub timestamp: String,
}

impl TestResult {
    pub fn is_classified(&self) -> bool {
        !self.kind.is_empty()
    }

    /// Case-insensitive substring match over name, type and log.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.name, &self.kind, &self.log]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Local>> {
        parse_timestamp(&self.timestamp)
    }

    /// Local-time rendering of the timestamp, or the raw string if it does not parse
    pub fn display_timestamp(&self) -> String {
        self.parsed_timestamp()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2025-07-09T10:00:00.000Z`) and naive local time with
/// optional fractional seconds (`2025-07-09T10:00:00.123456`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Decode a `/results` payload.
///
/// Anything that is not an array is treated as an empty result set. Array
/// elements that cannot be decoded are skipped; the rest are kept in order.
pub fn decode_results(payload: Value) -> Vec<TestResult> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            log::warn!(
                "results payload is not an array ({}), treating as empty",
                value_kind(&other)
            );
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!("skipping malformed result at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wire_format() {
        let payload = json!([
            {
                "name": "payment",
                "status": "Fail",
                "type": "Flaky",
                "flaky": true,
                "log": "TimeoutError: simulated failure for payment",
                "timestamp": "2025-07-09T10:00:00.000Z"
            },
            {
                "name": "login",
                "status": "Pass",
                "type": "",
                "flaky": false,
                "log": "",
                "timestamp": "2025-07-09T10:01:00.000Z"
            }
        ]);

        let results = decode_results(payload);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "payment");
        assert_eq!(results[0].status, TestStatus::Fail);
        assert_eq!(results[0].kind, KIND_FLAKY);
        assert!(results[0].flaky);
        assert_eq!(results[1].status, TestStatus::Pass);
        assert!(!results[1].is_classified());
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        assert!(decode_results(json!({"error": "boom"})).is_empty());
        assert!(decode_results(json!("not a list")).is_empty());
        assert!(decode_results(Value::Null).is_empty());
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let payload = json!([
            {"name": "login", "status": "Pass"},
            42,
            {"name": "signup", "status": "Skipped"},
            {"name": "logout", "status": "Fail", "type": "Infra Issue"}
        ]);

        let results = decode_results(payload);
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["login", "logout"]);
        assert_eq!(results[0].log, "");
        assert_eq!(results[1].kind, KIND_INFRA_ISSUE);
    }

    #[test]
    fn test_serializes_type_field() {
        let result = TestResult {
            name: "signup".to_string(),
            status: TestStatus::Fail,
            kind: KIND_REAL_BUG.to_string(),
            flaky: false,
            log: "AssertionError".to_string(),
            timestamp: String::new(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "Real Bug");
        assert_eq!(value["status"], "Fail");
    }

    #[test]
    fn test_search_matches_any_field() {
        let result = TestResult {
            name: "payment".to_string(),
            status: TestStatus::Fail,
            kind: "Flaky".to_string(),
            flaky: true,
            log: "TimeoutError: Payment gateway timeout".to_string(),
            timestamp: String::new(),
        };
        assert!(result.matches_lowercase("pay"));
        assert!(result.matches_lowercase("flaky"));
        assert!(result.matches_lowercase("gateway"));
        assert!(!result.matches_lowercase("login"));
    }

    #[test]
    fn test_timestamp_formats() {
        let naive = TestResult {
            name: "login".to_string(),
            status: TestStatus::Pass,
            kind: String::new(),
            flaky: false,
            log: String::new(),
            timestamp: "2025-07-09T10:00:00.123456".to_string(),
        };
        assert_eq!(naive.display_timestamp(), "2025-07-09 10:00:00");

        assert!(parse_timestamp("2025-07-09T10:00:00.000Z").is_some());
        assert!(parse_timestamp("2025-07-09T10:00:00").is_some());

        let broken = TestResult {
            timestamp: "yesterday".to_string(),
            ..naive
        };
        assert_eq!(broken.display_timestamp(), "yesterday");
    }
}
