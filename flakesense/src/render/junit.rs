use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::model::{compute_stats, TestResult, TestStatus};
use crate::view::DashboardView;

/// JUnit XML for the visible results
pub fn render(view: &DashboardView) -> Result<String> {
    generate_junit_xml(&view.visible)
}

pub fn generate_junit_xml(results: &[TestResult]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let stats = compute_stats(results);
    let tests = stats.total.to_string();
    let failures = stats.failed.to_string();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "flakesense"));
    suites_start.push_attribute(("tests", tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // The backend reports one flat run, so a single suite
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "results"));
    suite_start.push_attribute(("tests", tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", "0"));
    writer.write_event(Event::Start(suite_start))?;

    for result in results {
        write_test_case(&mut writer, result)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, result: &TestResult) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.name.as_str()));
    case_start.push_attribute(("classname", "flakesense"));
    if !result.timestamp.is_empty() {
        case_start.push_attribute(("timestamp", result.timestamp.as_str()));
    }
    writer.write_event(Event::Start(case_start))?;

    if result.flaky || result.is_classified() {
        writer.write_event(Event::Start(BytesStart::new("properties")))?;
        if result.is_classified() {
            write_property(writer, "type", &result.kind)?;
        }
        write_property(writer, "flaky", if result.flaky { "true" } else { "false" })?;
        writer.write_event(Event::End(BytesEnd::new("properties")))?;
    }

    if result.status == TestStatus::Fail {
        let failure_type = if result.is_classified() {
            result.kind.as_str()
        } else {
            "Fail"
        };
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", first_line(&result.log)));
        fail_start.push_attribute(("type", failure_type));
        writer.write_event(Event::Start(fail_start))?;
        if !result.log.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&result.log)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn write_property<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    let mut property = BytesStart::new("property");
    property.push_attribute(("name", name));
    property.push_attribute(("value", value));
    writer.write_event(Event::Empty(property))?;
    Ok(())
}

fn first_line(log: &str) -> &str {
    log.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_junit_xml() {
        let results = vec![
            TestResult {
                name: "login".to_string(),
                status: TestStatus::Pass,
                kind: String::new(),
                flaky: false,
                log: String::new(),
                timestamp: "2025-07-09T10:00:00.000Z".to_string(),
            },
            TestResult {
                name: "payment".to_string(),
                status: TestStatus::Fail,
                kind: "Flaky".to_string(),
                flaky: true,
                log: "TimeoutError: Payment gateway timeout".to_string(),
                timestamp: "2025-07-09T10:00:01.000Z".to_string(),
            },
            TestResult {
                name: "signup".to_string(),
                status: TestStatus::Fail,
                kind: "Real Bug".to_string(),
                flaky: false,
                log: "AssertionError: <email> & name".to_string(),
                timestamp: String::new(),
            },
        ];

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="flakesense" tests="3" failures="2">"#));
        assert!(xml.contains(r#"<testcase name="login""#));
        assert!(xml.contains(r#"<property name="flaky" value="true"/>"#));
        assert!(xml.contains(r#"type="Flaky""#));
        assert!(xml.contains(r#"message="TimeoutError: Payment gateway timeout""#));
        // escaped in both attribute and text
        assert!(xml.contains("AssertionError: &lt;email&gt; &amp; name"));
        assert_eq!(xml.matches("<failure").count(), 2);
    }

    #[test]
    fn test_empty_results() {
        let xml = generate_junit_xml(&[]).unwrap();
        assert!(xml.contains(r#"tests="0""#));
        assert!(!xml.contains("<testcase"));
    }
}
