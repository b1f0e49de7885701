use colored::{Color, ColoredString, Colorize};

use crate::model::result::{KIND_FLAKY, KIND_INFRA_ISSUE, KIND_REAL_BUG};
use crate::model::TestStatus;
use crate::view::{DashboardView, ResultRow, ViewBody, COLUMNS, SUBTITLE, TITLE};

/// Longest log excerpt shown in a table cell
pub const LOG_COLUMN_MAX: usize = 60;

/// Render the dashboard as colored terminal text
pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    let stats = &view.stats;

    out.push_str(&format!("\n{}\n", TITLE.bold()));
    out.push_str(&format!("{}\n\n", SUBTITLE.dimmed()));

    out.push_str(&format!(
        "  {}   {}   Auto-refresh: {}\n",
        control(view.controls.run.label, view.controls.run.enabled),
        control(view.controls.refresh.label, view.controls.refresh.enabled),
        if view.auto_refresh {
            "on".green()
        } else {
            "off".dimmed()
        }
    ));

    if let Some(banner) = view.error_banner() {
        out.push_str(&format!("\n  {}\n", banner.red().bold()));
    }

    out.push_str(&format!(
        "\n  Total: {}  Passed: {}  Failed: {}  Flaky: {}  Pass rate: {}%\n",
        stats.total.to_string().bold(),
        stats.passed.to_string().green(),
        stats.failed.to_string().red(),
        stats.flaky.to_string().yellow(),
        stats.pass_rate.to_string().bold()
    ));

    let mut filter_line = format!("  Filter: {}", view.filter.to_string().cyan());
    if !view.search_term.is_empty() {
        filter_line.push_str(&format!("  Search: \"{}\"", view.search_term.cyan()));
    }
    if let ViewBody::Table(rows) = &view.body {
        filter_line.push_str(&format!("  ({} of {} shown)", rows.len(), stats.total));
    }
    out.push_str(&filter_line);
    out.push_str("\n\n");

    match &view.body {
        ViewBody::Table(rows) => out.push_str(&table(rows)),
        other => {
            out.push_str(&format!("  {}\n", other.message().unwrap_or_default().dimmed()));
        }
    }

    out
}

fn control(label: &str, enabled: bool) -> ColoredString {
    if enabled {
        format!("[{}]", label).bold()
    } else {
        format!("[{}]", label).dimmed()
    }
}

fn table(rows: &[ResultRow]) -> String {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.name.clone(),
                row.status_label.clone(),
                row.kind_label.clone(),
                row.flaky_label.to_string(),
                truncate(&row.log_label, LOG_COLUMN_MAX),
                row.timestamp_label.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(&widths)
        .map(|(column, width)| pad(column, *width).bold().to_string())
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ")));

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&format!("  {}\n", rule.join("  ").dimmed()));

    for (row, cells) in rows.iter().zip(&cells) {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(column, (cell, width))| style_cell(row, column, pad(cell, *width)))
            .collect();
        out.push_str(&format!("  {}\n", line.join("  ")));
    }

    out
}

fn style_cell(row: &ResultRow, column: usize, text: String) -> String {
    match column {
        1 => match row.status {
            TestStatus::Pass => text.green().to_string(),
            TestStatus::Fail => text.red().to_string(),
        },
        2 => match kind_color(&row.kind_label) {
            Some(color) => text.color(color).to_string(),
            None => text,
        },
        4 | 5 => text.dimmed().to_string(),
        _ => text,
    }
}

fn kind_color(kind: &str) -> Option<Color> {
    match kind {
        KIND_FLAKY => Some(Color::Yellow),
        KIND_INFRA_ISSUE => Some(Color::Blue),
        KIND_REAL_BUG => Some(Color::Red),
        _ => None,
    }
}

/// Pad to `width` characters (padding happens before coloring)
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
