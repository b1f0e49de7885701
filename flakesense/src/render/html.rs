use crate::view::{DashboardView, ResultRow, ViewBody, COLUMNS, SUBTITLE, TITLE};

/// Standalone HTML page for a dashboard snapshot
pub fn render(view: &DashboardView) -> String {
    let stats = &view.stats;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let error_html = view
        .error_banner()
        .map(|banner| format!(r#"<div class="error-message">{}</div>"#, html_escape(&banner)))
        .unwrap_or_default();

    let results_html = match &view.body {
        ViewBody::Loading => r#"<div class="loading">Loading test results...</div>"#.to_string(),
        ViewBody::Table(rows) => table_html(rows),
        other => format!(
            r#"<div class="no-results">{}</div>"#,
            html_escape(other.message().unwrap_or_default())
        ),
    };

    let search_html = if view.search_term.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span>Search: <strong>{}</strong></span>"#,
            html_escape(&view.search_term)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>FlakeSense - Test Results</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
            --purple: #8b5cf6;
        }}

        * {{ margin: 0; padding: 0; box-sizing: border-box; }}

        body {{
            font-family: 'Inter', system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}

        .container {{ max-width: 1200px; margin: 0 auto; }}

        header {{ margin-bottom: 2rem; }}
        header h1 {{ font-size: 2.25rem; font-weight: 800; }}
        header p {{ color: var(--text-secondary); }}

        .controls {{ display: flex; gap: 1rem; margin-bottom: 1.5rem; }}
        .controls button {{
            padding: 0.6rem 1.2rem;
            border-radius: 0.5rem;
            border: 1px solid var(--border);
            background: var(--bg-secondary);
            color: var(--text-primary);
            font-weight: 600;
        }}
        .controls button:disabled {{ opacity: 0.5; }}

        .error-message {{
            background: rgba(239, 68, 68, 0.1);
            border: 1px solid rgba(239, 68, 68, 0.2);
            color: #fca5a5;
            border-radius: 0.5rem;
            padding: 0.75rem;
            margin-bottom: 1.5rem;
        }}

        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            padding: 1.25rem;
            border-radius: 1rem;
        }}
        .stat-value {{ font-size: 2rem; font-weight: 800; }}
        .stat-label {{
            color: var(--text-secondary);
            font-size: 0.8rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
        }}
        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.failed .stat-value {{ color: var(--red); }}
        .stat.flaky .stat-value {{ color: var(--yellow); }}

        .progress-bar {{
            background: var(--bg-secondary);
            height: 12px;
            border-radius: 6px;
            overflow: hidden;
            border: 1px solid var(--border);
            margin-bottom: 2rem;
        }}
        .progress-fill {{ height: 100%; background: linear-gradient(90deg, var(--green), #34d399); }}

        .filters {{ color: var(--text-secondary); display: flex; gap: 2rem; margin-bottom: 1rem; }}

        .results-table {{ width: 100%; border-collapse: collapse; }}
        .results-table th, .results-table td {{
            text-align: left;
            padding: 0.6rem 0.75rem;
            border-bottom: 1px solid var(--border);
            vertical-align: top;
        }}
        .results-table th {{ color: var(--text-secondary); font-size: 0.8rem; text-transform: uppercase; }}
        .result-row.fail {{ background: rgba(239, 68, 68, 0.05); }}
        .status.pass {{ color: var(--green); }}
        .status.fail {{ color: var(--red); }}
        .type.flaky {{ color: var(--yellow); }}
        .type.infra-issue {{ color: var(--blue); }}
        .type.real-bug {{ color: var(--red); }}
        .log {{ font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; }}
        .timestamp {{ color: var(--text-secondary); white-space: nowrap; }}

        .loading, .no-results {{ color: var(--text-secondary); padding: 2rem 0; text-align: center; }}

        .meta {{
            margin-top: 3rem;
            padding-top: 1.5rem;
            border-top: 1px solid var(--border);
            color: var(--text-secondary);
            font-size: 0.85rem;
            text-align: center;
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
            <p>{subtitle}</p>
        </header>

        <div class="controls">
            <button class="run-button"{run_disabled}>{run_label}</button>
            <button class="refresh-button"{refresh_disabled}>{refresh_label}</button>
        </div>

        {error_html}

        <div class="summary">
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Total</div></div>
            <div class="stat passed"><div class="stat-value">{passed}</div><div class="stat-label">Passed</div></div>
            <div class="stat failed"><div class="stat-value">{failed}</div><div class="stat-label">Failed</div></div>
            <div class="stat flaky"><div class="stat-value">{flaky}</div><div class="stat-label">Flaky</div></div>
            <div class="stat"><div class="stat-value">{pass_rate}%</div><div class="stat-label">Pass Rate</div></div>
        </div>

        <div class="progress-bar">
            <div class="progress-fill" style="width: {pass_rate}%"></div>
        </div>

        <div class="results-section">
            <h2>Test Results</h2>
            <div class="filters">
                <span>Filter: <strong>{filter}</strong></span>
                {search_html}
            </div>
            {results_html}
        </div>

        <div class="meta">Generated: {generated_at}</div>
    </div>
</body>
</html>"#,
        title = TITLE,
        subtitle = SUBTITLE,
        run_disabled = disabled_attr(view.controls.run.enabled),
        run_label = view.controls.run.label,
        refresh_disabled = disabled_attr(view.controls.refresh.enabled),
        refresh_label = view.controls.refresh.label,
        error_html = error_html,
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed,
        flaky = stats.flaky,
        pass_rate = stats.pass_rate,
        filter = view.filter,
        search_html = search_html,
        results_html = results_html,
        generated_at = generated_at,
    )
}

fn table_html(rows: &[ResultRow]) -> String {
    let header: String = COLUMNS
        .iter()
        .map(|column| format!("<th>{}</th>", column))
        .collect();

    let mut body = String::new();
    for row in rows {
        let status_class = row.status.as_str().to_lowercase();
        body.push_str(&format!(
            r#"
                    <tr class="result-row {status_class}">
                        <td class="test-name">{name}</td>
                        <td class="status {status_class}">{status}</td>
                        <td class="type {kind_class}">{kind}</td>
                        <td class="flaky">{flaky}</td>
                        <td class="log">{log}</td>
                        <td class="timestamp">{timestamp}</td>
                    </tr>"#,
            status_class = status_class,
            name = html_escape(&row.name),
            status = html_escape(&row.status_label),
            kind_class = html_escape(&row.kind_class()),
            kind = html_escape(&row.kind_label),
            flaky = row.flaky_label,
            log = html_escape(&row.log_label),
            timestamp = html_escape(&row.timestamp_label),
        ));
    }

    format!(
        r#"<div class="results-table-container">
                <table class="results-table">
                    <thead><tr>{}</tr></thead>
                    <tbody>{}
                    </tbody>
                </table>
            </div>"#,
        header, body
    )
}

fn disabled_attr(enabled: bool) -> &'static str {
    if enabled {
        ""
    } else {
        " disabled"
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
