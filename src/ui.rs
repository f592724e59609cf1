use crate::chart::render_chart;
use crate::filter::{ResolvedView, Selection, ALL_CLIENTS_LABEL, ALL_PRODUCTS_LABEL};
use crate::models::Summary;
use std::fmt::Write;

pub struct DashboardPage<'a> {
    pub client: &'a Selection,
    pub product: &'a Selection,
    pub clients: &'a [String],
    pub products: &'a [String],
    pub view: &'a ResolvedView,
    pub summary: &'a Summary,
}

pub fn render_dashboard(page: &DashboardPage<'_>) -> String {
    let context = escape_html(&page.view.context);
    DASHBOARD_HTML
        .replace("{{CLIENT_OPTIONS}}", &select_options(ALL_CLIENTS_LABEL, page.clients, page.client))
        .replace("{{PRODUCT_OPTIONS}}", &select_options(ALL_PRODUCTS_LABEL, page.products, page.product))
        .replace("{{CLUSTER}}", &escape_html(&page.view.cluster.to_string()))
        .replace("{{TOTAL}}", &format_thousands(page.summary.total_forecast))
        .replace("{{MIN}}", &format_thousands(page.summary.total_min))
        .replace("{{MAX}}", &format_thousands(page.summary.total_max))
        .replace("{{AVERAGE}}", &format_thousands(page.summary.monthly_average))
        .replace("{{CHART}}", &render_chart(&page.view.historical, &page.view.forecast, &page.view.context))
        .replace("{{TABLE}}", &forecast_table(page))
        .replace("{{CONTEXT}}", &context)
}

pub fn render_unavailable(message: &str) -> String {
    UNAVAILABLE_HTML.replace("{{MESSAGE}}", &escape_html(message))
}

fn select_options(all_label: &str, values: &[String], selected: &Selection) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<option value=""{}>{}</option>"#,
        if *selected == Selection::All { " selected" } else { "" },
        escape_html(all_label)
    );
    for value in values {
        let is_selected = selected.as_specific() == Some(value.as_str());
        let value = escape_html(value);
        let _ = write!(
            html,
            r#"<option value="{value}"{}>{value}</option>"#,
            if is_selected { " selected" } else { "" }
        );
    }
    html
}

fn forecast_table(page: &DashboardPage<'_>) -> String {
    if page.view.forecast.is_empty() {
        return r#"<p class="hint">No forecast rows for this selection.</p>"#.to_string();
    }

    let mut html = String::from(
        "<table><thead><tr><th>Month</th><th>Forecast</th><th>Minimum</th><th>Maximum</th></tr></thead><tbody>",
    );
    for point in &page.view.forecast {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            point.date.format("%Y-%m-%d"),
            format_measure(point.forecast_mean),
            format_measure(point.forecast_min),
            format_measure(point.forecast_max)
        );
    }
    html.push_str("</tbody></table>");

    // The browser encodes the hidden fields, so values go out verbatim.
    let _ = write!(
        html,
        r#"<form method="get" action="/api/forecast.csv" class="download"><input type="hidden" name="client" value="{}" /><input type="hidden" name="product" value="{}" /><button type="submit">Download CSV</button></form>"#,
        escape_html(page.client.as_specific().unwrap_or_default()),
        escape_html(page.product.as_specific().unwrap_or_default())
    );
    html
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            // Braces would otherwise read as template placeholders.
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn format_measure(value: Option<f64>) -> String {
    value.map(format_thousands).unwrap_or_default()
}

/// Rounds to whole units and groups thousands with commas.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Demand Planner</title>
  <style>
    :root {
      --navy: #0e2c4c;
      --navy-dark: #0a1f35;
      --bg: #f5f7f9;
      --accent: #ff7f0e;
      --history: #1f77b4;
      --grid: #e0e0e0;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      grid-template-columns: 280px 1fr;
      background: var(--bg);
      color: var(--navy);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
    }

    aside {
      background: var(--navy);
      border-right: 1px solid var(--navy-dark);
      color: #ffffff;
      padding: 28px 22px;
      display: grid;
      align-content: start;
      gap: 18px;
    }

    aside h2 {
      margin: 0;
    }

    aside hr {
      width: 100%;
      border: none;
      border-top: 1px solid rgba(255, 255, 255, 0.4);
    }

    aside label {
      display: grid;
      gap: 6px;
      font-weight: 600;
    }

    aside select,
    aside button {
      padding: 8px;
      border-radius: 6px;
      border: none;
      font-size: 0.95rem;
    }

    .badge {
      background: rgba(255, 255, 255, 0.1);
      border: 1px solid rgba(255, 255, 255, 0.5);
      border-radius: 6px;
      padding: 10px 12px;
    }

    main {
      padding: 28px 36px;
      display: grid;
      gap: 24px;
      align-content: start;
    }

    h1 {
      margin: 0;
    }

    .kpis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .kpi {
      background: #ffffff;
      border: 1px solid #d1d5db;
      border-radius: 8px;
      padding: 15px;
      box-shadow: 0 2px 5px rgba(0, 0, 0, 0.05);
      display: grid;
      gap: 6px;
    }

    .kpi .label {
      color: #444444;
      font-size: 0.9rem;
    }

    .kpi .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .chart {
      width: 100%;
      height: auto;
      background: #ffffff;
      border-radius: 8px;
    }

    .chart-title {
      font-size: 18px;
      font-weight: 600;
      fill: var(--navy);
    }

    .chart-grid {
      stroke: var(--grid);
    }

    .chart-label {
      fill: var(--navy);
      font-size: 11px;
    }

    .chart-history {
      fill: none;
      stroke: var(--history);
      stroke-width: 2;
    }

    .chart-forecast {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
      stroke-dasharray: 8 6;
    }

    .chart-point {
      fill: var(--accent);
    }

    .chart-band {
      fill: rgba(255, 127, 14, 0.2);
      stroke: none;
    }

    .no-data {
      background: #fff4e5;
      border: 1px solid #f0c36d;
      border-radius: 8px;
      padding: 14px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: #ffffff;
    }

    th,
    td {
      text-align: right;
      padding: 6px 10px;
      border-bottom: 1px solid var(--grid);
    }

    th:first-child,
    td:first-child {
      text-align: left;
    }

    .download {
      margin-top: 12px;
    }

    .hint {
      color: #6f6a65;
    }
  </style>
</head>
<body>
  <aside>
    <h2>Filters</h2>
    <hr />
    <form id="filters" method="get" action="/">
      <label>Select client:
        <select id="client" name="client">{{CLIENT_OPTIONS}}</select>
      </label>
      <label>Select product:
        <select id="product" name="product">{{PRODUCT_OPTIONS}}</select>
      </label>
      <noscript><button type="submit">Apply</button></noscript>
    </form>
    <hr />
    <div class="badge"><strong>Cluster:</strong> {{CLUSTER}}</div>
    <div class="badge"><strong>View:</strong> {{CONTEXT}}</div>
  </aside>

  <main>
    <header>
      <h1>Executive Demand Forecast Dashboard</h1>
    </header>

    <section>
      <h2>Summary: {{CONTEXT}}</h2>
      <div class="kpis">
        <div class="kpi"><span class="label">Total demand (12 months)</span><span class="value">{{TOTAL}} pcs</span></div>
        <div class="kpi"><span class="label">Minimum scenario</span><span class="value">{{MIN}} pcs</span></div>
        <div class="kpi"><span class="label">Maximum scenario</span><span class="value">{{MAX}} pcs</span></div>
        <div class="kpi"><span class="label">Monthly average</span><span class="value">{{AVERAGE}} pcs</span></div>
      </div>
    </section>

    <section>
      <h2>Historical trend and projection</h2>
      {{CHART}}
    </section>

    <section>
      <details>
        <summary>Data table: {{CONTEXT}}</summary>
        {{TABLE}}
      </details>
    </section>
  </main>

  <script>
    const form = document.getElementById('filters');
    const client = document.getElementById('client');
    const product = document.getElementById('product');

    client.addEventListener('change', () => {
      product.value = '';
      form.submit();
    });
    product.addEventListener('change', () => form.submit());
  </script>
</body>
</html>
"#;

const UNAVAILABLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Demand Planner</title>
  <style>
    body {
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      background: #f5f7f9;
      color: #0e2c4c;
      padding: 48px;
    }

    .error {
      background: #fdecea;
      border: 1px solid #f5c2c0;
      border-radius: 8px;
      padding: 16px;
      max-width: 720px;
    }
  </style>
</head>
<body>
  <div class="error">{{MESSAGE}}</div>
</body>
</html>
"#;
