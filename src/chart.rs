//! Server-side SVG rendering of the history line and the forecast band.

use crate::models::{ForecastPoint, HistoricalPoint};
use crate::ui::{escape_html, format_thousands};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 340.0;
const PADDING_LEFT: f64 = 78.0;
const PADDING_RIGHT: f64 = 24.0;
const TOP: f64 = 48.0;
const PADDING_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 4;
const MAX_X_LABELS: usize = 8;

pub const NO_DATA_NOTICE: &str =
    r#"<p class="no-data">No data to display for this selection.</p>"#;

struct Scale {
    first_day: f64,
    day_span: f64,
    min: f64,
    range: f64,
}

impl Scale {
    fn new(dates: &[NaiveDate], values: &[f64]) -> Self {
        let first_day = dates.iter().map(day_number).fold(f64::INFINITY, f64::min);
        let last_day = dates.iter().map(day_number).fold(f64::NEG_INFINITY, f64::max);

        let mut min = values.iter().copied().fold(0.0_f64, f64::min);
        let mut max = values.iter().copied().fold(0.0_f64, f64::max);
        if min == max {
            min -= 1.0;
            max += 1.0;
        }

        Self {
            first_day,
            day_span: last_day - first_day,
            min,
            range: max - min,
        }
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let plot = WIDTH - PADDING_LEFT - PADDING_RIGHT;
        if self.day_span == 0.0 {
            return PADDING_LEFT + plot / 2.0;
        }
        PADDING_LEFT + (day_number(&date) - self.first_day) / self.day_span * plot
    }

    fn y(&self, value: f64) -> f64 {
        let plot = HEIGHT - TOP - PADDING_BOTTOM;
        HEIGHT - PADDING_BOTTOM - (value - self.min) / self.range * plot
    }
}

fn day_number(date: &NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// A `None` breaks the line; the next point starts a new subpath.
fn polyline(points: impl Iterator<Item = Option<(f64, f64)>>) -> String {
    let mut path = String::new();
    let mut pen_down = false;
    for point in points {
        match point {
            Some((x, y)) => {
                let command = if pen_down { 'L' } else { 'M' };
                let _ = write!(path, "{command} {x:.2} {y:.2} ");
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    path.trim_end().to_string()
}

/// One closed shape per run of months that have both bounds.
fn band_path(forecast: &[ForecastPoint], scale: &Scale) -> String {
    let mut path = String::new();
    let runs = forecast.split(|p| p.forecast_min.is_none() || p.forecast_max.is_none());
    for run in runs.filter(|run| !run.is_empty()) {
        let upper = run
            .iter()
            .filter_map(|p| p.forecast_max.map(|v| (scale.x(p.date), scale.y(v))));
        let lower = run
            .iter()
            .rev()
            .filter_map(|p| p.forecast_min.map(|v| (scale.x(p.date), scale.y(v))));
        let _ = write!(path, "{} Z ", polyline(upper.chain(lower).map(Some)));
    }
    path.trim_end().to_string()
}

/// Returns the SVG markup, or [`NO_DATA_NOTICE`] when both series are empty.
pub fn render_chart(
    historical: &[HistoricalPoint],
    forecast: &[ForecastPoint],
    title: &str,
) -> String {
    if historical.is_empty() && forecast.is_empty() {
        return NO_DATA_NOTICE.to_string();
    }

    let mut dates: Vec<NaiveDate> = historical
        .iter()
        .map(|p| p.date)
        .chain(forecast.iter().map(|p| p.date))
        .collect();
    dates.sort();
    dates.dedup();

    let values: Vec<f64> = historical
        .iter()
        .map(|p| p.quantity)
        .chain(
            forecast
                .iter()
                .flat_map(|p| [p.forecast_mean, p.forecast_min, p.forecast_max]),
        )
        .flatten()
        .collect();
    let scale = Scale::new(&dates, &values);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Historical trend and forecast">"#
    );
    let _ = write!(
        svg,
        r#"<text class="chart-title" x="{PADDING_LEFT}" y="24">Analysis: {}</text>"#,
        escape_html(title)
    );

    for i in 0..=Y_TICKS {
        let value = scale.min + scale.range * i as f64 / Y_TICKS as f64;
        let y = scale.y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PADDING_LEFT}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" /><text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            WIDTH - PADDING_RIGHT,
            PADDING_LEFT - 10.0,
            y + 4.0,
            format_thousands(value)
        );
    }

    let band = band_path(forecast, &scale);
    if !band.is_empty() {
        let _ = write!(
            svg,
            r#"<path class="chart-band" d="{band}"><title>Confidence range</title></path>"#
        );
    }

    if !historical.is_empty() {
        let _ = write!(
            svg,
            r#"<path class="chart-history" d="{}"><title>Actual history</title></path>"#,
            polyline(
                historical
                    .iter()
                    .map(|p| p.quantity.map(|v| (scale.x(p.date), scale.y(v))))
            )
        );
    }

    if !forecast.is_empty() {
        let _ = write!(
            svg,
            r#"<path class="chart-forecast" d="{}"><title>Ensemble forecast</title></path>"#,
            polyline(
                forecast
                    .iter()
                    .map(|p| p.forecast_mean.map(|v| (scale.x(p.date), scale.y(v))))
            )
        );
        for point in forecast {
            let Some(mean) = point.forecast_mean else {
                continue;
            };
            let _ = write!(
                svg,
                r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="3.5"><title>{}: {}</title></circle>"#,
                scale.x(point.date),
                scale.y(mean),
                point.date.format("%Y-%m"),
                format_thousands(mean)
            );
        }
    }

    let label_every = dates.len().div_ceil(MAX_X_LABELS).max(1);
    for date in dates.iter().step_by(label_every) {
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{:04}-{:02}</text>"#,
            scale.x(*date),
            HEIGHT - PADDING_BOTTOM + 20.0,
            date.year(),
            date.month()
        );
    }

    svg.push_str("</svg>");
    svg
}
