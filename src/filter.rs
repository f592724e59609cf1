//! Resolution of the (client, product) filter pair into the views the
//! dashboard draws.
//!
//! Each dimension is either pinned to one value or left as a wildcard. The
//! pair collapses into a [`ViewMode`] once; that mode supplies the single row
//! predicate used against both tables, and every mode groups by date.

use crate::models::{
    ClusterInfo, Dataset, ForecastPoint, ForecastRecord, HistoricalPoint, HistoricalRecord,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

pub const ALL_CLIENTS_LABEL: &str = "All clients (global)";
pub const ALL_PRODUCTS_LABEL: &str = "All products (total)";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Specific(String),
}

impl Selection {
    /// Missing, blank and wildcard-label values all mean "every value".
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Selection::All,
            Some(v) if v == ALL_CLIENTS_LABEL || v == ALL_PRODUCTS_LABEL => Selection::All,
            Some(v) => Selection::Specific(v.to_string()),
        }
    }

    pub fn as_specific(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Specific(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode<'a> {
    Global,
    Product(&'a str),
    Client(&'a str),
    Pair { client: &'a str, product: &'a str },
}

impl<'a> ViewMode<'a> {
    pub fn from_selections(client: &'a Selection, product: &'a Selection) -> Self {
        match (client.as_specific(), product.as_specific()) {
            (None, None) => ViewMode::Global,
            (None, Some(product)) => ViewMode::Product(product),
            (Some(client), None) => ViewMode::Client(client),
            (Some(client), Some(product)) => ViewMode::Pair { client, product },
        }
    }

    pub fn matches(&self, client: &str, product: &str) -> bool {
        match *self {
            ViewMode::Global => true,
            ViewMode::Product(p) => p == product,
            ViewMode::Client(c) => c == client,
            ViewMode::Pair {
                client: c,
                product: p,
            } => c == client && p == product,
        }
    }

    pub fn context_label(&self) -> String {
        match *self {
            ViewMode::Global => "Global view: whole company".to_string(),
            ViewMode::Product(product) => format!("Global: {product}"),
            ViewMode::Client(client) => format!("Client total: {client}"),
            ViewMode::Pair { client, product } => format!("{client} | {product}"),
        }
    }

    /// Only a pinned product gives a meaningful cluster; aggregating across
    /// products yields a mix.
    fn cluster(&self, forecasts: &[ForecastRecord]) -> ClusterInfo {
        match self {
            ViewMode::Global => ClusterInfo::GlobalMix,
            ViewMode::Client(_) => ClusterInfo::ClientMix,
            ViewMode::Product(_) | ViewMode::Pair { .. } => forecasts
                .iter()
                .find(|row| self.matches(&row.client, &row.product))
                .and_then(|row| row.cluster)
                .map_or(ClusterInfo::Unavailable, ClusterInfo::Cluster),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedView {
    pub context: String,
    pub cluster: ClusterInfo,
    pub forecast: Vec<ForecastPoint>,
    pub historical: Vec<HistoricalPoint>,
}

impl ResolvedView {
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty() && self.historical.is_empty()
    }
}

pub fn resolve(dataset: &Dataset, client: &Selection, product: &Selection) -> ResolvedView {
    let mode = ViewMode::from_selections(client, product);
    ResolvedView {
        context: mode.context_label(),
        cluster: mode.cluster(&dataset.forecasts),
        forecast: forecast_view(&dataset.forecasts, mode),
        historical: historical_view(&dataset.historical, mode),
    }
}

#[derive(Default)]
struct BandSum {
    mean: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

/// NULLs are skipped; the sum stays `None` until a value is seen.
fn accumulate(total: &mut Option<f64>, value: Option<f64>) {
    if let Some(value) = value {
        *total = Some(total.unwrap_or_default() + value);
    }
}

fn forecast_view(rows: &[ForecastRecord], mode: ViewMode<'_>) -> Vec<ForecastPoint> {
    let mut grouped: BTreeMap<NaiveDate, BandSum> = BTreeMap::new();
    for row in rows.iter().filter(|row| mode.matches(&row.client, &row.product)) {
        let entry = grouped.entry(row.forecast_date).or_default();
        accumulate(&mut entry.mean, row.forecast_mean);
        accumulate(&mut entry.min, row.forecast_min);
        accumulate(&mut entry.max, row.forecast_max);
    }

    grouped
        .into_iter()
        .map(|(date, sum)| ForecastPoint {
            date,
            forecast_mean: sum.mean,
            forecast_min: sum.min,
            forecast_max: sum.max,
        })
        .collect()
}

fn historical_view(rows: &[HistoricalRecord], mode: ViewMode<'_>) -> Vec<HistoricalPoint> {
    let mut grouped: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for row in rows.iter().filter(|row| mode.matches(&row.client, &row.product)) {
        accumulate(grouped.entry(row.date).or_default(), row.quantity);
    }

    grouped
        .into_iter()
        .map(|(date, quantity)| HistoricalPoint { date, quantity })
        .collect()
}

pub fn client_options(dataset: &Dataset) -> Vec<String> {
    dataset
        .forecasts
        .iter()
        .map(|row| row.client.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Products observed for the selected client, or every product when the
/// client is the wildcard.
pub fn product_options(dataset: &Dataset, client: &Selection) -> Vec<String> {
    dataset
        .forecasts
        .iter()
        .filter(|row| client.as_specific().is_none_or(|c| c == row.client))
        .map(|row| row.product.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
