use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub product: String,
    pub client: String,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub forecast_date: NaiveDate,
    pub product: String,
    pub client: String,
    pub cluster: Option<i64>,
    pub forecast_mean: Option<f64>,
    pub forecast_min: Option<f64>,
    pub forecast_max: Option<f64>,
}

/// Both tables as loaded for a single render pass.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub historical: Vec<HistoricalRecord>,
    pub forecasts: Vec<ForecastRecord>,
}

/// A measure is `None` when every row behind it was NULL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast_mean: Option<f64>,
    pub forecast_min: Option<f64>,
    pub forecast_max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Summary {
    pub total_forecast: f64,
    pub total_min: f64,
    pub total_max: f64,
    pub monthly_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClusterInfo {
    Cluster(i64),
    GlobalMix,
    ClientMix,
    Unavailable,
}

impl std::fmt::Display for ClusterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterInfo::Cluster(id) => write!(f, "{id}"),
            ClusterInfo::GlobalMix => f.write_str("Global mix"),
            ClusterInfo::ClientMix => f.write_str("Client mix"),
            ClusterInfo::Unavailable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub client: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub context: String,
    pub cluster: ClusterInfo,
    pub summary: Summary,
    pub forecast: Vec<ForecastPoint>,
    pub historical: Vec<HistoricalPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub clients: Vec<String>,
    pub products: Vec<String>,
}
