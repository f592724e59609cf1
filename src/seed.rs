//! Synthetic demo data for running the dashboard without an upstream
//! forecasting pipeline.

use crate::models::{ForecastRecord, HistoricalRecord};
use chrono::{Months, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const PRODUCTS: [&str; 2] = [
    "ANALGESIC + ANTIPYRETIC TABLETS 1",
    "ANTIBIOTIC INJECTABLE SOLUTION 2",
];
pub const CLIENTS: [&str; 2] = ["Client 1", "Client 2"];

const HISTORY_MONTHS: u32 = 32;
const HORIZON_MONTHS: u32 = 12;
const GROWTH: f64 = 1.05;

pub struct SyntheticData {
    pub historical: Vec<HistoricalRecord>,
    pub forecasts: Vec<ForecastRecord>,
}

pub fn generate(seed: Option<u64>) -> SyntheticData {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Jan 2023 through Aug 2025, then twelve months from Sep 2025.
    let history_start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let history: Vec<NaiveDate> = month_range(history_start, HISTORY_MONTHS);
    let horizon_start = history_start + Months::new(HISTORY_MONTHS);
    let horizon: Vec<NaiveDate> = month_range(horizon_start, HORIZON_MONTHS);

    let mut historical = Vec::with_capacity(PRODUCTS.len() * CLIENTS.len() * history.len());
    let mut forecasts = Vec::with_capacity(PRODUCTS.len() * CLIENTS.len() * horizon.len());

    for product in PRODUCTS {
        for client in CLIENTS {
            let base = f64::from(rng.gen_range(50_000i32..150_000));

            for &date in &history {
                let noise = f64::from(rng.gen_range(-10_000i32..10_000));
                historical.push(HistoricalRecord {
                    date,
                    product: product.to_string(),
                    client: client.to_string(),
                    quantity: Some(base + noise),
                });
            }

            for &forecast_date in &horizon {
                let mean = base * GROWTH;
                forecasts.push(ForecastRecord {
                    forecast_date,
                    product: product.to_string(),
                    client: client.to_string(),
                    cluster: Some(rng.gen_range(0..4)),
                    forecast_mean: Some(mean),
                    forecast_min: Some(mean * 0.8),
                    forecast_max: Some(mean * 1.2),
                });
            }
        }
    }

    SyntheticData {
        historical,
        forecasts,
    }
}

fn month_range(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count).map(|offset| start + Months::new(offset)).collect()
}
