use crate::models::{ForecastPoint, Summary};

/// Divisor for the monthly average. The forecast horizon is assumed to be a
/// full year no matter how many months the view actually holds.
pub const FORECAST_HORIZON_MONTHS: f64 = 12.0;

pub fn summarize(forecast: &[ForecastPoint]) -> Summary {
    if forecast.is_empty() {
        return Summary::default();
    }

    let mut summary = Summary::default();
    for point in forecast {
        summary.total_forecast += point.forecast_mean.unwrap_or_default();
        summary.total_min += point.forecast_min.unwrap_or_default();
        summary.total_max += point.forecast_max.unwrap_or_default();
    }
    summary.monthly_average = summary.total_forecast / FORECAST_HORIZON_MONTHS;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{resolve, Selection};
    use crate::models::{Dataset, ForecastRecord};
    use chrono::NaiveDate;

    #[test]
    fn empty_view_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_forecast, 0.0);
        assert_eq!(summary.total_min, 0.0);
        assert_eq!(summary.total_max, 0.0);
        assert_eq!(summary.monthly_average, 0.0);
    }

    #[test]
    fn twelve_months_of_one_hundred() {
        let mut dataset = Dataset::default();
        for month in 1..=12 {
            dataset.forecasts.push(ForecastRecord {
                forecast_date: NaiveDate::from_ymd_opt(2025, month, 1).unwrap(),
                product: "P1".to_string(),
                client: "Cliente 1".to_string(),
                cluster: Some(1),
                forecast_mean: Some(100.0),
                forecast_min: Some(80.0),
                forecast_max: Some(120.0),
            });
        }

        let view = resolve(&dataset, &Selection::All, &Selection::All);
        let summary = summarize(&view.forecast);
        assert_eq!(summary.total_forecast, 1200.0);
        assert_eq!(summary.total_min, 960.0);
        assert_eq!(summary.total_max, 1440.0);
        assert_eq!(summary.monthly_average, 100.0);
    }

    #[test]
    fn short_horizon_still_divides_by_twelve() {
        let point = ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            forecast_mean: Some(120.0),
            forecast_min: Some(100.0),
            forecast_max: Some(140.0),
        };
        assert_eq!(summarize(&[point]).monthly_average, 10.0);
    }

    #[test]
    fn absent_months_add_nothing() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let present = ForecastPoint {
            date,
            forecast_mean: Some(60.0),
            forecast_min: Some(48.0),
            forecast_max: Some(72.0),
        };
        let absent = ForecastPoint {
            date: date + chrono::Months::new(1),
            forecast_mean: None,
            forecast_min: None,
            forecast_max: None,
        };

        let summary = summarize(&[present, absent]);
        assert_eq!(summary.total_forecast, 60.0);
        assert_eq!(summary.total_min, 48.0);
        assert_eq!(summary.total_max, 72.0);
        assert_eq!(summary.monthly_average, 5.0);
    }
}
