use crate::errors::AppError;
use crate::filter::{client_options, product_options, resolve, ResolvedView, Selection};
use crate::models::{Dataset, DashboardResponse, FilterQuery, OptionsResponse};
use crate::state::AppState;
use crate::stats::summarize;
use crate::storage;
use crate::ui::{render_dashboard, render_unavailable, DashboardPage};
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::debug;

struct Filters {
    client: Selection,
    product: Selection,
}

impl From<&FilterQuery> for Filters {
    fn from(query: &FilterQuery) -> Self {
        Self {
            client: Selection::from_param(query.client.as_deref()),
            product: Selection::from_param(query.product.as_deref()),
        }
    }
}

async fn load_dataset(state: &AppState) -> Result<Dataset, AppError> {
    storage::load(state.db_path.as_ref().clone())
        .await
        .map_err(AppError::from)
}

fn resolve_filters(dataset: &Dataset, filters: &Filters) -> ResolvedView {
    debug!(client = ?filters.client, product = ?filters.product, "resolving view");
    resolve(dataset, &filters.client, &filters.product)
}

pub async fn index(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Response {
    let dataset = match load_dataset(&state).await {
        Ok(dataset) => dataset,
        Err(err) => return (err.status, Html(render_unavailable(&err.message))).into_response(),
    };

    let filters = Filters::from(&query);
    let view = resolve_filters(&dataset, &filters);
    let summary = summarize(&view.forecast);
    let clients = client_options(&dataset);
    let products = product_options(&dataset, &filters.client);

    Html(render_dashboard(&DashboardPage {
        client: &filters.client,
        product: &filters.product,
        clients: &clients,
        products: &products,
        view: &view,
        summary: &summary,
    }))
    .into_response()
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let dataset = load_dataset(&state).await?;
    let view = resolve_filters(&dataset, &Filters::from(&query));
    let summary = summarize(&view.forecast);

    Ok(Json(DashboardResponse {
        context: view.context,
        cluster: view.cluster,
        summary,
        forecast: view.forecast,
        historical: view.historical,
    }))
}

pub async fn get_options(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<OptionsResponse>, AppError> {
    let dataset = load_dataset(&state).await?;
    let client = Selection::from_param(query.client.as_deref());

    Ok(Json(OptionsResponse {
        clients: client_options(&dataset),
        products: product_options(&dataset, &client),
    }))
}

pub async fn forecast_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, AppError> {
    let dataset = load_dataset(&state).await?;
    let view = resolve_filters(&dataset, &Filters::from(&query));

    let mut writer = csv::Writer::from_writer(Vec::new());
    if view.forecast.is_empty() {
        writer.write_record(["date", "forecast_mean", "forecast_min", "forecast_max"])?;
    }
    for point in &view.forecast {
        writer.serialize(point)?;
    }
    let body = writer
        .into_inner()
        .map_err(|err| AppError::internal(err.into_error()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"forecast.csv\""),
        ],
        body,
    )
        .into_response())
}

pub async fn health() -> &'static str {
    "ok"
}
