//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use super::AppState;
use super::types::{
    ConsumptionResponse, ErrorResponse, ReportResponse, SummaryQuery, SummaryResponse, TablePage,
    TableQuery,
};
use crate::error::Error;
use crate::model::{DashboardOverview, SummaryPeriod};
use crate::report::{ReportConfig, ReportFormat};
use crate::source::DataSource;
use crate::stats::{ConsumptionStats, ReportSummary, StatusCounts, prediction_accuracy};
use crate::table::normalize::{normalize_consumption, normalize_ideal_values, normalize_report};
use crate::table::{
    CategoryFilter, ConsumptionRow, IdealValueRow, SortDirection, SortKey, TableRow,
};
use crate::view::TableView;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a pipeline error onto a status code and JSON body.
///
/// Data-source failures are 502, unknown machines 404, bad request
/// parameters 400.
fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::Fetch { .. } => StatusCode::BAD_GATEWAY,
        Error::UnknownMachine(_) => StatusCode::NOT_FOUND,
        Error::InvalidDateRange { .. }
        | Error::DateRangeTooLong { .. }
        | Error::InvalidSortField(_)
        | Error::InvalidSortDirection(_)
        | Error::InvalidPageSize(_)
        | Error::PageSizeNotOffered { .. }
        | Error::InvalidValue { .. } => StatusCode::BAD_REQUEST,
        Error::ExportDirNotFound(_) | Error::Io(_) | Error::Csv(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        log::warn!("request failed: {err}");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
        }),
    )
}

/// Applies search, category, sort and page parameters to `view`.
fn apply_query<R: TableRow>(view: &mut TableView<R>, query: &TableQuery) -> Result<(), Error> {
    if let Some(field) = &query.sort {
        view.set_sort(SortKey::ascending(field.parse::<R::Field>()?));
    }
    if let Some(direction) = &query.direction {
        let field = view.sort().field;
        view.set_sort(SortKey::new(field, direction.parse::<SortDirection>()?));
    }
    if let Some(search) = &query.search {
        view.set_search(search.as_str());
    }
    if let Some(category) = &query.category {
        view.set_category(CategoryFilter::parse(category));
    }
    if let Some(page) = query.page {
        view.go_to_page(page);
    }
    Ok(())
}

fn table_page<R: TableRow>(view: &TableView<R>) -> TablePage<R> {
    TablePage {
        rows: view.visible(),
        window: view.window(),
        direction: view.sort().direction,
    }
}

/// `GET /machines` → 200 + machine ids
pub async fn list_machines<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<String>>, ApiError>
where
    S: DataSource + Send + Sync,
{
    state.source.fetch_machine_ids().await.map(Json).map_err(api_error)
}

/// `GET /machines/{id}/consumption` → 200 + raw series and statistics
pub async fn machine_consumption<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ConsumptionResponse>, ApiError>
where
    S: DataSource + Send + Sync,
{
    let series = state
        .source
        .fetch_machine_consumption(&id)
        .await
        .map_err(api_error)?;
    let stats = ConsumptionStats::from_series(&series);
    Ok(Json(ConsumptionResponse {
        machine_id: id,
        series,
        stats,
    }))
}

/// `GET /machines/{id}/table?search=&category=&sort=&direction=&page=&size=`
///
/// Category is `actual` or `prediction`. Defaults to newest dates first.
pub async fn consumption_table<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TablePage<ConsumptionRow>>, ApiError>
where
    S: DataSource + Send + Sync,
{
    let series = state
        .source
        .fetch_machine_consumption(&id)
        .await
        .map_err(api_error)?;
    let rows = normalize_consumption(&series.past, &series.prediction);
    let size = state.table.resolve_page_size(query.size).map_err(api_error)?;
    let mut view = TableView::consumption(rows, size).map_err(api_error)?;
    apply_query(&mut view, &query).map_err(api_error)?;
    Ok(Json(table_page(&view)))
}

/// `GET /ideal-values?search=&category=&sort=&direction=`
///
/// Returns every matching row in sort order; this table is not paginated.
pub async fn ideal_values<S>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<IdealValueRow>>, ApiError>
where
    S: DataSource + Send + Sync,
{
    let records = state.source.fetch_ideal_values().await.map_err(api_error)?;
    let mut view = TableView::ideal_values(normalize_ideal_values(&records), state.table.page_size)
        .map_err(api_error)?;
    apply_query(&mut view, &query).map_err(api_error)?;
    Ok(Json(view.sorted()))
}

/// `GET /ideal-values/summary` → machine counts per status
pub async fn ideal_value_summary<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<StatusCounts>, ApiError>
where
    S: DataSource + Send + Sync,
{
    let records = state.source.fetch_ideal_values().await.map_err(api_error)?;
    Ok(Json(StatusCounts::from_records(&records)))
}

/// `GET /summary?period=week|month|year`
pub async fn summary<S>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError>
where
    S: DataSource + Send + Sync,
{
    let period = query
        .period
        .as_deref()
        .map(str::parse::<SummaryPeriod>)
        .transpose()
        .map_err(api_error)?
        .unwrap_or_default();
    let stats = state
        .source
        .fetch_summary_stats(Some(period))
        .await
        .map_err(api_error)?;
    let accuracy = prediction_accuracy(&stats);
    Ok(Json(SummaryResponse {
        period,
        stats,
        accuracy,
    }))
}

/// `GET /overview`
pub async fn overview<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DashboardOverview>, ApiError>
where
    S: DataSource + Send + Sync,
{
    state.source.fetch_overview().await.map(Json).map_err(api_error)
}

/// `POST /reports` with a JSON `ReportConfig` → rows in date order plus totals
pub async fn generate_report<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(config): Json<ReportConfig>,
) -> Result<Json<ReportResponse>, ApiError>
where
    S: DataSource + Send + Sync,
{
    config.validate().map_err(api_error)?;
    let records = state
        .source
        .fetch_report_data(&config)
        .await
        .map_err(api_error)?;
    let summary = ReportSummary::from_records(&records);
    let view =
        TableView::report(normalize_report(&records), state.table.page_size).map_err(api_error)?;
    Ok(Json(ReportResponse {
        title: config.category.title(),
        rows: view.sorted(),
        summary,
    }))
}

/// `POST /reports/csv` with a JSON `ReportConfig` → `text/csv` attachment
pub async fn download_report_csv<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(config): Json<ReportConfig>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DataSource + Send + Sync,
{
    config.validate().map_err(api_error)?;
    let receipt = state
        .source
        .download_report(&config, ReportFormat::Csv)
        .await
        .map_err(api_error)?;
    let disposition = format!("attachment; filename=\"{}\"", receipt.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        receipt.payload.unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::TableConfig;
    use crate::source::MockDataSource;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 12).unwrap()
    }

    fn make_test_state() -> Arc<AppState<MockDataSource>> {
        Arc::new(AppState {
            source: MockDataSource::new(42, today()),
            table: TableConfig::default(),
        })
    }

    fn make_failing_state() -> Arc<AppState<MockDataSource>> {
        Arc::new(AppState {
            source: MockDataSource::new(42, today()).with_outage("connection refused"),
            table: TableConfig::default(),
        })
    }

    async fn get_json(state: Arc<AppState<MockDataSource>>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(state);
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn report_body() -> String {
        serde_json::json!({
            "machine": { "scope": "one", "id": "M001" },
            "start_date": "2025-05-01",
            "end_date": "2025-05-10",
            "granularity": "daily",
            "category": "consumption",
        })
        .to_string()
    }

    #[tokio::test]
    async fn machines_returns_ids() {
        let (status, json) = get_json(make_test_state(), "/machines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(5));
        assert_eq!(json[0], "M001");
    }

    #[tokio::test]
    async fn consumption_table_pages_newest_first() {
        let (status, json) = get_json(make_test_state(), "/machines/M001/table?size=5").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(json["window"]["total"], 36);
        assert_eq!(json["window"]["total_pages"], 8);
        assert_eq!(json["direction"], "descending");
        // predictions lie after today, so they lead a date-descending table
        assert_eq!(rows[0]["is_prediction"], true);
    }

    #[tokio::test]
    async fn consumption_table_filters_by_category() {
        let (status, json) = get_json(
            make_test_state(),
            "/machines/M002/table?category=prediction&sort=date&direction=asc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["window"]["total"], 6);
        assert_eq!(json["direction"], "ascending");
    }

    #[tokio::test]
    async fn bad_sort_field_returns_400() {
        let (status, json) = get_json(make_test_state(), "/machines/M001/table?sort=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn unknown_machine_returns_404() {
        let (status, _) = get_json(make_test_state(), "/machines/M404/consumption").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn outage_returns_502_with_message() {
        let (status, json) = get_json(make_failing_state(), "/ideal-values").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "Failed to load ideal values. Please try again later.");
    }

    #[tokio::test]
    async fn ideal_values_search_matches_id_or_name() {
        let (status, json) = get_json(make_test_state(), "/ideal-values?search=pump").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["machine_id"], "M003");

        let (_, json) = get_json(
            make_test_state(),
            "/ideal-values?category=optimal&sort=idealConsumption&direction=desc",
        )
        .await;
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["machine_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["M004", "M001", "M005"]);
    }

    #[tokio::test]
    async fn summary_rejects_unknown_period() {
        let (status, _) = get_json(make_test_state(), "/summary?period=decade").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = get_json(make_test_state(), "/summary?period=week").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stats"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn overview_returns_totals() {
        let (status, json) = get_json(make_test_state(), "/overview").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_machines"], 5);
    }

    #[tokio::test]
    async fn report_returns_rows_and_summary() {
        let app = router(make_test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/reports")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(report_body()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["title"], "Consumption Report");
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(10));
        assert!(json["summary"]["total_consumption"].as_f64().unwrap() > 1000.0);
    }

    #[tokio::test]
    async fn report_csv_is_an_attachment() {
        let app = router(make_test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/reports/csv")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(report_body()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert_eq!(
            disposition,
            "attachment; filename=\"consumption_report_2025-05-12.csv\""
        );

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Date,Machine,Consumption (kWh),Ideal (kWh),Difference (%)"));
        assert_eq!(text.lines().count(), 11);
    }

    #[tokio::test]
    async fn page_size_outside_offered_list_returns_400() {
        let (status, json) = get_json(make_test_state(), "/machines/M001/table?size=7").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some_and(|e| e.contains("offered sizes")));

        let (status, json) = get_json(make_test_state(), "/machines/M001/table?size=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(20));
    }

    #[tokio::test]
    async fn ideal_value_summary_counts_statuses() {
        let (status, json) = get_json(make_test_state(), "/ideal-values/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 5);
        assert_eq!(json["optimal"], 3);
        assert_eq!(json["warning"], 1);
        assert_eq!(json["critical"], 1);
    }

    #[tokio::test]
    async fn reversed_report_range_returns_400() {
        let body = serde_json::json!({
            "machine": { "scope": "all" },
            "start_date": "2025-05-10",
            "end_date": "2025-05-01",
        })
        .to_string();
        let app = router(make_test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/reports")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
