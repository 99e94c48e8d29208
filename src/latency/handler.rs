use crate::error::AppResult;
use crate::latency::types::{
    HealthResponse, LatencyReport, NoDataNotice, ReportParams, ReportResponse, RequestPoint,
};
use crate::latency::{filter, loader, stats, tz, LatencyState};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use std::sync::Arc;

const NO_DATA_NOTICE: &str = "no latency data found for the selected window";

/// GET /v1/latency/report - run the full pipeline for the requested window.
pub async fn report(
    State(state): State<Arc<LatencyState>>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<ReportResponse>> {
    let records = loader::load_records(&state).await?;
    let local = tz::localize(&records, state.tz);

    let Some(bounds) = filter::observed_bounds(&local) else {
        return Ok(Json(ReportResponse::NoData(NoDataNotice {
            empty: true,
            notice: NO_DATA_NOTICE.to_string(),
            timezone: state.tz.to_string(),
            window: None,
            bounds: None,
        })));
    };

    let window = filter::resolve_window(&params, &bounds, state.tz)?;
    let filtered = filter::filter_window(&local, &window);
    if filtered.is_empty() {
        return Ok(Json(ReportResponse::NoData(NoDataNotice {
            empty: true,
            notice: NO_DATA_NOTICE.to_string(),
            timezone: state.tz.to_string(),
            window: Some(window),
            bounds: Some(bounds),
        })));
    }

    let values: Vec<f64> = filtered.iter().map(|r| r.latency).collect();
    let groups = stats::group_by_provider(&filtered);

    let mut requests: Vec<RequestPoint> = filtered
        .iter()
        .map(|r| RequestPoint {
            provider: r.provider.clone(),
            latency: r.latency,
            created_at: r.created_at,
            label: tz::chart_label(&r.created_at),
        })
        .collect();
    requests.sort_by_key(|p| p.created_at);

    let mut records_desc = requests.clone();
    records_desc.reverse();

    tracing::debug!(
        rows = filtered.len(),
        providers = groups.len(),
        "latency report computed"
    );

    let report = LatencyReport {
        empty: false,
        timezone: state.tz.to_string(),
        window,
        bounds,
        overall: stats::describe(&values),
        providers: stats::provider_blocks(&groups),
        summary: stats::provider_summaries(&groups),
        percentiles: stats::provider_percentiles(&groups),
        requests,
        records: records_desc,
    };
    Ok(Json(ReportResponse::Ready(Box::new(report))))
}

/// GET /health - liveness probe with a row count.
pub async fn health(State(state): State<Arc<LatencyState>>) -> Json<HealthResponse> {
    let count = match state.pool.get().await {
        Ok(conn) => conn
            .interact(|conn| {
                conn.query_row("SELECT COUNT(*) FROM llm_latency", [], |row| {
                    row.get::<_, i64>(0)
                })
            })
            .await
            .ok()
            .and_then(|r| r.ok()),
        Err(_) => None,
    };

    Json(HealthResponse {
        status: if count.is_some() { "ok" } else { "degraded" }.to_string(),
        db_ok: count.is_some(),
        records: count.unwrap_or(0),
    })
}

// Dashboard - embedded HTML served at /
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../dashboard.html"))
}
