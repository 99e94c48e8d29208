use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Source Rows ──

/// One latency measurement as stored, timestamp normalized to UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyRecord {
    pub provider: String,
    pub latency: f64,
    pub created_at: DateTime<Utc>,
}

/// A record after localization into the report zone. The zone-aware
/// timestamp type is what the filter and presentation layers operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord {
    pub provider: String,
    pub latency: f64,
    pub created_at: DateTime<Tz>,
}

// ── Report Query ──

/// Window filter for the report. Absent components default to the
/// corresponding component of the observed min (start) / max (end).
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}

// ── Report Payload ──

/// count/mean/min/max plus interpolated percentiles for one latency series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricBlock {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// One row of the grouped summary table. `std` is the sample standard
/// deviation, undefined (null) for single-row groups.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderSummary {
    pub provider: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Percentile breakdown backing the grouped bar chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PercentileSet {
    pub provider: String,
    pub count: usize,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// One filtered row as rendered in charts and the detailed table.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPoint {
    pub provider: String,
    pub latency: f64,
    /// Localized timestamp, RFC 3339 with offset.
    pub created_at: DateTime<Tz>,
    /// Chart axis label, `DD/MM HH:MM:SS` in the report zone.
    pub label: String,
}

/// Resolved window or observed bounds, localized.
#[derive(Debug, Clone, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

#[derive(Debug, Serialize)]
pub struct LatencyReport {
    pub empty: bool,
    pub timezone: String,
    pub window: ReportWindow,
    pub bounds: ReportWindow,
    pub overall: MetricBlock,
    /// Per-provider metric blocks in provider name order.
    pub providers: BTreeMap<String, MetricBlock>,
    pub summary: Vec<ProviderSummary>,
    pub percentiles: Vec<PercentileSet>,
    /// Timestamp ascending.
    pub requests: Vec<RequestPoint>,
    /// Timestamp descending.
    pub records: Vec<RequestPoint>,
}

/// 200 response for a window that matched no rows. `bounds` and `window`
/// are absent when the table itself is empty.
#[derive(Debug, Serialize)]
pub struct NoDataNotice {
    pub empty: bool,
    pub notice: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<ReportWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ReportWindow>,
}

/// Either a full report or the no-data notice, both 200.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportResponse {
    Ready(Box<LatencyReport>),
    NoData(NoDataNotice),
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub db_ok: bool,
    pub records: i64,
}
