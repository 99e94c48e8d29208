use crate::error::{AppError, AppResult};
use crate::latency::types::{LocalRecord, ReportParams, ReportWindow};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Observed min/max timestamps over the localized table; None when the
/// table has no rows.
pub fn observed_bounds(records: &[LocalRecord]) -> Option<ReportWindow> {
    let start = records.iter().map(|r| r.created_at).min()?;
    let end = records.iter().map(|r| r.created_at).max()?;
    Some(ReportWindow { start, end })
}

/// Resolve the report window from query params. Each absent component
/// defaults to the matching component of the observed bounds, so no
/// params at all means the full observed range.
pub fn resolve_window(
    params: &ReportParams,
    bounds: &ReportWindow,
    tz: Tz,
) -> AppResult<ReportWindow> {
    let start_date = params
        .start_date
        .unwrap_or_else(|| bounds.start.date_naive());
    let start_time = params.start_time.unwrap_or_else(|| bounds.start.time());
    let end_date = params.end_date.unwrap_or_else(|| bounds.end.date_naive());
    let end_time = params.end_time.unwrap_or_else(|| bounds.end.time());

    let start = zone_instant(start_date.and_time(start_time), tz)?;
    let end = zone_instant(end_date.and_time(end_time), tz)?;
    Ok(ReportWindow { start, end })
}

/// A wall-clock time skipped or doubled by a DST transition has no single
/// instant in the zone; reject it rather than guess an offset.
fn zone_instant(naive: NaiveDateTime, tz: Tz) -> AppResult<DateTime<Tz>> {
    tz.from_local_datetime(&naive).single().ok_or_else(|| {
        AppError::Validation(format!(
            "ambiguous or nonexistent local time in {tz}: {naive}"
        ))
    })
}

/// Keep rows with `start <= created_at <= end`, inclusive both ends,
/// preserving input order.
pub fn filter_window(records: &[LocalRecord], window: &ReportWindow) -> Vec<LocalRecord> {
    records
        .iter()
        .filter(|r| r.created_at >= window.start && r.created_at <= window.end)
        .cloned()
        .collect()
}
