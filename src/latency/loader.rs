use crate::error::{AppError, AppResult};
use crate::latency::types::LatencyRecord;
use crate::latency::LatencyState;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::ValueRef;
use std::sync::Arc;

const LATENCY_QUERY: &str = "SELECT provider, latency, created_at FROM llm_latency";

/// Epoch values at or above this are taken as milliseconds.
const EPOCH_MILLIS_FLOOR: i64 = 100_000_000_000;

/// Load the full latency table, memoized for the configured TTL. A cache
/// hit returns the snapshot without touching the pool; a miss runs the
/// fixed query on one pooled connection.
pub async fn load_records(state: &LatencyState) -> AppResult<Arc<Vec<LatencyRecord>>> {
    if let Some(records) = state.cache.get(&state.db_key) {
        tracing::debug!(rows = records.len(), "latency table cache hit");
        return Ok(records);
    }

    let conn = state
        .pool
        .get()
        .await
        .map_err(|e| AppError::Internal(format!("pool error: {e}")))?;

    let records = conn
        .interact(|conn| {
            let mut stmt = conn.prepare(LATENCY_QUERY)?;
            let rows = stmt.query_map([], |row| {
                let created_raw = row.get_ref(2)?;
                Ok(LatencyRecord {
                    provider: row.get(0)?,
                    latency: row.get(1)?,
                    created_at: parse_created_at(created_raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            created_raw.data_type(),
                            Box::new(e),
                        )
                    })?,
                })
            })?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok::<_, rusqlite::Error>(records)
        })
        .await??;

    let records = Arc::new(records);
    state.cache.insert(state.db_key.clone(), records.clone());
    tracing::debug!(rows = records.len(), "latency table loaded");
    Ok(records)
}

#[derive(Debug, thiserror::Error)]
#[error("unparseable created_at value: {0}")]
pub struct TimestampError(String);

/// Normalize a stored `created_at` value to UTC. Text is accepted as
/// RFC 3339 or as a naive datetime (taken as UTC); numeric values are
/// epoch seconds, or milliseconds when the magnitude implies it.
fn parse_created_at(value: ValueRef<'_>) -> Result<DateTime<Utc>, TimestampError> {
    match value {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|_| TimestampError("non-utf8 text".to_string()))?;
            parse_timestamp_text(s).ok_or_else(|| TimestampError(s.to_string()))
        }
        ValueRef::Integer(n) => epoch_from_int(n).ok_or_else(|| TimestampError(n.to_string())),
        ValueRef::Real(f) => epoch_from_float(f).ok_or_else(|| TimestampError(f.to_string())),
        ValueRef::Null => Err(TimestampError("NULL".to_string())),
        ValueRef::Blob(_) => Err(TimestampError("BLOB".to_string())),
    }
}

fn epoch_from_int(n: i64) -> Option<DateTime<Utc>> {
    if n.abs() >= EPOCH_MILLIS_FLOOR {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

fn epoch_from_float(f: f64) -> Option<DateTime<Utc>> {
    if f.abs() >= EPOCH_MILLIS_FLOOR as f64 {
        DateTime::from_timestamp_millis(f as i64)
    } else {
        DateTime::from_timestamp_micros((f * 1_000_000.0) as i64)
    }
}

fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres-style "2024-03-01 12:00:00.123+00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    // TEXT-affinity columns store numeric epochs as digit strings
    if let Ok(n) = s.parse::<i64>() {
        return epoch_from_int(n);
    }
    s.parse::<f64>().ok().and_then(epoch_from_float)
}
