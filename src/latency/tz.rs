use crate::latency::types::{LatencyRecord, LocalRecord};
use chrono::DateTime;
use chrono_tz::Tz;

/// Convert the loaded snapshot into the report zone. Pure and total; a
/// UTC-to-zone conversion cannot fail.
pub fn localize(records: &[LatencyRecord], tz: Tz) -> Vec<LocalRecord> {
    records
        .iter()
        .map(|r| LocalRecord {
            provider: r.provider.clone(),
            latency: r.latency,
            created_at: r.created_at.with_timezone(&tz),
        })
        .collect()
}

/// Chart axis label for a localized timestamp.
pub fn chart_label(dt: &DateTime<Tz>) -> String {
    dt.format("%d/%m %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone, Timelike, Utc};

    #[test]
    fn test_localize_sao_paulo_offset() {
        let records = vec![LatencyRecord {
            provider: "openai".to_string(),
            latency: 1.0,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }];
        let local = localize(&records, chrono_tz::America::Sao_Paulo);
        assert_eq!(local[0].created_at.hour(), 9);
        assert_eq!(local[0].created_at.offset().fix().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_localize_preserves_instant() {
        let records = vec![LatencyRecord {
            provider: "openai".to_string(),
            latency: 1.0,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }];
        let local = localize(&records, chrono_tz::America::Sao_Paulo);
        assert_eq!(local[0].created_at.timestamp(), records[0].created_at.timestamp());
    }

    #[test]
    fn test_chart_label_format() {
        let dt = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::Sao_Paulo);
        assert_eq!(chart_label(&dt), "01/03 09:00:00");
    }
}
