use crate::latency::types::{LocalRecord, MetricBlock, PercentileSet, ProviderSummary};
use std::collections::BTreeMap;

/// Percentile with linear interpolation between ranked data points:
/// `rank = p/100 * (n-1)`, interpolated between the neighboring ranks.
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Sample standard deviation (N-1 denominator); undefined for fewer than
/// two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// Every scalar metric is reported at 3 decimal places.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Full metric block over one series. Zeroed block for an empty series;
/// the report handler never reaches here with one.
pub fn describe(values: &[f64]) -> MetricBlock {
    let count = values.len();
    if count == 0 {
        return MetricBlock {
            count: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            p50: 0.0,
            p95: 0.0,
            p99: 0.0,
        };
    }
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    MetricBlock {
        count,
        mean: round3(mean),
        min: round3(min),
        max: round3(max),
        p50: round3(percentile(values, 50.0)),
        p95: round3(percentile(values, 95.0)),
        p99: round3(percentile(values, 99.0)),
    }
}

/// Latency values per provider, keyed in provider name order.
pub fn group_by_provider(records: &[LocalRecord]) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.provider.clone()).or_default().push(r.latency);
    }
    groups
}

pub fn provider_blocks(groups: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, MetricBlock> {
    groups
        .iter()
        .map(|(provider, values)| (provider.clone(), describe(values)))
        .collect()
}

pub fn provider_summaries(groups: &BTreeMap<String, Vec<f64>>) -> Vec<ProviderSummary> {
    groups
        .iter()
        .map(|(provider, values)| {
            let m = describe(values);
            ProviderSummary {
                provider: provider.clone(),
                count: m.count,
                mean: m.mean,
                std: sample_std(values).map(round3),
                min: m.min,
                max: m.max,
            }
        })
        .collect()
}

pub fn provider_percentiles(groups: &BTreeMap<String, Vec<f64>>) -> Vec<PercentileSet> {
    groups
        .iter()
        .map(|(provider, values)| {
            let m = describe(values);
            PercentileSet {
                provider: provider.clone(),
                count: m.count,
                p50: m.p50,
                p95: m.p95,
                p99: m.p99,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn local(provider: &str, latency: f64, secs: i64) -> LocalRecord {
        LocalRecord {
            provider: provider.to_string(),
            latency,
            created_at: Utc
                .timestamp_opt(1_700_000_000 + secs, 0)
                .unwrap()
                .with_timezone(&chrono_tz::America::Sao_Paulo),
        }
    }

    #[test]
    fn test_percentile_p95_of_1_to_100() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        assert!((percentile(&values, 95.0) - 95.05).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_p99_of_1_to_100() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        assert!((percentile(&values, 99.0) - 99.01).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_median_interpolates() {
        assert!((percentile(&[1.0, 2.0, 3.0, 4.0], 50.0) - 2.5).abs() < 1e-9);
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert!((percentile(&values, 50.0) - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.0], 50.0), 7.0);
        assert_eq!(percentile(&[7.0], 99.0), 7.0);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        assert!((percentile(&[4.0, 1.0, 3.0, 2.0], 50.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentiles_monotone() {
        let values = [0.4, 2.1, 0.9, 1.5, 3.3, 0.7];
        let p50 = percentile(&values, 50.0);
        let p95 = percentile(&values, 95.0);
        let p99 = percentile(&values, 99.0);
        assert!(p50 <= p95);
        assert!(p95 <= p99);
    }

    #[test]
    fn test_sample_std_known_value() {
        // [1,2,3,4]: variance 5/3
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_sample_std_singleton_undefined() {
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(2.0 / 3.0), 0.667);
        assert_eq!(round3(1.5), 1.5);
    }

    #[test]
    fn test_describe_mean_within_bounds() {
        let values = [0.8, 1.2, 2.5, 0.3, 1.9];
        let m = describe(&values);
        assert!(m.min <= m.mean && m.mean <= m.max);
        assert_eq!(m.count, 5);
    }

    #[test]
    fn test_overall_and_grouped_blocks() {
        let records = vec![
            local("openai", 1.2, 0),
            local("openai", 0.8, 1),
            local("anthropic", 2.5, 2),
        ];
        let values: Vec<f64> = records.iter().map(|r| r.latency).collect();
        let overall = describe(&values);
        assert_eq!(overall.count, 3);
        assert!((overall.mean - 1.5).abs() < 1e-9);

        let groups = group_by_provider(&records);
        let blocks = provider_blocks(&groups);
        assert_eq!(blocks.len(), 2);
        // Natural provider order
        let names: Vec<&str> = blocks.keys().map(String::as_str).collect();
        assert_eq!(names, ["anthropic", "openai"]);
        assert_eq!(blocks["openai"].count, 2);
        assert!((blocks["openai"].mean - 1.0).abs() < 1e-9);
        assert_eq!(blocks["anthropic"].count, 1);
        assert!((blocks["anthropic"].mean - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_group_counts_sum_to_total() {
        let records = vec![
            local("openai", 1.2, 0),
            local("openai", 0.8, 1),
            local("anthropic", 2.5, 2),
            local("google", 1.1, 3),
        ];
        let groups = group_by_provider(&records);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_summary_singleton_std_is_null() {
        let records = vec![local("openai", 1.2, 0), local("anthropic", 2.5, 1)];
        let groups = group_by_provider(&records);
        let summaries = provider_summaries(&groups);
        assert!(summaries.iter().all(|s| s.std.is_none()));
        assert_eq!(summaries[0].provider, "anthropic");
    }
}
