//! Delta, round-trip, and summary-statistic computation.
//!
//! All functions here are pure and deterministic for identical input
//! ordering. Degenerate inputs fail with [`EmptySeriesError`] instead of
//! producing NaN or undefined min/max.

use serde::{Deserialize, Serialize};

use crate::capture::TimestampSeries;
use crate::error::EmptySeriesError;

/// Summary statistics over one latency category.
///
/// This is the structured summary document schema: field order here is the
/// field order of the persisted JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStatistics {
    /// Capture method label carried over from the series metadata.
    pub method: String,
    /// Capture clock frequency in Hz.
    pub cpu_frequency: u64,
    /// Smallest value.
    pub min: i64,
    /// Largest value.
    pub max: i64,
    /// Arithmetic mean.
    pub avg: f64,
    /// Middle of the sorted values; mean of the two middles for even counts.
    pub median: f64,
    /// Population standard deviation.
    pub deviation: f64,
}

/// Forward differences between consecutive samples.
///
/// Element `i` is `samples[i+1] - samples[i]` as a signed 64-bit value, so a
/// series of length `n` yields `n - 1` deltas.
///
/// # Errors
///
/// [`EmptySeriesError`] if the series holds fewer than two samples.
pub fn deltas(series: &TimestampSeries) -> Result<Vec<i64>, EmptySeriesError> {
    let samples = series.samples();
    if samples.len() < 2 {
        return Err(EmptySeriesError {
            required: 2,
            actual: samples.len(),
        });
    }
    Ok(samples
        .windows(2)
        .map(|w| w[1].wrapping_sub(w[0]) as i64)
        .collect())
}

/// Pairwise round-trip latencies: `acked[i] - entry[i]`.
///
/// When the two series differ in length, the result is truncated to the
/// shorter one; the trailing unmatched samples carry no correlated pair, so
/// they are dropped with a warning rather than failing the run.
pub fn round_trip(entry: &TimestampSeries, acked: &TimestampSeries) -> Vec<i64> {
    if entry.len() != acked.len() {
        tracing::warn!(
            entry = entry.len(),
            acked = acked.len(),
            "entry/acked series lengths differ; truncating round trips to the shorter"
        );
    }
    entry
        .samples()
        .iter()
        .zip(acked.samples())
        .map(|(e, a)| a.wrapping_sub(*e) as i64)
        .collect()
}

/// Compute summary statistics over a delta or round-trip series.
///
/// The mean is a single formula (f64 sum over count) so every category is
/// summarized identically. The deviation is the population standard
/// deviation.
///
/// # Errors
///
/// [`EmptySeriesError`] if `values` is empty.
pub fn summarize(
    method: &str,
    cpu_frequency_hz: u64,
    values: &[i64],
) -> Result<LatencyStatistics, EmptySeriesError> {
    if values.is_empty() {
        return Err(EmptySeriesError {
            required: 1,
            actual: 0,
        });
    }

    let n = values.len() as f64;
    let min = *values.iter().min().unwrap();
    let max = *values.iter().max().unwrap();
    let avg = values.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    };

    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - avg;
            d * d
        })
        .sum::<f64>()
        / n;
    let deviation = variance.sqrt();

    Ok(LatencyStatistics {
        method: method.to_string(),
        cpu_frequency: cpu_frequency_hz,
        min,
        max,
        avg,
        median,
        deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(samples: &[u64]) -> TimestampSeries {
        TimestampSeries::new(samples.to_vec(), "rdtsc", 1_000_000_000)
    }

    #[test]
    fn deltas_are_forward_differences() {
        let s = series(&[100, 150, 225, 400]);
        assert_eq!(deltas(&s).unwrap(), vec![50, 75, 175]);
    }

    #[test]
    fn deltas_length_invariant() {
        for n in 2..20u64 {
            let samples: Vec<u64> = (0..n).map(|i| i * i).collect();
            let s = series(&samples);
            let d = deltas(&s).unwrap();
            assert_eq!(d.len(), samples.len() - 1);
            for (i, &delta) in d.iter().enumerate() {
                assert_eq!(delta, (samples[i + 1] - samples[i]) as i64);
            }
        }
    }

    #[test]
    fn deltas_can_be_negative() {
        let s = series(&[200, 150]);
        assert_eq!(deltas(&s).unwrap(), vec![-50]);
    }

    #[test]
    fn deltas_reject_short_series() {
        assert_eq!(
            deltas(&series(&[])).unwrap_err(),
            EmptySeriesError {
                required: 2,
                actual: 0
            }
        );
        assert_eq!(
            deltas(&series(&[42])).unwrap_err(),
            EmptySeriesError {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn round_trip_pairwise_subtraction() {
        let entry = series(&[10, 20, 30]);
        let acked = series(&[15, 28, 33]);
        assert_eq!(round_trip(&entry, &acked), vec![5, 8, 3]);
    }

    #[test]
    fn round_trip_truncates_to_shorter() {
        let entry = series(&[10, 20, 30, 40]);
        let acked = series(&[15, 28]);
        assert_eq!(round_trip(&entry, &acked), vec![5, 8]);
        assert_eq!(round_trip(&acked, &entry), vec![-5, -8]);
    }

    #[test]
    fn summarize_known_values() {
        let stats = summarize("rdtsc", 1_000_000_000, &[5, 8, 3]).unwrap();
        assert_eq!(stats.min, 3);
        assert_eq!(stats.max, 8);
        assert!((stats.avg - 16.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.median, 5.0);
        // Population standard deviation of [3, 5, 8].
        assert!((stats.deviation - 2.0548046676563256).abs() < 1e-12);
        assert_eq!(stats.method, "rdtsc");
        assert_eq!(stats.cpu_frequency, 1_000_000_000);
    }

    #[test]
    fn summarize_even_count_averages_middles() {
        let stats = summarize("m", 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.avg, 2.5);
    }

    #[test]
    fn summarize_single_value() {
        let stats = summarize("m", 1, &[7]).unwrap();
        assert_eq!(stats.min, 7);
        assert_eq!(stats.max, 7);
        assert_eq!(stats.avg, 7.0);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.deviation, 0.0);
    }

    #[test]
    fn summarize_rejects_empty() {
        assert_eq!(
            summarize("m", 1, &[]).unwrap_err(),
            EmptySeriesError {
                required: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn summary_json_schema() {
        let stats = summarize("rdtsc", 42, &[5, 8, 3]).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["method"], "rdtsc");
        assert_eq!(json["cpu_frequency"], 42);
        assert_eq!(json["min"], 3);
        assert_eq!(json["max"], 8);
        let back: LatencyStatistics = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
