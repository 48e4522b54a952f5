//! Pure aggregation engine over canonical series values
//!
//! Shared by the transformer (bank aggregate statistics) and the validator
//! (statistical outlier baselines). Sentinel readings are filtered before
//! aggregation; an all-sentinel or empty input yields all-zero output, which
//! is the documented default rather than an error.

use crate::app::models::{BankStatistics, FieldAggregate, TimeSeriesPoint};
use crate::constants::is_missing;

/// Aggregate of one filtered value sequence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
}

/// Compute avg/max/min/stdDev over the non-sentinel values of a sequence.
///
/// Standard deviation is the population form, matching the anomaly scan's
/// `2 * stdDev` threshold.
pub fn aggregate(values: &[f64]) -> Aggregate {
    let filtered: Vec<f64> = values.iter().copied().filter(|v| !is_missing(*v)).collect();
    if filtered.is_empty() {
        return Aggregate::default();
    }

    let count = filtered.len() as f64;
    let sum: f64 = filtered.iter().sum();
    let avg = sum / count;

    let mut max = f64::MIN;
    let mut min = f64::MAX;
    for value in &filtered {
        max = max.max(*value);
        min = min.min(*value);
    }

    let variance = filtered
        .iter()
        .map(|value| {
            let delta = value - avg;
            delta * delta
        })
        .sum::<f64>()
        / count;

    Aggregate {
        avg,
        max,
        min,
        std_dev: variance.sqrt(),
    }
}

/// Mean of the non-sentinel values of a sequence, zero when all are absent.
///
/// Used for collapsing per-cell arrays into a bank-level scalar.
pub fn mean(values: &[f64]) -> f64 {
    aggregate(values).avg
}

/// Compute per-bank aggregate statistics over a canonical point sequence.
///
/// Bank-level fields use their literal values; the zero-as-missing rule is a
/// quality-scoring concern and does not apply here.
pub fn bank_statistics(points: &[TimeSeriesPoint]) -> BankStatistics {
    fn field(points: &[TimeSeriesPoint], pick: impl Fn(&TimeSeriesPoint) -> f64) -> FieldAggregate {
        let values: Vec<f64> = points.iter().map(pick).collect();
        let agg = aggregate(&values);
        FieldAggregate {
            avg: agg.avg,
            max: agg.max,
            min: agg.min,
        }
    }

    BankStatistics {
        voltage: field(points, |p| p.bank.voltage),
        current: field(points, |p| p.bank.current),
        soc: field(points, |p| p.bank.soc),
        soh: field(points, |p| p.bank.soh),
        temperature: field(points, |p| p.bank.temperature),
    }
}
