//! Anomaly detection over a canonical point sequence
//!
//! Each detection method grades severity its own way: voltage range-relative,
//! temperature threshold-relative, state-of-charge/health unconditionally
//! high, missing-data and time-gap by count and width. The scan is
//! independently callable on any flat point sequence.

use crate::app::models::{Anomaly, AnomalyKind, AnomalyReport, Severity, TimeSeriesPoint};
use crate::app::services::statistics;
use crate::config::ValidationRanges;
use crate::constants::{
    is_bank_field_missing, is_missing, temperature_severity, voltage_severity,
    MISSING_FIELDS_HIGH_THRESHOLD, TEMPERATURE_SIGMA_MULTIPLIER, TIME_GAP_ANOMALY_HOURS,
    TIME_GAP_HIGH_HOURS, VOLTAGE_RANGE_EXTENSION,
};
use chrono::Duration;
use tracing::debug;

/// Scan a point sequence for anomalies.
///
/// Runs every detection method and folds the findings into one report with a
/// severity distribution summary.
pub fn detect_anomalies(
    unit_id: &str,
    points: &[TimeSeriesPoint],
    ranges: &ValidationRanges,
) -> AnomalyReport {
    let mut anomalies = Vec::new();

    detect_voltage_outliers(unit_id, points, ranges, &mut anomalies);
    detect_temperature_outliers(unit_id, points, &mut anomalies);
    detect_state_outliers(unit_id, points, ranges, &mut anomalies);
    detect_missing_data(unit_id, points, &mut anomalies);
    detect_time_gaps(unit_id, points, &mut anomalies);

    debug!(
        "Anomaly scan of unit {}: {} findings over {} points",
        unit_id,
        anomalies.len(),
        points.len()
    );

    AnomalyReport::from_anomalies(anomalies)
}

/// Fixed-range voltage outliers over per-cell readings.
///
/// Cells are flagged when they fall outside the normal domain extended by
/// half its width on each side. Severity is the ratio of the deviation from
/// the nearest normal bound over the range width. Bank-level voltage is a
/// pack-level sum and is not checked against the cell domain.
fn detect_voltage_outliers(
    unit_id: &str,
    points: &[TimeSeriesPoint],
    ranges: &ValidationRanges,
    anomalies: &mut Vec<Anomaly>,
) {
    let width = ranges.voltage.width();
    if width <= 0.0 {
        return;
    }

    for point in points {
        for (cell, value) in point.cells.voltages.iter().enumerate() {
            if is_missing(*value) {
                continue;
            }
            let deviation = ranges.voltage.deviation(*value);
            if deviation <= VOLTAGE_RANGE_EXTENSION * width {
                continue;
            }

            let ratio = deviation / width;
            let severity = if ratio > voltage_severity::CRITICAL {
                Severity::Critical
            } else if ratio > voltage_severity::HIGH {
                Severity::High
            } else if ratio > voltage_severity::MEDIUM {
                Severity::Medium
            } else {
                Severity::Low
            };

            anomalies.push(Anomaly {
                kind: AnomalyKind::VoltageOutlier,
                severity,
                timestamp: point.timestamp,
                unit_id: unit_id.to_string(),
                value: *value,
                expected_range: Some((ranges.voltage.min, ranges.voltage.max)),
                message: format!(
                    "cell {} voltage {:.3} deviates {:.2}x the normal range width",
                    cell, value, ratio
                ),
            });
        }
    }
}

/// Statistical temperature outliers over the bank temperature sequence.
///
/// The baseline mean and standard deviation come from the whole sequence;
/// readings beyond two standard deviations are flagged. Severity is the ratio
/// of the deviation over the flagging threshold itself, not the range width -
/// a different base than voltage, kept intentionally.
fn detect_temperature_outliers(
    unit_id: &str,
    points: &[TimeSeriesPoint],
    anomalies: &mut Vec<Anomaly>,
) {
    let values: Vec<f64> = points.iter().map(|point| point.bank.temperature).collect();
    let baseline = statistics::aggregate(&values);
    let threshold = TEMPERATURE_SIGMA_MULTIPLIER * baseline.std_dev;
    if threshold <= 0.0 {
        return;
    }

    for point in points {
        let value = point.bank.temperature;
        if is_missing(value) {
            continue;
        }
        let deviation = (value - baseline.avg).abs();
        if deviation <= threshold {
            continue;
        }

        let ratio = deviation / threshold;
        let severity = if ratio > temperature_severity::CRITICAL {
            Severity::Critical
        } else if ratio > temperature_severity::HIGH {
            Severity::High
        } else if ratio > temperature_severity::MEDIUM {
            Severity::Medium
        } else {
            Severity::Low
        };

        anomalies.push(Anomaly {
            kind: AnomalyKind::TemperatureOutlier,
            severity,
            timestamp: point.timestamp,
            unit_id: unit_id.to_string(),
            value,
            expected_range: Some((baseline.avg - threshold, baseline.avg + threshold)),
            message: format!(
                "bank temperature {:.1} deviates {:.2}x the 2-sigma threshold",
                value, ratio
            ),
        });
    }
}

/// Hard-domain state-of-charge/health checks on bank and cell values.
///
/// Any violation of the percentage domain is unconditionally high severity;
/// there is no graduation.
fn detect_state_outliers(
    unit_id: &str,
    points: &[TimeSeriesPoint],
    ranges: &ValidationRanges,
    anomalies: &mut Vec<Anomaly>,
) {
    let mut push = |timestamp, value: f64, label: &str, min: f64, max: f64| {
        anomalies.push(Anomaly {
            kind: AnomalyKind::SocOutlier,
            severity: Severity::High,
            timestamp,
            unit_id: unit_id.to_string(),
            value,
            expected_range: Some((min, max)),
            message: format!("{} {:.1} outside [{}, {}]", label, value, min, max),
        });
    };

    for point in points {
        if !is_missing(point.bank.soc) && !ranges.soc.contains(point.bank.soc) {
            push(
                point.timestamp,
                point.bank.soc,
                "bank soc",
                ranges.soc.min,
                ranges.soc.max,
            );
        }
        if !is_missing(point.bank.soh) && !ranges.soh.contains(point.bank.soh) {
            push(
                point.timestamp,
                point.bank.soh,
                "bank soh",
                ranges.soh.min,
                ranges.soh.max,
            );
        }
        for value in &point.cells.socs {
            if !is_missing(*value) && !ranges.soc.contains(*value) {
                push(point.timestamp, *value, "cell soc", ranges.soc.min, ranges.soc.max);
            }
        }
        for value in &point.cells.sohs {
            if !is_missing(*value) && !ranges.soh.contains(*value) {
                push(point.timestamp, *value, "cell soh", ranges.soh.min, ranges.soh.max);
            }
        }
    }
}

/// Missing-data detection over the four bank-level electrical fields.
///
/// A field counts as missing when it carries the sentinel or the literal zero
/// default. More than two missing fields on one point escalates to high.
fn detect_missing_data(unit_id: &str, points: &[TimeSeriesPoint], anomalies: &mut Vec<Anomaly>) {
    for point in points {
        let fields = [
            point.bank.voltage,
            point.bank.current,
            point.bank.soc,
            point.bank.soh,
        ];
        let missing = fields
            .iter()
            .filter(|value| is_bank_field_missing(**value))
            .count();
        if missing == 0 {
            continue;
        }

        let severity = if missing > MISSING_FIELDS_HIGH_THRESHOLD {
            Severity::High
        } else {
            Severity::Medium
        };

        anomalies.push(Anomaly {
            kind: AnomalyKind::MissingData,
            severity,
            timestamp: point.timestamp,
            unit_id: unit_id.to_string(),
            value: missing as f64,
            expected_range: None,
            message: format!("{} of 4 bank fields missing or invalid", missing),
        });
    }
}

/// Time-gap detection over consecutive points
fn detect_time_gaps(unit_id: &str, points: &[TimeSeriesPoint], anomalies: &mut Vec<Anomaly>) {
    for pair in points.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        if gap <= Duration::hours(TIME_GAP_ANOMALY_HOURS) {
            continue;
        }

        let severity = if gap > Duration::hours(TIME_GAP_HIGH_HOURS) {
            Severity::High
        } else {
            Severity::Medium
        };
        let gap_hours = gap.num_minutes() as f64 / 60.0;

        anomalies.push(Anomaly {
            kind: AnomalyKind::TimeGap,
            severity,
            timestamp: pair[1].timestamp,
            unit_id: unit_id.to_string(),
            value: gap_hours,
            expected_range: Some((0.0, TIME_GAP_ANOMALY_HOURS as f64)),
            message: format!("{:.1}h gap since previous point", gap_hours),
        });
    }
}
