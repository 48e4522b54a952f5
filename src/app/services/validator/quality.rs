//! Quality scoring and recommendations
//!
//! Folds the anomaly scan and the canonical series into four subscores and a
//! fixed-threshold recommendation table. Bank-level fields treat literal zero
//! as missing; cell-level arrays treat only the sentinel as missing. The
//! asymmetry is deliberate and downstream quality thresholds depend on it.

use crate::app::models::{
    AnomalyReport, DataSummary, QualityReport, Severity, StandardBatteryData, TimeSeriesPoint,
    ValidationResult,
};
use crate::config::ValidationRanges;
use crate::constants::{
    is_bank_field_missing, is_missing, round_score, ACCURACY_RECOMMENDATION_THRESHOLD,
    COMPLETENESS_RECOMMENDATION_THRESHOLD, CONSISTENCY_RECOMMENDATION_THRESHOLD,
    TIMELINESS_GAP_HOURS, TIMELINESS_RECOMMENDATION_THRESHOLD,
};
use chrono::Duration;

/// Compute the quality report for one standardized unit.
///
/// `overall_score` is the arithmetic mean of the four subscores, rounded to
/// two decimals.
pub fn generate_quality_report(
    data: &StandardBatteryData,
    anomaly_report: &AnomalyReport,
    ranges: &ValidationRanges,
) -> QualityReport {
    let points: Vec<&TimeSeriesPoint> = data
        .banks
        .iter()
        .flat_map(|bank| bank.points.iter())
        .collect();

    let completeness = completeness_score(&points);
    let accuracy = accuracy_score(points.len(), anomaly_report.summary.total_anomalies);
    let consistency = consistency_score(data, ranges);
    let timeliness = timeliness_score(data);

    let overall_score = round_score((completeness + accuracy + consistency + timeliness) / 4.0);

    let recommendations = build_recommendations(
        completeness,
        accuracy,
        consistency,
        timeliness,
        anomaly_report,
    );

    QualityReport {
        overall_score,
        completeness,
        accuracy,
        consistency,
        timeliness,
        anomaly_count: anomaly_report.summary.total_anomalies,
        recommendations,
    }
}

/// Fill a data summary from validation and quality results
pub fn build_summary(validation: &ValidationResult, quality: &QualityReport) -> DataSummary {
    DataSummary {
        completeness: quality.completeness,
        accuracy: quality.accuracy,
        consistency: quality.consistency,
        timeliness: quality.timeliness,
        total_records: validation.statistics.total_records,
        valid_records: validation.statistics.valid_records,
        error_records: validation.statistics.total_records - validation.statistics.valid_records,
    }
}

/// Fraction of populated scalar fields across bank and cell level.
///
/// Bank fields count the four electrical scalars per point with zero treated
/// as missing; cell entries count individually with only the sentinel treated
/// as missing.
fn completeness_score(points: &[&TimeSeriesPoint]) -> f64 {
    let mut total = 0usize;
    let mut populated = 0usize;

    for point in points {
        let bank_fields = [
            point.bank.voltage,
            point.bank.current,
            point.bank.soc,
            point.bank.soh,
        ];
        total += bank_fields.len();
        populated += bank_fields
            .iter()
            .filter(|value| !is_bank_field_missing(**value))
            .count();

        for array in [
            &point.cells.voltages,
            &point.cells.temperatures,
            &point.cells.socs,
            &point.cells.sohs,
        ] {
            total += array.len();
            populated += array.iter().filter(|value| !is_missing(**value)).count();
        }
    }

    if total == 0 {
        0.0
    } else {
        populated as f64 / total as f64
    }
}

/// One minus the anomaly density, floored at zero
fn accuracy_score(point_count: usize, anomaly_count: usize) -> f64 {
    if point_count == 0 {
        return 1.0;
    }
    (1.0 - anomaly_count as f64 / point_count as f64).max(0.0)
}

/// Fraction of passing consistency checks.
///
/// Per point, one check per signal kind's bank field: present (zero counts as
/// absent) and within its domain where one applies. Per consecutive pair, one
/// ordering check. A single-point unit therefore scores purely on kind
/// presence.
fn consistency_score(data: &StandardBatteryData, ranges: &ValidationRanges) -> f64 {
    let mut total = 0usize;
    let mut passed = 0usize;

    for bank in &data.banks {
        for point in &bank.points {
            // Voltage is a pack-level sum with no configured domain; presence
            // alone is the check.
            total += 1;
            if !is_bank_field_missing(point.bank.voltage) {
                passed += 1;
            }

            total += 1;
            if !is_bank_field_missing(point.bank.temperature)
                && ranges.temperature.contains(point.bank.temperature)
            {
                passed += 1;
            }

            total += 1;
            if !is_bank_field_missing(point.bank.soc) && ranges.soc.contains(point.bank.soc) {
                passed += 1;
            }

            total += 1;
            if !is_bank_field_missing(point.bank.soh) && ranges.soh.contains(point.bank.soh) {
                passed += 1;
            }
        }

        for pair in bank.points.windows(2) {
            total += 1;
            if pair[0].timestamp < pair[1].timestamp {
                passed += 1;
            }
        }
    }

    if total == 0 {
        1.0
    } else {
        passed as f64 / total as f64
    }
}

/// One minus the fraction of intervals wider than one hour
fn timeliness_score(data: &StandardBatteryData) -> f64 {
    let mut intervals = 0usize;
    let mut gaps = 0usize;

    for bank in &data.banks {
        for pair in bank.points.windows(2) {
            intervals += 1;
            if pair[1].timestamp - pair[0].timestamp > Duration::hours(TIMELINESS_GAP_HOURS) {
                gaps += 1;
            }
        }
    }

    if intervals == 0 {
        1.0
    } else {
        1.0 - gaps as f64 / intervals as f64
    }
}

/// Fixed-threshold recommendation table
fn build_recommendations(
    completeness: f64,
    accuracy: f64,
    consistency: f64,
    timeliness: f64,
    anomaly_report: &AnomalyReport,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if completeness < COMPLETENESS_RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "Completeness below 80%: check data collection and export coverage for missing bank readings".to_string(),
        );
    }
    if anomaly_report.count_at_least(Severity::Critical) > 0 {
        recommendations
            .push("Critical anomalies detected: schedule an immediate device check".to_string());
    }
    if accuracy < ACCURACY_RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "Accuracy below 90%: review sensor calibration and anomaly sources".to_string(),
        );
    }
    if consistency < CONSISTENCY_RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "Consistency below 80%: verify that every signal kind is exported for the unit"
                .to_string(),
        );
    }
    if timeliness < TIMELINESS_RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "Timeliness below 90%: review transmission intervals for collection gaps".to_string(),
        );
    }

    recommendations
}
