//! Structural validation over standardized data
//!
//! Unit-level shape problems (missing identifier, no banks, empty banks,
//! disordered timestamps) are errors. Out-of-range readings are warnings that
//! mark the record invalid for the error-rate statistic without failing the
//! whole unit; wide gaps are warnings only.

use crate::app::models::{
    StandardBatteryData, TimeSeriesPoint, ValidationIssue, ValidationResult, ValidationStats,
};
use crate::config::ValidationRanges;
use crate::constants::{is_bank_field_missing, is_missing, ORDERING_GAP_WARNING_HOURS};
use chrono::Duration;
use tracing::debug;

/// Validate standardized data structurally.
///
/// Returns a [`ValidationResult`] whose `is_valid` flag holds exactly when no
/// structural error was found and fewer than 10% of records carry range
/// violations.
pub fn validate_data(data: &StandardBatteryData, ranges: &ValidationRanges) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if data.unit_id.trim().is_empty() {
        errors.push(ValidationIssue::unit("missing unit identifier"));
    }
    if data.banks.is_empty() {
        errors.push(ValidationIssue::unit("unit carries no banks"));
    }

    let mut total_records = 0;
    let mut invalid_records = 0;

    for bank in &data.banks {
        if bank.points.is_empty() {
            errors.push(ValidationIssue::unit(format!(
                "bank {} has zero points",
                bank.bank_id
            )));
            continue;
        }

        for (index, point) in bank.points.iter().enumerate() {
            total_records += 1;
            let point_warnings = check_point_ranges(point, ranges);
            if !point_warnings.is_empty() {
                invalid_records += 1;
                for message in point_warnings {
                    warnings.push(ValidationIssue::point(message, &bank.bank_id, index));
                }
            }
        }

        for (index, pair) in bank.points.windows(2).enumerate() {
            let earlier = pair[0].timestamp;
            let later = pair[1].timestamp;
            if later <= earlier {
                errors.push(ValidationIssue::point(
                    format!("timestamp not increasing: {} then {}", earlier, later),
                    &bank.bank_id,
                    index + 1,
                ));
            } else if later - earlier > Duration::hours(ORDERING_GAP_WARNING_HOURS) {
                warnings.push(ValidationIssue::point(
                    format!(
                        "gap of {:.1}h between consecutive points",
                        (later - earlier).num_minutes() as f64 / 60.0
                    ),
                    &bank.bank_id,
                    index + 1,
                ));
            }
        }
    }

    let error_rate = if total_records == 0 {
        0.0
    } else {
        invalid_records as f64 / total_records as f64
    };

    debug!(
        "Structural validation of unit {}: {} errors, {} warnings, error rate {:.3}",
        data.unit_id,
        errors.len(),
        warnings.len(),
        error_rate
    );

    ValidationResult::new(
        errors,
        warnings,
        ValidationStats {
            total_records,
            valid_records: total_records - invalid_records,
            error_rate,
        },
    )
}

/// Range checks for one point; each violation becomes a warning message.
///
/// Bank-level voltage is a pack-level sum and has no configured domain, so it
/// is not range-checked here. Zero bank fields count as missing, not as
/// violations.
fn check_point_ranges(point: &TimeSeriesPoint, ranges: &ValidationRanges) -> Vec<String> {
    let mut messages = Vec::new();

    if !is_bank_field_missing(point.bank.temperature)
        && !ranges.temperature.contains(point.bank.temperature)
    {
        messages.push(format!(
            "bank temperature {:.1} outside [{}, {}]",
            point.bank.temperature, ranges.temperature.min, ranges.temperature.max
        ));
    }
    if !is_bank_field_missing(point.bank.soc) && !ranges.soc.contains(point.bank.soc) {
        messages.push(format!(
            "bank soc {:.1} outside [{}, {}]",
            point.bank.soc, ranges.soc.min, ranges.soc.max
        ));
    }
    if !is_bank_field_missing(point.bank.soh) && !ranges.soh.contains(point.bank.soh) {
        messages.push(format!(
            "bank soh {:.1} outside [{}, {}]",
            point.bank.soh, ranges.soh.min, ranges.soh.max
        ));
    }

    for (cell, value) in point.cells.voltages.iter().enumerate() {
        if !is_missing(*value) && !ranges.voltage.contains(*value) {
            messages.push(format!(
                "cell {} voltage {:.3} outside [{}, {}]",
                cell, value, ranges.voltage.min, ranges.voltage.max
            ));
        }
    }
    for (cell, value) in point.cells.temperatures.iter().enumerate() {
        if !is_missing(*value) && !ranges.temperature.contains(*value) {
            messages.push(format!(
                "cell {} temperature {:.1} outside [{}, {}]",
                cell, value, ranges.temperature.min, ranges.temperature.max
            ));
        }
    }
    for (cell, value) in point.cells.socs.iter().enumerate() {
        if !is_missing(*value) && !ranges.soc.contains(*value) {
            messages.push(format!(
                "cell {} soc {:.1} outside [{}, {}]",
                cell, value, ranges.soc.min, ranges.soc.max
            ));
        }
    }
    for (cell, value) in point.cells.sohs.iter().enumerate() {
        if !is_missing(*value) && !ranges.soh.contains(*value) {
            messages.push(format!(
                "cell {} soh {:.1} outside [{}, {}]",
                cell, value, ranges.soh.min, ranges.soh.max
            ));
        }
    }

    messages
}
