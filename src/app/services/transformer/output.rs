//! Standardized-output assembly and structural rejection
//!
//! Transformation results are wrapped into [`StandardBatteryData`] with their
//! covered time range; the summary subscores stay zeroed until the validator
//! fills them. Structurally broken output (no banks, empty banks, disordered
//! timestamps) is rejected before it can reach downstream consumers.

use crate::app::models::{BankTimeSeries, DataSummary, StandardBatteryData, TimeRange, UnitType};
use crate::{Error, Result};

/// Assemble standardized output for one logical unit.
///
/// The time range spans the earliest and latest point across all banks; a
/// unit with no points carries no range.
pub fn build_standard_data(
    unit_id: impl Into<String>,
    unit_type: UnitType,
    banks: Vec<BankTimeSeries>,
) -> StandardBatteryData {
    let start = banks
        .iter()
        .filter_map(|bank| bank.points.first())
        .map(|point| point.timestamp)
        .min();
    let end = banks
        .iter()
        .filter_map(|bank| bank.points.last())
        .map(|point| point.timestamp)
        .max();

    let time_range = match (start, end) {
        (Some(start), Some(end)) => Some(TimeRange { start, end }),
        _ => None,
    };

    StandardBatteryData {
        unit_id: unit_id.into(),
        unit_type,
        banks,
        time_range,
        summary: DataSummary::default(),
    }
}

/// Reject structurally invalid standardized output.
///
/// Fails with an invalid-result error when the unit has no banks, any bank has
/// zero points, or any bank's timestamps are not strictly increasing.
pub fn validate_output(data: &StandardBatteryData) -> Result<()> {
    if data.banks.is_empty() {
        return Err(Error::invalid_result(format!(
            "Unit {} produced no banks",
            data.unit_id
        )));
    }

    for bank in &data.banks {
        if bank.points.is_empty() {
            return Err(Error::invalid_result(format!(
                "Bank {} of unit {} has zero points",
                bank.bank_id, data.unit_id
            )));
        }
        if !bank.is_strictly_ordered() {
            return Err(Error::invalid_result(format!(
                "Bank {} of unit {} has timestamps that are not strictly increasing",
                bank.bank_id, data.unit_id
            )));
        }
    }

    Ok(())
}
