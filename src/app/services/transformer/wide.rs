//! Wide-layout transformation
//!
//! One wide-layout batch carries every signal kind for a bank, so each source
//! row maps to exactly one canonical point. Rows whose timestamps cannot be
//! normalized are dropped and reported, never fatal on their own.

use super::timestamp::normalize_timestamp;
use super::{DroppedRow, TransformOutcome};
use crate::app::models::{BankTimeSeries, RawBatch, SignalKind, TimeSeriesPoint};
use crate::app::services::statistics;
use tracing::{debug, warn};

/// Transform one wide-layout batch into a canonical series.
///
/// Per row: normalize the timestamp, copy bank-level scalars (absent scalars
/// default to zero), copy per-cell arrays, average the temperature cells into
/// the bank-level temperature, and derive power. Duplicate timestamps keep the
/// first row encountered; the output is sorted ascending.
pub fn transform_wide(batch: &RawBatch) -> TransformOutcome {
    let mut points: Vec<TimeSeriesPoint> = Vec::with_capacity(batch.rows.len());
    let mut dropped_rows = Vec::new();
    let source_path = batch
        .source_path
        .as_ref()
        .map(|path| path.display().to_string());

    for (row_index, row) in batch.rows.iter().enumerate() {
        let timestamp = match normalize_timestamp(&row.timestamp) {
            Ok(ts) => ts,
            Err(error) => {
                warn!(
                    "Dropping row {} of bank {}: {}",
                    row_index, batch.unit_id, error
                );
                dropped_rows.push(DroppedRow {
                    row_index,
                    timestamp: row.timestamp.clone(),
                    reason: error.to_string(),
                    kind: None,
                    source_path: source_path.clone(),
                });
                continue;
            }
        };

        let mut point = TimeSeriesPoint::zeroed(timestamp);
        point.bank.voltage = row.bank_voltage.unwrap_or(0.0);
        point.bank.current = row.bank_current.unwrap_or(0.0);
        point.bank.soc = row.bank_soc.unwrap_or(0.0);
        point.bank.soh = row.bank_soh.unwrap_or(0.0);

        if let Some(values) = row.cell_series(SignalKind::Voltage) {
            point.cells.voltages = values.to_vec();
        }
        if let Some(values) = row.cell_series(SignalKind::Temperature) {
            point.cells.temperatures = values.to_vec();
            point.bank.temperature = statistics::mean(values);
        }
        if let Some(values) = row.cell_series(SignalKind::Soc) {
            point.cells.socs = values.to_vec();
        }
        if let Some(values) = row.cell_series(SignalKind::State) {
            point.cells.sohs = values.to_vec();
        }

        point.bank.derive_power();
        points.push(point);
    }

    // Stable sort keeps encounter order among equal timestamps, so dedup
    // retains the first row seen for each timestamp.
    points.sort_by_key(|point| point.timestamp);
    let before = points.len();
    points.dedup_by_key(|point| point.timestamp);
    if points.len() < before {
        debug!(
            "Discarded {} duplicate-timestamp rows for bank {}",
            before - points.len(),
            batch.unit_id
        );
    }

    let statistics = statistics::bank_statistics(&points);
    TransformOutcome {
        series: BankTimeSeries {
            bank_id: batch.unit_id.clone(),
            points,
            statistics,
        },
        dropped_rows,
    }
}
