//! Narrow-layout temporal alignment
//!
//! The narrow site layout exports one file per signal kind per group per day,
//! so a group's canonical series has to be reconstructed by aligning rows from
//! several batches onto a shared timeline. Alignment takes the outer union of
//! normalized timestamps across every kind: a group carrying only some kinds
//! still yields points, with the missing kinds' bank fields at their zero
//! defaults and their cell arrays empty.

use super::timestamp::normalize_timestamp;
use super::{DroppedRow, TransformOutcome};
use crate::app::models::{BankTimeSeries, RawBatch, RawRow, SignalKind, TimeSeriesPoint};
use crate::app::services::statistics;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Align narrow-layout batches for one group into a canonical series.
///
/// Batches are grouped by signal kind; within one kind, the first row seen
/// for a normalized timestamp wins and later duplicates are silently
/// discarded. For every timestamp in the union, the kinds present at that
/// timestamp each copy their fields into the point under construction, and
/// power is derived once the merge is complete. The keyed merge yields a
/// strictly increasing, deduplicated timeline by construction.
pub fn align_narrow(unit_id: &str, batches: &[RawBatch]) -> TransformOutcome {
    let mut dropped_rows = Vec::new();

    // Per kind: normalized timestamp -> first row seen
    let mut by_kind: HashMap<SignalKind, BTreeMap<DateTime<Utc>, &RawRow>> = HashMap::new();

    for batch in batches {
        let Some(kind) = batch.kind else {
            warn!(
                "Skipping untagged batch for group {}: narrow alignment requires a signal kind",
                unit_id
            );
            continue;
        };
        let source_path = batch
            .source_path
            .as_ref()
            .map(|path| path.display().to_string());
        let slots = by_kind.entry(kind).or_default();

        for (row_index, row) in batch.rows.iter().enumerate() {
            let timestamp = match normalize_timestamp(&row.timestamp) {
                Ok(ts) => ts,
                Err(error) => {
                    warn!(
                        "Dropping {} row {} of group {}: {}",
                        kind, row_index, unit_id, error
                    );
                    dropped_rows.push(DroppedRow {
                        row_index,
                        timestamp: row.timestamp.clone(),
                        reason: error.to_string(),
                        kind: Some(kind),
                        source_path: source_path.clone(),
                    });
                    continue;
                }
            };
            // First row wins; later duplicates within the kind are discarded.
            slots.entry(timestamp).or_insert(row);
        }
    }

    // Outer union of timestamps across every kind present
    let timeline: BTreeSet<DateTime<Utc>> = by_kind
        .values()
        .flat_map(|slots| slots.keys().copied())
        .collect();

    let mut points = Vec::with_capacity(timeline.len());
    for timestamp in timeline {
        let mut point = TimeSeriesPoint::zeroed(timestamp);

        for kind in SignalKind::all() {
            let Some(row) = by_kind.get(&kind).and_then(|slots| slots.get(&timestamp)) else {
                continue;
            };
            merge_kind(&mut point, kind, row);
        }

        point.bank.derive_power();
        points.push(point);
    }

    debug!(
        "Aligned {} points for group {} from {} signal kinds",
        points.len(),
        unit_id,
        by_kind.len()
    );

    let statistics = statistics::bank_statistics(&points);
    TransformOutcome {
        series: BankTimeSeries {
            bank_id: unit_id.to_string(),
            points,
            statistics,
        },
        dropped_rows,
    }
}

/// Copy one kind's fields into the point under construction.
///
/// This is the single dispatch point for signal-kind semantics: the voltage
/// kind carries the bank-level electrical scalars alongside its cell array,
/// while the remaining kinds derive their bank scalar as the mean of their
/// cells.
fn merge_kind(point: &mut TimeSeriesPoint, kind: SignalKind, row: &RawRow) {
    match kind {
        SignalKind::Voltage => {
            point.bank.voltage = row.bank_voltage.unwrap_or(0.0);
            point.bank.current = row.bank_current.unwrap_or(0.0);
            if let Some(values) = row.cell_series(SignalKind::Voltage) {
                point.cells.voltages = values.to_vec();
            }
        }
        SignalKind::Temperature => {
            if let Some(values) = row.cell_series(SignalKind::Temperature) {
                point.bank.temperature = statistics::mean(values);
                point.cells.temperatures = values.to_vec();
            }
        }
        SignalKind::Soc => {
            if let Some(values) = row.cell_series(SignalKind::Soc) {
                point.bank.soc = statistics::mean(values);
                point.cells.socs = values.to_vec();
            }
        }
        SignalKind::State => {
            if let Some(values) = row.cell_series(SignalKind::State) {
                point.bank.soh = statistics::mean(values);
                point.cells.sohs = values.to_vec();
            }
        }
    }
}
