//! Temporal alignment and transformation of raw telemetry rows
//!
//! This module turns collaborator-supplied [`RawBatch`](crate::app::models::RawBatch)
//! values into canonical [`BankTimeSeries`](crate::app::models::BankTimeSeries) form.
//!
//! # Architecture
//!
//! - [`timestamp`] - Multi-format timestamp normalization to UTC
//! - [`wide`] - Wide-layout transformation (one batch carries all signal kinds)
//! - [`narrow`] - Narrow-layout alignment (per-kind batches merged onto a
//!   shared timeline via a timestamp-keyed outer union)
//! - [`output`] - Standardized-output assembly and structural rejection
//!
//! # Layout Semantics
//!
//! The wide layout emits one point per source row. The narrow layout takes the
//! union of timestamps across every signal kind present for a group - a group
//! carrying only two of the four kinds still yields points, with the missing
//! kinds' bank fields at their zero defaults and cell arrays empty. Within one
//! kind the first row seen for a timestamp wins; later duplicates are
//! discarded.

pub mod narrow;
pub mod output;
pub mod timestamp;
pub mod wide;

#[cfg(test)]
pub mod tests;

pub use narrow::align_narrow;
pub use output::{build_standard_data, validate_output};
pub use timestamp::normalize_timestamp;
pub use wide::transform_wide;

use crate::app::models::{BankTimeSeries, SignalKind};
use serde::{Deserialize, Serialize};

/// One raw row dropped during transformation, kept for session reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    /// Index of the row within its source batch
    pub row_index: usize,
    /// Original timestamp string of the dropped row
    pub timestamp: String,
    /// Why the row was dropped
    pub reason: String,
    /// Signal kind of the source batch, for narrow-layout rows
    pub kind: Option<SignalKind>,
    /// Source path of the batch, when the scanner provided one
    pub source_path: Option<String>,
}

/// Transformation output: the canonical series plus rows that fell out
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub series: BankTimeSeries,
    pub dropped_rows: Vec<DroppedRow>,
}
