//! Tests for the transformation and alignment service


use crate::app::models::{CellSeries, RawRow, SignalKind};

/// Build a wide-layout row carrying every signal kind
pub fn wide_row(
    timestamp: &str,
    voltage: f64,
    current: f64,
    soc: f64,
    soh: f64,
    cell_voltages: Vec<f64>,
    cell_temps: Vec<f64>,
) -> RawRow {
    RawRow {
        timestamp: timestamp.to_string(),
        bank_voltage: Some(voltage),
        bank_current: Some(current),
        bank_soc: Some(soc),
        bank_soh: Some(soh),
        cells: vec![
            CellSeries::new(SignalKind::Voltage, cell_voltages),
            CellSeries::new(SignalKind::Temperature, cell_temps),
        ],
    }
}

/// Build a narrow-layout row carrying one signal kind
pub fn narrow_row(timestamp: &str, kind: SignalKind, values: Vec<f64>) -> RawRow {
    let mut row = RawRow::new(timestamp);
    if kind == SignalKind::Voltage {
        // The voltage export also carries the bank-level electrical scalars
        row.bank_voltage = Some(values.iter().sum());
        row.bank_current = Some(0.0);
    }
    row.cells.push(CellSeries::new(kind, values));
    row
}
