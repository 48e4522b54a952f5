//! Tests for validation, anomaly detection, and quality scoring


use crate::app::models::{
    BankStatistics, BankTimeSeries, StandardBatteryData, TimeSeriesPoint, UnitType,
};
use crate::app::services::transformer::build_standard_data;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Base timestamp shared by validator tests
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
}

/// A healthy point: every bank field populated and in range
pub fn healthy_point(offset_minutes: i64) -> TimeSeriesPoint {
    let mut point = TimeSeriesPoint::zeroed(base_time() + Duration::minutes(offset_minutes));
    point.bank.voltage = 770.0;
    point.bank.current = -5.0;
    point.bank.soc = 50.0;
    point.bank.soh = 95.0;
    point.bank.temperature = 25.0;
    point.bank.derive_power();
    point
}

/// Wrap points into standardized data for one bank
pub fn unit_with_points(points: Vec<TimeSeriesPoint>) -> StandardBatteryData {
    build_standard_data(
        "unit-1",
        UnitType::Bank,
        vec![BankTimeSeries {
            bank_id: "bank-1".to_string(),
            points,
            statistics: BankStatistics::default(),
        }],
    )
}
