//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Days, NaiveDate};

use energy_dash::model::{
    ConsumptionRecord, IdealValueRecord, MachineStatus, PredictionRecord, ReportRecord,
};
use energy_dash::source::MockDataSource;

/// Fixed "today" used across integration tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 12).expect("valid date")
}

/// Mock source seeded with 42 and pinned to [`today`].
pub fn mock_source() -> MockDataSource {
    MockDataSource::new(42, today())
}

/// `n` days of history ending yesterday. Every fifth day has no reading.
pub fn past_records(n: u64) -> Vec<ConsumptionRecord> {
    (0..n)
        .map(|i| ConsumptionRecord {
            date: today() - Days::new(n - i),
            consumption: (i % 5 != 4).then(|| 100.0 + (i * 7 % 50) as f64),
        })
        .collect()
}

/// Forecasts for the last three past days plus `ahead` future days.
pub fn prediction_records(ahead: u64) -> Vec<PredictionRecord> {
    (0..3 + ahead)
        .map(|i| PredictionRecord {
            date: today() - Days::new(3) + Days::new(i),
            prediction: 120.0 + (i * 3) as f64,
        })
        .collect()
}

/// The five-machine ideal-values table.
pub fn ideal_records() -> Vec<IdealValueRecord> {
    let row = |id, machine_id: &str, name: &str, ideal, tol, status| IdealValueRecord {
        id,
        machine_id: machine_id.to_string(),
        machine_name: name.to_string(),
        ideal_consumption: ideal,
        tolerance_percentage: tol,
        status,
    };
    vec![
        row(1, "M001", "Compressor A", 120.5, 5.0, MachineStatus::Optimal),
        row(2, "M002", "Conveyor Belt B", 85.3, 8.0, MachineStatus::Warning),
        row(3, "M003", "Pump C", 45.7, 3.0, MachineStatus::Critical),
        row(4, "M004", "Cooling Unit D", 210.0, 10.0, MachineStatus::Optimal),
        row(5, "M005", "Mixer E", 95.2, 7.0, MachineStatus::Optimal),
    ]
}

/// Report records whose consumption cycles through a few fixed offsets
/// from an ideal of 100, so the difference bands are all represented.
pub fn report_records(n: u64) -> Vec<ReportRecord> {
    const OFFSETS: [f64; 4] = [0.0, 6.0, 12.0, -3.0];
    (0..n)
        .map(|i| {
            let consumption = 100.0 + OFFSETS[(i % 4) as usize];
            ReportRecord {
                date: today() - Days::new(n - i),
                machine: Some(format!("M00{}", i % 5 + 1)),
                consumption,
                ideal: 100.0,
                difference: None,
            }
        })
        .collect()
}
