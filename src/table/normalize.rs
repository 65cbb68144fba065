//! Record normalizer: raw source records → display rows.

use super::NO_VALUE;
use super::row::{ChartPoint, ConsumptionRow, IdealValueRow, ReportRow};
use crate::format::{format_date, format_fixed, format_iso_date, format_signed_percent};
use crate::model::{ConsumptionRecord, IdealValueRecord, PredictionRecord, ReportRecord};
use crate::stats::{DifferenceBand, percent_difference};

fn display_or_dash(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NO_VALUE.to_string(), |v| format_fixed(v, decimals))
}

fn percent_or_dash(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NO_VALUE.to_string(), |v| format_signed_percent(v, decimals))
}

/// Builds the consumption table: every past record, then every prediction.
///
/// A prediction picks up the first past record with the same calendar date.
/// Its difference is `(prediction - actual) / actual * 100`, or no value
/// when there is no match or the actual is absent or zero.
pub fn normalize_consumption(
    past: &[ConsumptionRecord],
    predictions: &[PredictionRecord],
) -> Vec<ConsumptionRow> {
    let mut rows = Vec::with_capacity(past.len() + predictions.len());

    for record in past {
        rows.push(ConsumptionRow {
            date: record.date,
            formatted_date: format_date(record.date),
            consumption: record.consumption,
            consumption_display: display_or_dash(record.consumption, 2),
            prediction: None,
            prediction_display: NO_VALUE.to_string(),
            difference: None,
            difference_display: NO_VALUE.to_string(),
            is_prediction: false,
        });
    }

    for record in predictions {
        let actual = past
            .iter()
            .find(|p| p.date == record.date)
            .and_then(|p| p.consumption);
        let difference = actual.and_then(|a| percent_difference(record.prediction, a));

        rows.push(ConsumptionRow {
            date: record.date,
            formatted_date: format_date(record.date),
            consumption: actual,
            consumption_display: display_or_dash(actual, 2),
            prediction: Some(record.prediction),
            prediction_display: format_fixed(record.prediction, 2),
            difference,
            difference_display: percent_or_dash(difference, 1),
            is_prediction: true,
        });
    }

    rows
}

/// Builds the chart series: past points, then forecast points.
pub fn chart_series(past: &[ConsumptionRecord], predictions: &[PredictionRecord]) -> Vec<ChartPoint> {
    let actual = past.iter().map(|r| ChartPoint {
        date: r.date,
        formatted_date: format_date(r.date),
        consumption: r.consumption,
        prediction: None,
    });
    let forecast = predictions.iter().map(|r| ChartPoint {
        date: r.date,
        formatted_date: format_date(r.date),
        consumption: None,
        prediction: Some(r.prediction),
    });
    actual.chain(forecast).collect()
}

pub fn normalize_ideal_values(records: &[IdealValueRecord]) -> Vec<IdealValueRow> {
    records
        .iter()
        .map(|r| IdealValueRow {
            id: r.id,
            machine_id: r.machine_id.clone(),
            machine_name: r.machine_name.clone(),
            ideal_consumption: r.ideal_consumption,
            ideal_display: format_fixed(r.ideal_consumption, 2),
            tolerance_percentage: r.tolerance_percentage,
            tolerance_display: format!("{}%", r.tolerance_percentage),
            status: r.status,
        })
        .collect()
}

/// Report lines carry a two-decimal signed difference.
///
/// A missing difference is recomputed from consumption and ideal.
pub fn normalize_report(records: &[ReportRecord]) -> Vec<ReportRow> {
    records
        .iter()
        .map(|r| {
            let difference = r
                .difference
                .filter(|d| d.is_finite())
                .or_else(|| percent_difference(r.consumption, r.ideal));
            ReportRow {
                date: r.date,
                date_display: format_iso_date(r.date),
                machine: r.machine.clone(),
                consumption: r.consumption,
                consumption_display: format_fixed(r.consumption, 2),
                ideal: r.ideal,
                ideal_display: format_fixed(r.ideal, 2),
                difference,
                difference_display: percent_or_dash(difference, 2),
                band: difference.map_or(DifferenceBand::Normal, DifferenceBand::from_percent),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::MachineStatus;
    use crate::stats::DifferenceTone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).expect("valid date")
    }

    #[test]
    fn matched_prediction_gets_signed_difference() {
        let past = vec![ConsumptionRecord { date: day(1), consumption: Some(100.0) }];
        let predictions = vec![PredictionRecord { date: day(1), prediction: 110.0 }];

        let rows = normalize_consumption(&past, &predictions);
        assert_eq!(rows.len(), 2);

        let forecast = &rows[1];
        assert!(forecast.is_prediction);
        assert_eq!(forecast.difference_display, "+10.0%");
        assert_eq!(forecast.consumption_display, "100.00");
        assert_eq!(forecast.prediction_display, "110.00");
        assert_eq!(forecast.difference_tone(), Some(DifferenceTone::Over));
    }

    #[test]
    fn unmatched_prediction_has_no_difference() {
        let past = vec![ConsumptionRecord { date: day(1), consumption: Some(100.0) }];
        let predictions = vec![PredictionRecord { date: day(2), prediction: 90.0 }];

        let rows = normalize_consumption(&past, &predictions);
        assert_eq!(rows[1].difference, None);
        assert_eq!(rows[1].difference_display, NO_VALUE);
        assert_eq!(rows[1].consumption_display, NO_VALUE);
    }

    #[test]
    fn zero_actual_is_guarded() {
        let past = vec![ConsumptionRecord { date: day(3), consumption: Some(0.0) }];
        let predictions = vec![PredictionRecord { date: day(3), prediction: 12.0 }];

        let rows = normalize_consumption(&past, &predictions);
        assert_eq!(rows[1].consumption, Some(0.0));
        assert_eq!(rows[1].difference, None);
        assert_eq!(rows[1].difference_display, NO_VALUE);
    }

    #[test]
    fn absent_past_consumption_formats_as_dash() {
        let past = vec![ConsumptionRecord { date: day(4), consumption: None }];
        let rows = normalize_consumption(&past, &[]);
        assert_eq!(rows[0].consumption_display, NO_VALUE);
        assert_eq!(rows[0].formatted_date, "May 04, 2025");
    }

    #[test]
    fn preserves_input_order() {
        let past = vec![
            ConsumptionRecord { date: day(9), consumption: Some(1.0) },
            ConsumptionRecord { date: day(2), consumption: Some(2.0) },
        ];
        let predictions = vec![
            PredictionRecord { date: day(20), prediction: 3.0 },
            PredictionRecord { date: day(11), prediction: 4.0 },
        ];
        let dates: Vec<NaiveDate> = normalize_consumption(&past, &predictions)
            .iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![day(9), day(2), day(20), day(11)]);
    }

    #[test]
    fn ideal_values_keep_raw_and_display() {
        let records = vec![IdealValueRecord {
            id: 1,
            machine_id: "M001".into(),
            machine_name: "Compressor A".into(),
            ideal_consumption: 120.5,
            tolerance_percentage: 5.0,
            status: MachineStatus::Optimal,
        }];
        let rows = normalize_ideal_values(&records);
        assert_eq!(rows[0].ideal_display, "120.50");
        assert_eq!(rows[0].tolerance_display, "5%");
        assert_eq!(rows[0].ideal_consumption, 120.5);
    }

    #[test]
    fn report_rows_recompute_missing_difference_and_band() {
        let records = vec![
            ReportRecord {
                date: day(1),
                machine: Some("M002".into()),
                consumption: 112.0,
                ideal: 100.0,
                difference: None,
            },
            ReportRecord {
                date: day(2),
                machine: None,
                consumption: 50.0,
                ideal: 0.0,
                difference: None,
            },
        ];
        let rows = normalize_report(&records);
        assert_eq!(rows[0].difference_display, "+12.00%");
        assert_eq!(rows[0].band, DifferenceBand::High);
        assert_eq!(rows[0].date_display, "2025-05-01");
        assert_eq!(rows[1].difference, None);
        assert_eq!(rows[1].band, DifferenceBand::Normal);
    }
}
