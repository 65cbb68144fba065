//! Deterministic in-memory data source.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::DataSource;
use crate::error::{Error, Result};
use crate::format::format_iso_date;
use crate::model::{
    Alert, ConsumptionRecord, DashboardOverview, IdealValueRecord, MachineConsumption,
    MachineStatus, PredictionRecord, ReportRecord, SummaryPeriod, SummaryStat,
};
use crate::report::{DownloadReceipt, MachineSelection, ReportConfig, ReportFormat};
use crate::stats::{percent_difference, prediction_accuracy};
use crate::table::export::{csv_payload, report_columns};
use crate::table::normalize::normalize_report;

/// Days of history generated per machine.
const PAST_DAYS: u64 = 30;
/// Days of forecast generated per machine.
const FORECAST_DAYS: u64 = 6;
/// Hour and minute stamped on generated alerts, newest first.
const ALERT_TIMES: [(u32, u32); 2] = [(14, 30), (10, 15)];
/// Seed offset for per-machine consumption series.
const SERIES_SEED_OFFSET: u64 = 11;
/// Seed offset for generated reports.
const REPORT_SEED_OFFSET: u64 = 97;

/// Seeded mock of the dashboard backend.
///
/// Values are drawn from a `StdRng` seeded from the configured seed and the
/// request, so the same request always yields the same records.
#[derive(Debug, Clone)]
pub struct MockDataSource {
    seed: u64,
    today: NaiveDate,
    machines: Vec<IdealValueRecord>,
    outage: Option<String>,
}

fn machine(id: u32, machine_id: &str, name: &str, ideal: f64, tolerance: f64, status: MachineStatus) -> IdealValueRecord {
    IdealValueRecord {
        id,
        machine_id: machine_id.to_string(),
        machine_name: name.to_string(),
        ideal_consumption: ideal,
        tolerance_percentage: tolerance,
        status,
    }
}

impl MockDataSource {
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        Self {
            seed,
            today,
            machines: vec![
                machine(1, "M001", "Compressor A", 120.5, 5.0, MachineStatus::Optimal),
                machine(2, "M002", "Conveyor Belt B", 85.3, 8.0, MachineStatus::Warning),
                machine(3, "M003", "Pump C", 45.7, 3.0, MachineStatus::Critical),
                machine(4, "M004", "Cooling Unit D", 210.0, 10.0, MachineStatus::Optimal),
                machine(5, "M005", "Mixer E", 95.2, 7.0, MachineStatus::Optimal),
            ],
            outage: None,
        }
    }

    /// Makes every call fail with `reason`, as an unreachable backend would.
    pub fn with_outage(mut self, reason: impl Into<String>) -> Self {
        self.outage = Some(reason.into());
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn check(&self, what: &'static str) -> Result<()> {
        match &self.outage {
            Some(reason) => {
                log::warn!("mock source rejecting {what}: {reason}");
                Err(Error::Fetch {
                    what,
                    reason: reason.clone(),
                })
            }
            None => {
                log::debug!("mock source serving {what}");
                Ok(())
            }
        }
    }

    /// Position of `machine_id` in the machine table, or `None` if unknown.
    fn machine_index(&self, machine_id: &str) -> Option<u64> {
        self.machines
            .iter()
            .position(|m| m.machine_id == machine_id)
            .map(|i| i as u64)
    }

    fn rng_with_offset(&self, offset: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(offset))
    }

    fn known_machine(&self, machine_id: &str) -> Result<()> {
        if self.machines.iter().any(|m| m.machine_id == machine_id) {
            Ok(())
        } else {
            Err(Error::UnknownMachine(machine_id.to_string()))
        }
    }

    fn series(&self, machine_id: &str) -> MachineConsumption {
        let index = self.machine_index(machine_id).unwrap_or_default();
        let mut rng = self.rng_with_offset(SERIES_SEED_OFFSET + index);

        let past = (0..PAST_DAYS)
            .filter_map(|i| self.today.checked_sub_days(Days::new(PAST_DAYS - i)))
            .map(|date| ConsumptionRecord {
                date,
                consumption: Some(100.0 + rng.random::<f64>() * 50.0),
            })
            .collect();

        let prediction = (0..FORECAST_DAYS)
            .filter_map(|i| self.today.checked_add_days(Days::new(i + 1)))
            .map(|date| PredictionRecord {
                date,
                prediction: 100.0 + rng.random::<f64>() * 50.0,
            })
            .collect();

        MachineConsumption { past, prediction }
    }

    fn summary(period: SummaryPeriod) -> Vec<SummaryStat> {
        let table: &[(&str, f64, f64)] = match period {
            SummaryPeriod::Week => &[
                ("Mon", 740.0, 725.0),
                ("Tue", 810.0, 790.0),
                ("Wed", 765.0, 780.0),
                ("Thu", 820.0, 805.0),
                ("Fri", 790.0, 800.0),
                ("Sat", 430.0, 450.0),
                ("Sun", 380.0, 370.0),
            ],
            SummaryPeriod::Month => &[
                ("Jan", 3200.0, 3150.0),
                ("Feb", 2800.0, 2900.0),
                ("Mar", 3300.0, 3250.0),
                ("Apr", 3700.0, 3600.0),
                ("May", 3900.0, 4000.0),
            ],
            SummaryPeriod::Year => &[
                ("2021", 38_500.0, 39_000.0),
                ("2022", 40_200.0, 39_800.0),
                ("2023", 41_900.0, 42_300.0),
                ("2024", 43_100.0, 42_700.0),
                ("2025", 45_678.0, 45_200.0),
            ],
        };
        table
            .iter()
            .map(|&(name, actual, predicted)| SummaryStat {
                name: name.to_string(),
                actual,
                predicted,
            })
            .collect()
    }

    fn report(&self, config: &ReportConfig) -> Result<Vec<ReportRecord>> {
        let machine_ids: Vec<String> = match &config.machine {
            MachineSelection::All => self.machines.iter().map(|m| m.machine_id.clone()).collect(),
            MachineSelection::One(id) => {
                self.known_machine(id)?;
                vec![id.clone()]
            }
        };

        // Machine, granularity and start date each shift the stream.
        let selection = match &config.machine {
            MachineSelection::All => 0,
            MachineSelection::One(id) => self.machine_index(id).map_or(0, |i| i + 1),
        };
        let offset = REPORT_SEED_OFFSET
            + selection * 10
            + config.granularity as u64
            + (config.start_date.num_days_from_ce().max(0) as u64) * 100;
        let mut rng = self.rng_with_offset(offset);

        let mut records = Vec::new();
        for date in config.schedule()? {
            for id in &machine_ids {
                let consumption = 100.0 + rng.random::<f64>() * 50.0;
                let ideal = 100.0 + rng.random::<f64>() * 10.0;
                records.push(ReportRecord {
                    date,
                    machine: Some(id.clone()),
                    consumption,
                    ideal,
                    difference: percent_difference(consumption, ideal),
                });
            }
        }
        Ok(records)
    }

    fn overview(&self) -> DashboardOverview {
        let mut total_consumption = 0.0;
        let mut efficiencies = Vec::with_capacity(self.machines.len());
        for m in &self.machines {
            let measured: Vec<f64> = self
                .series(&m.machine_id)
                .past
                .iter()
                .filter_map(|r| r.consumption)
                .collect();
            let sum: f64 = measured.iter().sum();
            total_consumption += sum;
            if !measured.is_empty() && sum > 0.0 {
                let avg = sum / measured.len() as f64;
                efficiencies.push((m.ideal_consumption / avg * 100.0).min(100.0));
            }
        }
        let avg_efficiency = if efficiencies.is_empty() {
            0.0
        } else {
            efficiencies.iter().sum::<f64>() / efficiencies.len() as f64
        };

        let recent_alerts = self
            .machines
            .iter()
            .filter(|m| m.status != MachineStatus::Optimal)
            .zip(ALERT_TIMES.iter().cycle())
            .enumerate()
            .filter_map(|(i, (m, &(hour, minute)))| {
                let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
                Some(Alert {
                    id: i as u32 + 1,
                    machine: m.machine_name.clone(),
                    message: match m.status {
                        MachineStatus::Critical => "Consumption above threshold".to_string(),
                        _ => "Efficiency declining".to_string(),
                    },
                    timestamp: self.today.and_time(time),
                })
            })
            .collect();

        DashboardOverview {
            total_machines: self.machines.len(),
            total_consumption,
            avg_efficiency,
            prediction_accuracy: prediction_accuracy(&Self::summary(SummaryPeriod::Month))
                .unwrap_or(0.0),
            recent_alerts,
        }
    }
}

impl DataSource for MockDataSource {
    async fn fetch_machine_ids(&self) -> Result<Vec<String>> {
        self.check("machine ids")?;
        Ok(self.machines.iter().map(|m| m.machine_id.clone()).collect())
    }

    async fn fetch_machine_consumption(&self, machine_id: &str) -> Result<MachineConsumption> {
        self.check("consumption data")?;
        self.known_machine(machine_id)?;
        Ok(self.series(machine_id))
    }

    async fn fetch_ideal_values(&self) -> Result<Vec<IdealValueRecord>> {
        self.check("ideal values")?;
        Ok(self.machines.clone())
    }

    async fn fetch_summary_stats(&self, period: Option<SummaryPeriod>) -> Result<Vec<SummaryStat>> {
        self.check("summary stats")?;
        Ok(Self::summary(period.unwrap_or_default()))
    }

    async fn fetch_overview(&self) -> Result<DashboardOverview> {
        self.check("dashboard overview")?;
        Ok(self.overview())
    }

    async fn fetch_report_data(&self, config: &ReportConfig) -> Result<Vec<ReportRecord>> {
        self.check("report data")?;
        self.report(config)
    }

    async fn download_report(&self, config: &ReportConfig, format: ReportFormat) -> Result<DownloadReceipt> {
        self.check("report download")?;
        let records = self.report(config)?;
        let filename = format!(
            "{}_{}.{}",
            config.category.title().to_lowercase().replace(' ', "_"),
            format_iso_date(self.today),
            format.extension()
        );

        let payload = match format {
            ReportFormat::Csv => Some(csv_payload(&normalize_report(&records), &report_columns())?),
            ReportFormat::Pdf | ReportFormat::Excel => None,
        };
        log::info!("report download ready: {filename} ({} rows)", records.len());
        Ok(DownloadReceipt {
            format,
            filename,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ComparisonPeriod, Granularity, ReportCategory};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 12).expect("valid date")
    }

    fn source() -> MockDataSource {
        MockDataSource::new(42, today())
    }

    fn report_config(machine: MachineSelection, granularity: Granularity) -> ReportConfig {
        ReportConfig {
            machine,
            start_date: NaiveDate::from_ymd_opt(2025, 4, 12).expect("valid date"),
            end_date: today(),
            granularity,
            category: ReportCategory::Consumption,
            comparison_period: ComparisonPeriod::Previous,
        }
    }

    #[tokio::test]
    async fn consumption_spans_past_month_and_next_week() {
        let series = source()
            .fetch_machine_consumption("M001")
            .await
            .expect("known machine");
        assert_eq!(series.past.len(), 30);
        assert_eq!(series.prediction.len(), 6);
        assert_eq!(series.past.first().map(|r| r.date), today().checked_sub_days(Days::new(30)));
        assert_eq!(series.past.last().map(|r| r.date), today().checked_sub_days(Days::new(1)));
        assert_eq!(series.prediction.first().map(|r| r.date), today().checked_add_days(Days::new(1)));
        for r in &series.past {
            let c = r.consumption.unwrap_or_default();
            assert!((100.0..150.0).contains(&c), "consumption {c} out of range");
        }
    }

    #[tokio::test]
    async fn same_seed_same_data() {
        let a = source().fetch_machine_consumption("M002").await.ok();
        let b = source().fetch_machine_consumption("M002").await.ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn unknown_machine_is_an_error() {
        let err = source().fetch_machine_consumption("M999").await.err();
        assert!(matches!(err.as_ref(), Some(Error::UnknownMachine(id)) if id == "M999"));
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let down = source().with_outage("connection refused");
        let err = down.fetch_machine_ids().await.err();
        assert!(err.as_ref().is_some_and(Error::is_retryable));
        assert!(down.fetch_ideal_values().await.is_err());
    }

    #[tokio::test]
    async fn report_for_all_machines_has_row_per_machine_per_point() {
        let rows = source()
            .fetch_report_data(&report_config(MachineSelection::All, Granularity::Weekly))
            .await
            .expect("valid report");
        // 31 days -> 5 weekly points x 5 machines
        assert_eq!(rows.len(), 25);
        for r in &rows {
            assert!((100.0..110.0).contains(&r.ideal));
            assert!(r.difference.is_some());
        }
    }

    #[tokio::test]
    async fn report_rejects_unknown_machine_and_reversed_range() {
        let src = source();
        let unknown = report_config(MachineSelection::One("X1".into()), Granularity::Daily);
        assert!(src.fetch_report_data(&unknown).await.is_err());

        let mut reversed = report_config(MachineSelection::All, Granularity::Daily);
        std::mem::swap(&mut reversed.start_date, &mut reversed.end_date);
        assert!(matches!(
            src.fetch_report_data(&reversed).await,
            Err(Error::InvalidDateRange { .. })
        ));
    }

    #[tokio::test]
    async fn csv_download_carries_payload() {
        let cfg = report_config(MachineSelection::One("M003".into()), Granularity::Daily);
        let receipt = source()
            .download_report(&cfg, ReportFormat::Csv)
            .await
            .expect("download should succeed");
        assert_eq!(receipt.filename, "consumption_report_2025-05-12.csv");
        let payload = receipt.payload.unwrap_or_default();
        assert_eq!(payload.lines().count(), 1 + 31);

        let pdf = source()
            .download_report(&cfg, ReportFormat::Pdf)
            .await
            .expect("download should succeed");
        assert!(pdf.payload.is_none());
    }

    #[tokio::test]
    async fn overview_counts_machines_and_alerts() {
        let overview = source().fetch_overview().await.expect("overview");
        assert_eq!(overview.total_machines, 5);
        assert_eq!(overview.recent_alerts.len(), 2);
        assert!(overview.total_consumption > 5.0 * 30.0 * 100.0);
        assert!(overview.prediction_accuracy > 90.0 && overview.prediction_accuracy <= 100.0);
    }

    #[tokio::test]
    async fn summary_defaults_to_monthly() {
        let stats = source().fetch_summary_stats(None).await.expect("stats");
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[0].name, "Jan");
        let weekly = source()
            .fetch_summary_stats(Some(SummaryPeriod::Week))
            .await
            .expect("stats");
        assert_eq!(weekly.len(), 7);
    }

    #[tokio::test]
    async fn ideal_table_splits_three_one_one() {
        let records = source().fetch_ideal_values().await.expect("ideal values");
        let counts = crate::stats::StatusCounts::from_records(&records);
        assert_eq!((counts.total, counts.optimal, counts.warning, counts.critical), (5, 3, 1, 1));
    }

    #[tokio::test]
    async fn machines_and_reports_draw_separate_streams() {
        let src = source();
        let a = src.fetch_machine_consumption("M001").await.expect("series");
        let b = src.fetch_machine_consumption("M002").await.expect("series");
        assert_ne!(a.past, b.past);

        let daily = report_config(MachineSelection::All, Granularity::Daily);
        let weekly = report_config(MachineSelection::All, Granularity::Weekly);
        let first_daily = src.fetch_report_data(&daily).await.expect("report");
        let first_weekly = src.fetch_report_data(&weekly).await.expect("report");
        assert_ne!(first_daily[0].consumption, first_weekly[0].consumption);

        let reseeded = MockDataSource::new(43, src.today());
        let c = reseeded.fetch_machine_consumption("M001").await.expect("series");
        assert_ne!(a.past, c.past);
    }
}
