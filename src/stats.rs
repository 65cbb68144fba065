//! Aggregate statistics for dashboard cards and report summaries.
//!
//! Every percentage here is computed as `(measured - reference) / reference`,
//! so a positive value always means consumption above its reference.

use std::fmt;

use serde::Serialize;

use crate::format::{format_fixed, format_percent, format_signed_percent};
use crate::model::{IdealValueRecord, MachineConsumption, MachineStatus, ReportRecord, SummaryStat};

/// Percent deviation of `value` from `reference`.
///
/// Returns `None` when the reference is zero or either input is not finite,
/// so callers never see `inf` or `NaN`.
///
/// ```
/// use energy_dash::stats::percent_difference;
///
/// assert_eq!(percent_difference(110.0, 100.0), Some(10.0));
/// assert_eq!(percent_difference(5.0, 0.0), None);
/// ```
pub fn percent_difference(value: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 || !reference.is_finite() || !value.is_finite() {
        return None;
    }
    Some((value - reference) / reference * 100.0)
}

/// Direction of a deviation relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceTone {
    /// Above the reference; unfavourable for consumption.
    Over,
    /// Below the reference; favourable for consumption.
    Under,
    Even,
}

impl DifferenceTone {
    pub fn from_percent(pct: f64) -> Self {
        if pct > 0.0 {
            DifferenceTone::Over
        } else if pct < 0.0 {
            DifferenceTone::Under
        } else {
            DifferenceTone::Even
        }
    }
}

/// Severity bucket of a report line's deviation from ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceBand {
    /// At most 5% over ideal, or under it.
    Normal,
    /// More than 5% and at most 10% over ideal.
    Elevated,
    /// More than 10% over ideal.
    High,
}

impl DifferenceBand {
    pub fn from_percent(pct: f64) -> Self {
        if pct > 10.0 {
            DifferenceBand::High
        } else if pct > 5.0 {
            DifferenceBand::Elevated
        } else {
            DifferenceBand::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifferenceBand::Normal => "normal",
            DifferenceBand::Elevated => "elevated",
            DifferenceBand::High => "high",
        }
    }
}

/// Summary cards for a single machine's consumption page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionStats {
    pub avg_consumption: f64,
    pub max_consumption: f64,
    pub avg_prediction: Option<f64>,
    /// Average prediction relative to average consumption, in percent.
    pub trend_pct: Option<f64>,
}

impl ConsumptionStats {
    /// Computes stats over the measured days that carry a value.
    pub fn from_series(series: &MachineConsumption) -> Self {
        let measured: Vec<f64> = series.past.iter().filter_map(|r| r.consumption).collect();
        if measured.is_empty() {
            return Self {
                avg_consumption: 0.0,
                max_consumption: 0.0,
                avg_prediction: None,
                trend_pct: None,
            };
        }

        let avg_consumption = measured.iter().sum::<f64>() / measured.len() as f64;
        let max_consumption = measured.iter().copied().fold(f64::MIN, f64::max);

        let avg_prediction = if series.prediction.is_empty() {
            None
        } else {
            let total: f64 = series.prediction.iter().map(|p| p.prediction).sum();
            Some(total / series.prediction.len() as f64)
        };
        let trend_pct = avg_prediction.and_then(|p| percent_difference(p, avg_consumption));

        Self {
            avg_consumption,
            max_consumption,
            avg_prediction,
            trend_pct,
        }
    }

    pub fn trend_tone(&self) -> Option<DifferenceTone> {
        self.trend_pct.map(DifferenceTone::from_percent)
    }
}

impl fmt::Display for ConsumptionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average consumption:   {} kWh", format_fixed(self.avg_consumption, 2))?;
        writeln!(f, "Peak consumption:      {} kWh", format_fixed(self.max_consumption, 2))?;
        match self.avg_prediction {
            Some(p) => writeln!(f, "Average predicted:     {} kWh", format_fixed(p, 2))?,
            None => writeln!(f, "Average predicted:     -")?,
        }
        match self.trend_pct {
            Some(t) => write!(f, "Trend:                 {}", format_signed_percent(t, 1)),
            None => write!(f, "Trend:                 -"),
        }
    }
}

/// Efficiency verdict for a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyStatus {
    Good,
    Warning,
    Bad,
}

impl EfficiencyStatus {
    /// Below 85% is bad, below 90% a warning.
    pub fn from_efficiency(pct: f64) -> Self {
        if pct < 85.0 {
            EfficiencyStatus::Bad
        } else if pct < 90.0 {
            EfficiencyStatus::Warning
        } else {
            EfficiencyStatus::Good
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EfficiencyStatus::Good => "Excellent performance",
            EfficiencyStatus::Warning => "Some optimization possible",
            EfficiencyStatus::Bad => "Needs improvement",
        }
    }
}

/// Totals and efficiency over a generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_consumption: f64,
    pub avg_consumption: f64,
    /// Total ideal over total consumption, in percent.
    pub efficiency_pct: Option<f64>,
    pub efficiency_status: Option<EfficiencyStatus>,
}

impl ReportSummary {
    /// Returns `None` for an empty report.
    pub fn from_records(records: &[ReportRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let total_consumption: f64 = records.iter().map(|r| r.consumption).sum();
        let total_ideal: f64 = records.iter().map(|r| r.ideal).sum();
        let efficiency_pct = if total_consumption > 0.0 {
            Some(total_ideal / total_consumption * 100.0)
        } else {
            None
        };

        Some(Self {
            total_consumption,
            avg_consumption: total_consumption / records.len() as f64,
            efficiency_pct,
            efficiency_status: efficiency_pct.map(EfficiencyStatus::from_efficiency),
        })
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Report Summary ---")?;
        writeln!(f, "Total consumption:     {} kWh", format_fixed(self.total_consumption, 2))?;
        writeln!(f, "Average consumption:   {} kWh", format_fixed(self.avg_consumption, 2))?;
        match (self.efficiency_pct, self.efficiency_status) {
            (Some(pct), Some(status)) => write!(
                f,
                "Efficiency:            {} ({})",
                format_percent(pct),
                status.description()
            ),
            _ => write!(f, "Efficiency:            -"),
        }
    }
}

/// Machine counts per status, shown above the ideal-values table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub optimal: usize,
    pub warning: usize,
    pub critical: usize,
}

impl StatusCounts {
    pub fn from_records(records: &[IdealValueRecord]) -> Self {
        records.iter().fold(
            StatusCounts {
                total: records.len(),
                ..Default::default()
            },
            |mut counts, r| {
                match r.status {
                    MachineStatus::Optimal => counts.optimal += 1,
                    MachineStatus::Warning => counts.warning += 1,
                    MachineStatus::Critical => counts.critical += 1,
                }
                counts
            },
        )
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Machines: {}  Optimal: {}  Warning: {}  Critical: {}",
            self.total, self.optimal, self.warning, self.critical
        )
    }
}

/// Forecast accuracy as `100 - mean absolute percent error`, floored at zero.
///
/// Buckets with a zero actual are skipped. Returns `None` if nothing remains.
pub fn prediction_accuracy(stats: &[SummaryStat]) -> Option<f64> {
    let errors: Vec<f64> = stats
        .iter()
        .filter_map(|s| percent_difference(s.predicted, s.actual))
        .map(f64::abs)
        .collect();
    if errors.is_empty() {
        return None;
    }
    let mape = errors.iter().sum::<f64>() / errors.len() as f64;
    Some((100.0 - mape).max(0.0))
}
