//! Raw records supplied by the data source.
//!
//! These are immutable once produced; the table pipeline derives its own
//! display rows from them and never writes back.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One day of measured consumption for a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub date: NaiveDate,
    /// Measured usage in kWh. `None` when the meter reported nothing.
    pub consumption: Option<f64>,
}

/// One day of forecast consumption for a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    /// Forecast usage in kWh.
    pub prediction: f64,
}

/// Historical and forecast series for a single machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineConsumption {
    pub past: Vec<ConsumptionRecord>,
    pub prediction: Vec<PredictionRecord>,
}

/// Health classification of a machine, computed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Optimal,
    Warning,
    Critical,
}

impl MachineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MachineStatus::Optimal => "optimal",
            MachineStatus::Warning => "warning",
            MachineStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimal" => Ok(MachineStatus::Optimal),
            "warning" => Ok(MachineStatus::Warning),
            "critical" => Ok(MachineStatus::Critical),
            other => Err(Error::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Reference consumption for one monitored machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealValueRecord {
    pub id: u32,
    pub machine_id: String,
    pub machine_name: String,
    /// Ideal daily consumption (kWh).
    pub ideal_consumption: f64,
    /// Allowed deviation from the ideal, in percent.
    pub tolerance_percentage: f64,
    pub status: MachineStatus,
}

/// Aggregation window for summary statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl FromStr for SummaryPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(SummaryPeriod::Week),
            "month" => Ok(SummaryPeriod::Month),
            "year" => Ok(SummaryPeriod::Year),
            other => Err(Error::InvalidValue {
                field: "period",
                value: other.to_string(),
            }),
        }
    }
}

/// Actual vs. predicted totals for one bucket (a weekday, month, or year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub name: String,
    pub actual: f64,
    pub predicted: f64,
}

/// One line of a generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub date: NaiveDate,
    pub machine: Option<String>,
    pub consumption: f64,
    pub ideal: f64,
    /// Percent deviation of `consumption` from `ideal`.
    pub difference: Option<f64>,
}

/// Notification raised for a machine behaving out of the ordinary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u32,
    pub machine: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_machines: usize,
    /// Total consumption over the past window (kWh).
    pub total_consumption: f64,
    /// Average efficiency across machines (percent).
    pub avg_efficiency: f64,
    /// Accuracy of the forecasts against measured values (percent).
    pub prediction_accuracy: f64,
    pub recent_alerts: Vec<Alert>,
}
