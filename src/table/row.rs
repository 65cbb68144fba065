//! Render-ready row shapes for each table.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::{SortValue, TableRow};
use crate::error::Error;
use crate::model::MachineStatus;
use crate::stats::{DifferenceBand, DifferenceTone};

/// Whether a consumption row is measured history or a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Actual,
    Prediction,
}

impl FromStr for RowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actual" => Ok(RowKind::Actual),
            "prediction" => Ok(RowKind::Prediction),
            other => Err(Error::InvalidValue {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// One line of the actual-vs-predicted consumption table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionRow {
    pub date: NaiveDate,
    pub formatted_date: String,
    pub consumption: Option<f64>,
    pub consumption_display: String,
    pub prediction: Option<f64>,
    pub prediction_display: String,
    /// Prediction relative to the same-day actual, in percent.
    pub difference: Option<f64>,
    pub difference_display: String,
    pub is_prediction: bool,
}

impl ConsumptionRow {
    pub fn difference_tone(&self) -> Option<DifferenceTone> {
        self.difference.map(DifferenceTone::from_percent)
    }
}

/// One point of the actual-vs-predicted chart series.
///
/// Unlike [`ConsumptionRow`], a forecast point never carries the same-day
/// actual: each point holds exactly one of the two values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub formatted_date: String,
    pub consumption: Option<f64>,
    pub prediction: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionField {
    Date,
    Consumption,
    Prediction,
    Difference,
}

impl FromStr for ConsumptionField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(ConsumptionField::Date),
            "consumption" => Ok(ConsumptionField::Consumption),
            "prediction" => Ok(ConsumptionField::Prediction),
            "difference" => Ok(ConsumptionField::Difference),
            other => Err(Error::InvalidSortField(other.to_string())),
        }
    }
}

impl TableRow for ConsumptionRow {
    type Field = ConsumptionField;
    type Category = RowKind;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.formatted_date.as_str()]
    }

    fn category(&self) -> RowKind {
        if self.is_prediction {
            RowKind::Prediction
        } else {
            RowKind::Actual
        }
    }

    fn sort_value(&self, field: ConsumptionField) -> SortValue<'_> {
        match field {
            ConsumptionField::Date => SortValue::Date(self.date),
            ConsumptionField::Consumption => SortValue::Number(self.consumption),
            ConsumptionField::Prediction => SortValue::Number(self.prediction),
            ConsumptionField::Difference => SortValue::Number(self.difference),
        }
    }
}

/// One line of the per-machine ideal values table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealValueRow {
    pub id: u32,
    pub machine_id: String,
    pub machine_name: String,
    pub ideal_consumption: f64,
    pub ideal_display: String,
    pub tolerance_percentage: f64,
    pub tolerance_display: String,
    pub status: MachineStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdealValueField {
    Id,
    MachineId,
    MachineName,
    IdealConsumption,
    TolerancePercentage,
    Status,
}

impl FromStr for IdealValueField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(IdealValueField::Id),
            "machineId" | "machine_id" => Ok(IdealValueField::MachineId),
            "machineName" | "machine_name" => Ok(IdealValueField::MachineName),
            "idealConsumption" | "ideal_consumption" => Ok(IdealValueField::IdealConsumption),
            "tolerancePercentage" | "tolerance_percentage" => {
                Ok(IdealValueField::TolerancePercentage)
            }
            "status" => Ok(IdealValueField::Status),
            other => Err(Error::InvalidSortField(other.to_string())),
        }
    }
}

impl TableRow for IdealValueRow {
    type Field = IdealValueField;
    type Category = MachineStatus;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.machine_id.as_str(), self.machine_name.as_str()]
    }

    fn category(&self) -> MachineStatus {
        self.status
    }

    fn sort_value(&self, field: IdealValueField) -> SortValue<'_> {
        match field {
            IdealValueField::Id => SortValue::Number(Some(f64::from(self.id))),
            IdealValueField::MachineId => SortValue::Text(&self.machine_id),
            IdealValueField::MachineName => SortValue::Text(&self.machine_name),
            IdealValueField::IdealConsumption => SortValue::Number(Some(self.ideal_consumption)),
            IdealValueField::TolerancePercentage => {
                SortValue::Number(Some(self.tolerance_percentage))
            }
            IdealValueField::Status => SortValue::Text(self.status.as_str()),
        }
    }
}

/// One line of a generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    /// ISO date, as printed in reports.
    pub date_display: String,
    pub machine: Option<String>,
    pub consumption: f64,
    pub consumption_display: String,
    pub ideal: f64,
    pub ideal_display: String,
    /// Consumption relative to ideal, in percent.
    pub difference: Option<f64>,
    pub difference_display: String,
    pub band: DifferenceBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Date,
    Machine,
    Consumption,
    Ideal,
    Difference,
}

impl FromStr for ReportField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(ReportField::Date),
            "machine" => Ok(ReportField::Machine),
            "consumption" => Ok(ReportField::Consumption),
            "ideal" => Ok(ReportField::Ideal),
            "difference" => Ok(ReportField::Difference),
            other => Err(Error::InvalidSortField(other.to_string())),
        }
    }
}

impl FromStr for DifferenceBand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(DifferenceBand::Normal),
            "elevated" => Ok(DifferenceBand::Elevated),
            "high" => Ok(DifferenceBand::High),
            other => Err(Error::InvalidValue {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

impl TableRow for ReportRow {
    type Field = ReportField;
    type Category = DifferenceBand;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.date_display.as_str()];
        if let Some(machine) = &self.machine {
            fields.push(machine.as_str());
        }
        fields
    }

    fn category(&self) -> DifferenceBand {
        self.band
    }

    fn sort_value(&self, field: ReportField) -> SortValue<'_> {
        match field {
            ReportField::Date => SortValue::Date(self.date),
            ReportField::Machine => SortValue::Text(self.machine.as_deref().unwrap_or("")),
            ReportField::Consumption => SortValue::Number(Some(self.consumption)),
            ReportField::Ideal => SortValue::Number(Some(self.ideal)),
            ReportField::Difference => SortValue::Number(self.difference),
        }
    }
}
