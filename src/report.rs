//! Report request configuration and the date schedule it expands to.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which machines a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "scope", content = "id")]
pub enum MachineSelection {
    All,
    One(String),
}

impl MachineSelection {
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            MachineSelection::All
        } else {
            MachineSelection::One(s.to_string())
        }
    }
}

impl fmt::Display for MachineSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineSelection::All => f.write_str("all"),
            MachineSelection::One(id) => f.write_str(id),
        }
    }
}

/// Spacing between report points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(Error::InvalidValue {
                field: "granularity",
                value: other.to_string(),
            }),
        }
    }
}

/// Kind of report being produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    #[default]
    Consumption,
    Efficiency,
    Comparison,
}

impl ReportCategory {
    /// Granularity a fresh form starts with for this category.
    pub fn default_granularity(self) -> Granularity {
        match self {
            ReportCategory::Consumption | ReportCategory::Efficiency => Granularity::Daily,
            ReportCategory::Comparison => Granularity::Monthly,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportCategory::Consumption => "Consumption Report",
            ReportCategory::Efficiency => "Efficiency Report",
            ReportCategory::Comparison => "Comparison Report",
        }
    }
}

impl FromStr for ReportCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "consumption" => Ok(ReportCategory::Consumption),
            "efficiency" => Ok(ReportCategory::Efficiency),
            "comparison" => Ok(ReportCategory::Comparison),
            other => Err(Error::InvalidValue {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// Baseline a comparison report measures against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPeriod {
    #[default]
    Previous,
    SamePeriodLastYear,
}

/// File format of a downloaded report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Pdf,
    Excel,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(ReportFormat::Csv),
            "pdf" => Ok(ReportFormat::Pdf),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            other => Err(Error::InvalidValue {
                field: "format",
                value: other.to_string(),
            }),
        }
    }
}

/// Preset date ranges ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    LastWeek,
    LastMonth,
    LastQuarter,
    LastYear,
}

impl QuickRange {
    pub fn days(self) -> u64 {
        match self {
            QuickRange::LastWeek => 7,
            QuickRange::LastMonth => 30,
            QuickRange::LastQuarter => 90,
            QuickRange::LastYear => 365,
        }
    }

    /// `(start, end)` with `end = today`.
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today.checked_sub_days(Days::new(self.days())).unwrap_or(NaiveDate::MIN);
        (start, today)
    }
}

impl FromStr for QuickRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last-week" => Ok(QuickRange::LastWeek),
            "last-month" => Ok(QuickRange::LastMonth),
            "last-quarter" => Ok(QuickRange::LastQuarter),
            "last-year" => Ok(QuickRange::LastYear),
            other => Err(Error::InvalidValue {
                field: "range",
                value: other.to_string(),
            }),
        }
    }
}

/// Longest inclusive range a report may cover: two years, leap day included.
pub const MAX_REPORT_DAYS: i64 = 731;

/// Everything needed to generate or download a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub machine: MachineSelection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub category: ReportCategory,
    #[serde(default)]
    pub comparison_period: ComparisonPeriod,
}

impl ReportConfig {
    /// Last-month report for `category`, as a freshly opened form shows it.
    pub fn for_category(category: ReportCategory, machine: MachineSelection, today: NaiveDate) -> Self {
        let (start_date, end_date) = QuickRange::LastMonth.range(today);
        Self {
            machine,
            start_date,
            end_date,
            granularity: category.default_granularity(),
            category,
            comparison_period: ComparisonPeriod::Previous,
        }
    }

    pub fn with_range(mut self, range: QuickRange, today: NaiveDate) -> Self {
        let (start, end) = range.range(today);
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidDateRange` if the start date is after the end date,
    /// or `DateRangeTooLong` if the range spans more than [`MAX_REPORT_DAYS`].
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(Error::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        let days = self.span_days();
        if days > MAX_REPORT_DAYS {
            return Err(Error::DateRangeTooLong {
                days,
                max: MAX_REPORT_DAYS,
            });
        }
        Ok(())
    }

    /// Inclusive day count of the range.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Dates of the report points.
    ///
    /// Daily reports have one point per day. Weekly reports have
    /// `ceil(days / 7)` points, 7 days apart. Monthly reports have
    /// `ceil(days / 30)` points, one calendar month apart. Points past the
    /// end date are dropped.
    pub fn schedule(&self) -> Result<Vec<NaiveDate>> {
        self.validate()?;
        let days = self.span_days().max(0) as u64;
        let points = match self.granularity {
            Granularity::Daily => days,
            Granularity::Weekly => days.div_ceil(7),
            Granularity::Monthly => days.div_ceil(30),
        };

        let mut dates = Vec::with_capacity(points as usize);
        for i in 0..points {
            let date = match self.granularity {
                Granularity::Daily => self.start_date.checked_add_days(Days::new(i)),
                Granularity::Weekly => self.start_date.checked_add_days(Days::new(i * 7)),
                Granularity::Monthly => {
                    let months = u32::try_from(i).unwrap_or(u32::MAX);
                    self.start_date.checked_add_months(Months::new(months))
                }
            };
            match date {
                Some(d) if d <= self.end_date => dates.push(d),
                _ => break,
            }
        }
        Ok(dates)
    }
}

/// Acknowledgement of a report download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReceipt {
    pub format: ReportFormat,
    pub filename: String,
    /// File contents, when the format is produced locally.
    pub payload: Option<String>,
}
