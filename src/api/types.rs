//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::model::{MachineConsumption, SummaryPeriod, SummaryStat};
use crate::stats::{ConsumptionStats, ReportSummary};
use crate::table::{PageWindow, ReportRow, SortDirection};

/// Query parameters shared by the table endpoints.
///
/// Every parameter is optional; absent ones keep the table's defaults.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    /// Case-insensitive substring matched against the searchable columns.
    pub search: Option<String>,
    /// `all` or one category name of the table.
    pub category: Option<String>,
    /// Column to sort by.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub direction: Option<String>,
    /// One-based page number, clamped to the last page.
    pub page: Option<usize>,
    /// Rows per page.
    pub size: Option<usize>,
}

/// One page of a table.
#[derive(Debug, Serialize)]
pub struct TablePage<R> {
    pub rows: Vec<R>,
    pub window: PageWindow,
    pub direction: SortDirection,
}

/// Raw series of one machine plus its headline statistics.
#[derive(Debug, Serialize)]
pub struct ConsumptionResponse {
    pub machine_id: String,
    pub series: MachineConsumption,
    pub stats: ConsumptionStats,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// `week`, `month` or `year`.
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub period: SummaryPeriod,
    pub stats: Vec<SummaryStat>,
    /// `100 - MAPE` of predicted vs. actual, if computable.
    pub accuracy: Option<f64>,
}

/// Generated report rows and their totals.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub title: &'static str,
    pub rows: Vec<ReportRow>,
    pub summary: Option<ReportSummary>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
