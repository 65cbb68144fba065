//! Data-source contract consumed by the dashboard.
//!
//! Every call is asynchronous and may fail; callers surface the failure to
//! the user and keep whatever they were already showing.

mod mock;

use std::future::Future;

pub use mock::MockDataSource;

use crate::error::Result;
use crate::model::{DashboardOverview, IdealValueRecord, MachineConsumption, ReportRecord, SummaryPeriod, SummaryStat};
use crate::report::{DownloadReceipt, ReportConfig, ReportFormat};

/// Asynchronous supplier of raw dashboard records.
pub trait DataSource {
    fn fetch_machine_ids(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn fetch_machine_consumption(
        &self,
        machine_id: &str,
    ) -> impl Future<Output = Result<MachineConsumption>> + Send;

    fn fetch_ideal_values(&self) -> impl Future<Output = Result<Vec<IdealValueRecord>>> + Send;

    /// Actual vs. predicted totals; `None` means the default period.
    fn fetch_summary_stats(
        &self,
        period: Option<SummaryPeriod>,
    ) -> impl Future<Output = Result<Vec<SummaryStat>>> + Send;

    fn fetch_overview(&self) -> impl Future<Output = Result<DashboardOverview>> + Send;

    fn fetch_report_data(
        &self,
        config: &ReportConfig,
    ) -> impl Future<Output = Result<Vec<ReportRecord>>> + Send;

    fn download_report(
        &self,
        config: &ReportConfig,
        format: ReportFormat,
    ) -> impl Future<Output = Result<DownloadReceipt>> + Send;
}
