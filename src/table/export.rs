//! Export stage: filtered rows → CSV payload → file sink.
//!
//! Exports always take the filter-stage output. Sorting and pagination are
//! view concerns and never change what gets exported.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;

use super::row::{ChartPoint, ConsumptionRow, IdealValueRow, ReportRow};
use crate::error::{Error, Result};
use crate::format::format_fixed;
use crate::io::export::{ExportSink, export_filename};

/// One serialized value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Free text; always double-quoted.
    Text(String),
    /// Numeric or pre-formatted value; written as-is.
    Value(String),
    /// Absent value; written as an empty field.
    Empty,
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Cell::Value(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }

    fn number(value: Option<f64>, decimals: usize) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Value(format_fixed(v, decimals)))
    }
}

/// A header label and how to read that column from a row.
pub struct Column<R> {
    pub header: &'static str,
    pub value: fn(&R) -> Cell,
}

impl<R> Column<R> {
    pub fn new(header: &'static str, value: fn(&R) -> Cell) -> Self {
        Self { header, value }
    }
}

/// Serializes rows as CSV: a header line, then one line per row.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn csv_payload<R>(rows: &[R], columns: &[Column<R>]) -> Result<String> {
    let mut buf = Vec::new();
    {
        // Quoting is decided per cell, so the writer must not add its own.
        let mut wtr = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(&mut buf);

        wtr.write_record(columns.iter().map(|c| c.header))?;
        for row in rows {
            wtr.write_record(columns.iter().map(|c| (c.value)(row).render()))?;
        }
        wtr.flush()?;
    }

    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Result of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub location: PathBuf,
    pub rows: usize,
}

/// Serializes `rows` and hands the payload to `sink` exactly once.
///
/// # Errors
///
/// Returns an error if serialization or the save fails. Nothing is retried.
pub fn export_rows<R>(
    rows: &[R],
    columns: &[Column<R>],
    prefix: &str,
    today: NaiveDate,
    sink: &mut dyn ExportSink,
) -> Result<ExportOutcome> {
    let payload = csv_payload(rows, columns)?;
    let filename = export_filename(prefix, today);
    let location = sink.save(&filename, &payload)?;
    log::info!("exported {} rows to {}", rows.len(), location.display());
    Ok(ExportOutcome {
        location,
        rows: rows.len(),
    })
}

pub fn consumption_columns() -> Vec<Column<ConsumptionRow>> {
    type C = Column<ConsumptionRow>;
    vec![
        C::new("Date", |r| Cell::Text(r.formatted_date.clone())),
        C::new("Actual Consumption (kWh)", |r| Cell::number(r.consumption, 2)),
        C::new("Predicted Consumption (kWh)", |r| Cell::number(r.prediction, 2)),
        C::new("Difference (%)", |r| match r.difference {
            Some(_) => Cell::Value(r.difference_display.clone()),
            None => Cell::Empty,
        }),
    ]
}

/// Columns of the chart series export; no difference column.
pub fn chart_columns() -> Vec<Column<ChartPoint>> {
    type C = Column<ChartPoint>;
    vec![
        C::new("Date", |p| Cell::Text(p.formatted_date.clone())),
        C::new("Actual Consumption (kWh)", |p| Cell::number(p.consumption, 2)),
        C::new("Predicted Consumption (kWh)", |p| Cell::number(p.prediction, 2)),
    ]
}

pub fn ideal_value_columns() -> Vec<Column<IdealValueRow>> {
    type C = Column<IdealValueRow>;
    vec![
        C::new("Machine ID", |r| Cell::Text(r.machine_id.clone())),
        C::new("Machine Name", |r| Cell::Text(r.machine_name.clone())),
        C::new("Ideal Consumption (kWh)", |r| Cell::number(Some(r.ideal_consumption), 2)),
        C::new("Tolerance (%)", |r| Cell::Value(r.tolerance_percentage.to_string())),
        C::new("Status", |r| Cell::Text(r.status.to_string())),
    ]
}

pub fn report_columns() -> Vec<Column<ReportRow>> {
    type C = Column<ReportRow>;
    vec![
        C::new("Date", |r| Cell::Text(r.date_display.clone())),
        C::new("Machine", |r| r.machine.clone().map_or(Cell::Empty, Cell::Text)),
        C::new("Consumption (kWh)", |r| Cell::number(Some(r.consumption), 2)),
        C::new("Ideal (kWh)", |r| Cell::number(Some(r.ideal), 2)),
        C::new("Difference (%)", |r| match r.difference {
            Some(_) => Cell::Value(r.difference_display.clone()),
            None => Cell::Empty,
        }),
    ]
}
