//! Table pipeline: normalize → filter → sort → paginate, plus CSV export.
//!
//! Every stage is a pure function of its inputs and returns a fresh list, so
//! recomputing the whole pipeline on each change is the expected usage.

pub mod export;
pub mod filter;
pub mod normalize;
pub mod paginate;
pub mod row;
pub mod sort;

use std::cmp::Ordering;
use std::fmt::Debug;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::Error;

pub use filter::{CategoryFilter, FilterState, filter_rows};
pub use paginate::{Page, PageWindow};
pub use row::{ChartPoint, ConsumptionRow, IdealValueRow, ReportRow, RowKind};
pub use sort::{SortDirection, SortKey, sort_rows};

/// Placeholder shown for a cell with no value.
pub const NO_VALUE: &str = "-";

/// A display row the pipeline knows how to search, categorise, and sort.
pub trait TableRow: Clone {
    /// Sortable columns of this row kind.
    type Field: Copy + Eq + Debug + FromStr<Err = Error>;
    /// Categorical attribute used by the filter stage.
    type Category: Copy + Eq + Debug + FromStr<Err = Error>;

    /// Text the free-text search is matched against; any field may match.
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Self::Category;

    fn sort_value(&self, field: Self::Field) -> SortValue<'_>;
}

/// Raw value of a sortable column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    /// Compared chronologically, never by its formatted text.
    Date(NaiveDate),
    /// Absent numbers order before present ones.
    Number(Option<f64>),
    Text(&'a str),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Date(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    /// Ascending natural order of two values.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => match (a, b) {
                (Some(x), Some(y)) => x.total_cmp(y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_compare_chronologically() {
        // Formatted, "Apr 01, 2026" sorts before "May 01, 2025".
        let may = SortValue::Date(NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"));
        let apr = SortValue::Date(NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"));
        assert_eq!(may.compare(&apr), Ordering::Less);
    }

    #[test]
    fn absent_numbers_sort_first() {
        let none = SortValue::Number(None);
        let some = SortValue::Number(Some(-5.0));
        assert_eq!(none.compare(&some), Ordering::Less);
        assert_eq!(some.compare(&none), Ordering::Greater);
        assert_eq!(none.compare(&none), Ordering::Equal);
    }

    #[test]
    fn numbers_compare_by_value_not_text() {
        let nine = SortValue::Number(Some(9.5));
        let hundred = SortValue::Number(Some(100.0));
        assert_eq!(nine.compare(&hundred), Ordering::Less);
    }
}
