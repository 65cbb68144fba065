//! Sort stage: single-key stable sort with a two-state direction toggle.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::TableRow;
use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header arrow for the active column.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(Error::InvalidSortDirection(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

/// The single active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + Eq> SortKey<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: F) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: F) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Header click: same field flips direction, another field starts ascending.
    ///
    /// ```
    /// use energy_dash::table::{SortDirection, SortKey};
    ///
    /// let key = SortKey::ascending("date");
    /// assert_eq!(key.request("date").direction, SortDirection::Descending);
    /// assert_eq!(key.request("date").request("date").direction, SortDirection::Ascending);
    /// assert_eq!(key.request("consumption").direction, SortDirection::Ascending);
    /// ```
    pub fn request(self, field: F) -> Self {
        if self.field == field {
            Self::new(field, self.direction.toggled())
        } else {
            Self::ascending(field)
        }
    }

    /// Direction arrow if `field` is the active column.
    pub fn indicator_for(&self, field: F) -> Option<&'static str> {
        (self.field == field).then(|| self.direction.indicator())
    }
}

/// Returns a stably sorted copy of `rows`.
///
/// Descending order reverses the comparison, not the output, so rows with
/// equal keys keep their input order in both directions.
pub fn sort_rows<R: TableRow>(rows: &[R], key: &SortKey<R::Field>) -> Vec<R> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord = a.sort_value(key.field).compare(&b.sort_value(key.field));
        match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    sorted
}
