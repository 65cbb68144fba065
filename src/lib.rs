//! Energy-consumption dashboard data pipeline.
//!
//! Raw machine records are normalized into table rows, then filtered,
//! sorted and paginated for display, or exported as CSV.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod model;
pub mod report;
/// Data-source contract and the seeded mock backend.
pub mod source;
pub mod stats;
/// Normalize, filter, sort, paginate and export stages.
pub mod table;
pub mod view;

pub use error::{Error, Result};
