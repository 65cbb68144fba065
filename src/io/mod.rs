//! Output destinations.

pub mod export;
