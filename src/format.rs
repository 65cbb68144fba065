//! Display formatting for dates and numbers.

use chrono::NaiveDate;

/// Display form used in tables, e.g. `May 01, 2025`.
pub const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

/// ISO form used in filenames and exports, e.g. `2025-05-01`.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Formats `value` with exactly `decimals` fractional digits.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Formats a percentage with an explicit `+` for positive values.
///
/// ```
/// use energy_dash::format::format_signed_percent;
///
/// assert_eq!(format_signed_percent(10.0, 1), "+10.0%");
/// assert_eq!(format_signed_percent(-2.346, 2), "-2.35%");
/// assert_eq!(format_signed_percent(0.0, 1), "0.0%");
/// ```
pub fn format_signed_percent(pct: f64, decimals: usize) -> String {
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{sign}{pct:.decimals$}%")
}

/// Formats a percentage with one decimal and no sign, e.g. `87.0%`.
pub fn format_percent(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// Groups the integer part in thousands, e.g. `45678.5` → `45,678.50`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let fixed = format_fixed(value.abs(), decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
