//! Filter stage: free-text search AND categorical predicate.

use super::TableRow;

/// Categorical part of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter<C> {
    #[default]
    All,
    Only(C),
    /// A category name that matched nothing known; filters out every row.
    Unknown(String),
}

impl<C: std::str::FromStr> CategoryFilter<C> {
    /// Parses `"all"`, a known category, or falls back to `Unknown`.
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            return CategoryFilter::All;
        }
        match s.parse::<C>() {
            Ok(c) => CategoryFilter::Only(c),
            Err(_) => CategoryFilter::Unknown(s.to_string()),
        }
    }
}

impl<C: PartialEq> CategoryFilter<C> {
    pub fn matches(&self, category: &C) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
            CategoryFilter::Unknown(_) => false,
        }
    }
}

/// Search text plus category; a row must satisfy both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<C> {
    pub search_text: String,
    pub category: CategoryFilter<C>,
}

impl<C> Default for FilterState<C> {
    fn default() -> Self {
        Self {
            search_text: String::default(),
            category: CategoryFilter::default(),
        }
    }
}

impl<C> FilterState<C> {
    pub fn new(search_text: impl Into<String>, category: CategoryFilter<C>) -> Self {
        Self {
            search_text: search_text.into(),
            category,
        }
    }
}

/// Keeps rows whose search fields contain the search text (ignoring case)
/// and whose category matches. Input order is preserved.
pub fn filter_rows<R: TableRow>(rows: &[R], state: &FilterState<R::Category>) -> Vec<R> {
    let needle = state.search_text.to_lowercase();
    rows.iter()
        .filter(|row| {
            let matches_search = needle.is_empty()
                || row
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            matches_search && state.category.matches(&row.category())
        })
        .cloned()
        .collect()
}
