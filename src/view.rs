//! Per-view state: one table's rows plus its filter, sort and page, and the
//! fetch slot that feeds it.

use crate::error::Result;
use crate::table::row::{ConsumptionField, IdealValueField, ReportField};
use crate::table::{
    CategoryFilter, ConsumptionRow, FilterState, IdealValueRow, Page, PageWindow, ReportRow,
    SortKey, TableRow, filter_rows, sort_rows,
};

/// State of one interactive table.
///
/// Changing the search text, the category or the page size returns to the
/// first page. Changing the sort keeps the current page.
#[derive(Debug, Clone)]
pub struct TableView<R: TableRow> {
    rows: Vec<R>,
    filter: FilterState<R::Category>,
    sort: SortKey<R::Field>,
    page: Page,
}

impl<R: TableRow> TableView<R> {
    /// # Errors
    ///
    /// Returns `InvalidPageSize` if `page_size` is zero.
    pub fn new(rows: Vec<R>, sort: SortKey<R::Field>, page_size: usize) -> Result<Self> {
        Ok(Self {
            rows,
            filter: FilterState {
                search_text: String::new(),
                category: CategoryFilter::All,
            },
            sort,
            page: Page::new(page_size)?,
        })
    }

    /// Replaces the normalized rows, keeping the page in range.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        let count = self.filtered().len();
        self.page.go_to(self.page.index(), count);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filter.search_text = text.into();
        self.page.go_to(1, 0);
    }

    pub fn set_category(&mut self, category: CategoryFilter<R::Category>) {
        self.filter.category = category;
        self.page.go_to(1, 0);
    }

    pub fn filter(&self) -> &FilterState<R::Category> {
        &self.filter
    }

    /// Header click on `field`.
    pub fn sort_by(&mut self, field: R::Field) {
        self.sort = self.sort.request(field);
    }

    pub fn set_sort(&mut self, key: SortKey<R::Field>) {
        self.sort = key;
    }

    pub fn sort(&self) -> SortKey<R::Field> {
        self.sort
    }

    /// # Errors
    ///
    /// Returns `InvalidPageSize` if `size` is zero; the view is unchanged.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.page.set_size(size)
    }

    pub fn go_to_page(&mut self, index: usize) {
        let count = self.filtered().len();
        self.page.go_to(index, count);
    }

    pub fn next_page(&mut self) {
        let count = self.filtered().len();
        self.page.next(count);
    }

    pub fn previous_page(&mut self) {
        self.page.previous();
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Filter-stage output; also what an export writes.
    pub fn filtered(&self) -> Vec<R> {
        filter_rows(&self.rows, &self.filter)
    }

    /// Filtered rows in sort order, before pagination.
    pub fn sorted(&self) -> Vec<R> {
        sort_rows(&self.filtered(), &self.sort)
    }

    /// The rows on the current page.
    pub fn visible(&self) -> Vec<R> {
        let sorted = self.sorted();
        log::debug!(
            "table pass: {} rows -> {} filtered, page {}",
            self.rows.len(),
            sorted.len(),
            self.page.index()
        );
        self.page.slice(&sorted).to_vec()
    }

    pub fn window(&self) -> PageWindow {
        self.page.window(self.filtered().len())
    }

    /// Rows an export of this view contains, independent of sort and page.
    pub fn export_rows(&self) -> Vec<R> {
        self.filtered()
    }
}

impl TableView<ConsumptionRow> {
    /// Newest dates first.
    pub fn consumption(rows: Vec<ConsumptionRow>, page_size: usize) -> Result<Self> {
        Self::new(rows, SortKey::descending(ConsumptionField::Date), page_size)
    }
}

impl TableView<IdealValueRow> {
    pub fn ideal_values(rows: Vec<IdealValueRow>, page_size: usize) -> Result<Self> {
        Self::new(rows, SortKey::ascending(IdealValueField::MachineId), page_size)
    }
}

impl TableView<ReportRow> {
    pub fn report(rows: Vec<ReportRow>, page_size: usize) -> Result<Self> {
        Self::new(rows, SortKey::ascending(ReportField::Date), page_size)
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Newest request; its data is now shown.
    Applied,
    /// A newer request was issued meanwhile; the result was dropped.
    Stale,
    /// Newest request, but it failed; previous data stays.
    Failed,
}

/// Holds the latest successfully fetched value for a view.
///
/// Every fetch takes a ticket from [`FetchSlot::begin`]. Only the
/// completion carrying the most recent ticket is applied.
#[derive(Debug, Clone)]
pub struct FetchSlot<T> {
    issued: u64,
    loading: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            loading: false,
            data: None,
            error: None,
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        Ticket(self.issued)
    }

    pub fn resolve(&mut self, ticket: Ticket, result: Result<T>) -> FetchOutcome {
        if ticket.0 != self.issued {
            log::warn!("dropping stale fetch #{} (latest #{})", ticket.0, self.issued);
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                log::warn!("fetch #{} failed: {err}", ticket.0);
                self.error = Some(err.user_message());
                FetchOutcome::Failed
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Message from the latest failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
