//! Paginate stage: fixed-size windows into a sorted list.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Page-size choices offered by default.
pub const DEFAULT_PAGE_SIZES: &[usize] = &[5, 10, 20, 50];

/// A one-based page index and a non-zero page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    index: usize,
    size: usize,
}

impl Page {
    /// First page of the given size.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageSize` if `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidPageSize(size));
        }
        Ok(Self { index: 1, size })
    }

    /// Page `index` of the given size. An index of zero is treated as one.
    pub fn at(index: usize, size: usize) -> Result<Self> {
        let mut page = Self::new(size)?;
        page.index = index.max(1);
        Ok(page)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `max(1, ceil(count / size))`, so even an empty table has one page.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.size).max(1)
    }

    /// Changes the page size and returns to the first page.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(Error::InvalidPageSize(size));
        }
        self.size = size;
        self.index = 1;
        Ok(())
    }

    pub fn has_previous(&self) -> bool {
        self.index > 1
    }

    pub fn has_next(&self, count: usize) -> bool {
        self.index < self.total_pages(count)
    }

    /// Moves back one page, staying on the first.
    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1).max(1);
    }

    /// Moves forward one page, staying on the last.
    pub fn next(&mut self, count: usize) {
        if self.has_next(count) {
            self.index += 1;
        }
    }

    /// Jumps to `index`, clamped to `1..=total_pages`.
    pub fn go_to(&mut self, index: usize, count: usize) {
        self.index = index.clamp(1, self.total_pages(count));
    }

    fn offset(&self) -> usize {
        (self.index - 1).saturating_mul(self.size)
    }

    /// Rows `[(index-1)*size, (index-1)*size + size)`, clipped to the list.
    ///
    /// An index past the end yields an empty slice.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = self.offset().min(rows.len());
        let end = start.saturating_add(self.size).min(rows.len());
        &rows[start..end]
    }

    pub fn window(&self, count: usize) -> PageWindow {
        let start = self.offset();
        let (first, last) = if count > start {
            (start + 1, start.saturating_add(self.size).min(count))
        } else {
            (0, 0)
        };
        PageWindow {
            first,
            last,
            total: count,
            page: self.index,
            total_pages: self.total_pages(count),
        }
    }
}

/// Position of the current page within the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// One-based number of the first row shown, or 0 if none.
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {}-{} of {} entries (page {} of {})",
            self.first,
            self.last,
            self.total,
            self.page,
            self.total_pages
        )
    }
}
