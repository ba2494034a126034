//! Page arithmetic and the in-memory list view.
//!
//! # Responsibility
//! - Turn a record count and a requested page into a valid page number.
//! - Package one page of records with navigation metadata and echoed params.
//!
//! # Invariants
//! - There is always at least one page, even for an empty listing.
//! - Requests below 1 clamp to 1; requests past the end clamp to the last page.
//! - `build_view` and the repository-backed listing produce identical pages.

use crate::model::student::Student;
use crate::query::params::ListParams;
use serde::Serialize;

/// Fixed number of records per page.
pub const PAGE_SIZE: usize = 10;

/// Page arithmetic over a known record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total_count: usize,
    per_page: usize,
}

impl Paginator {
    /// `per_page` of zero is treated as one.
    pub fn new(total_count: usize, per_page: usize) -> Self {
        Self {
            total_count,
            per_page: per_page.max(1),
        }
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// `ceil(total / per_page)`, but never less than one.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.per_page).max(1)
    }

    /// Clamps a requested page into `[1, total_pages]`.
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        let last = self.total_pages();
        match requested {
            None => 1,
            Some(value) if value < 1 => 1,
            Some(value) => usize::try_from(value).map_or(last, |page| page.min(last)),
        }
    }

    /// Zero-based offset of the first record on `page`.
    pub fn offset(&self, page: usize) -> usize {
        page.saturating_sub(1) * self.per_page
    }
}

/// One page of an ordered, filtered listing plus the state needed to
/// re-render list controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based current page.
    pub number: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<usize>,
    pub next_page: Option<usize>,
    /// 1-based index of the first item on this page; 0 when empty.
    pub start_index: usize,
    /// 1-based index of the last item on this page; 0 when empty.
    pub end_index: usize,
    pub search: String,
    pub class_filter: String,
    pub sort: String,
}

impl<T> Page<T> {
    /// Assembles a page from already-sliced items.
    pub fn new(items: Vec<T>, number: usize, paginator: &Paginator, params: &ListParams) -> Self {
        let total_pages = paginator.total_pages();
        let has_previous = number > 1;
        let has_next = number < total_pages;
        let (start_index, end_index) = if items.is_empty() {
            (0, 0)
        } else {
            let start = paginator.offset(number) + 1;
            (start, start + items.len() - 1)
        };

        Self {
            items,
            number,
            total_pages,
            total_count: paginator.total_count(),
            has_previous,
            has_next,
            previous_page: has_previous.then(|| number - 1),
            next_page: has_next.then(|| number + 1),
            start_index,
            end_index,
            search: params.search.clone(),
            class_filter: params.class_filter.clone(),
            sort: params.sort.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds one list page from the full record set.
///
/// Applies search, class filter, sort and pagination in that order. Never
/// fails: malformed parameters degrade to defaults.
pub fn build_view(
    all_records: impl IntoIterator<Item = Student>,
    params: &ListParams,
) -> Page<Student> {
    let ordered = params.to_query().apply(all_records);
    let paginator = Paginator::new(ordered.len(), PAGE_SIZE);
    let number = paginator.clamp(params.page);
    let items = ordered
        .into_iter()
        .skip(paginator.offset(number))
        .take(paginator.per_page())
        .collect();
    Page::new(items, number, &paginator, params)
}
