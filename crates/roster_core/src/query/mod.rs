//! List query construction.
//!
//! # Responsibility
//! - Turn request parameters into search/filter/sort/paginate steps.
//! - Keep those steps storage-agnostic so any backend can evaluate them.
//!
//! # Invariants
//! - Steps run in fixed order: search, class filter, sort, paginate.
//! - Pages hold at most `PAGE_SIZE` records.

pub mod page;
pub mod params;

pub use page::{build_view, Page, Paginator, PAGE_SIZE};
pub use params::{
    parse_page, ListParams, SortField, SortKey, StudentFilter, StudentQuery, ALLOWED_SORT_KEYS,
};
