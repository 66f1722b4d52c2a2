// Paged view: filter, then sort, then slice

use crate::filter::{FilterState, filter_records};
use crate::pagination::{PageItem, pagination_range};
use crate::record::RecordLayout;
use crate::sort::sort_records;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Current page and page size; `page_index` is 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// One rendered page of a filtered, sorted collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a> {
    /// Records on this page
    pub page_items: Vec<&'a Value>,
    /// Number of pages the filtered set spans
    pub page_count: usize,
    /// Page actually shown, clamped into range
    pub page_index: usize,
    /// Records that passed the filters
    pub total: usize,
    /// 1-based position of the first record on the page, 0 when empty
    pub start_index: usize,
    /// 1-based position of the last record on the page, 0 when empty
    pub end_index: usize,
}

impl PageView<'_> {
    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    /// Pager sequence around the shown page, in 1-based page numbers
    pub fn page_numbers(&self, sibling_count: usize) -> Vec<PageItem> {
        pagination_range(self.page_index + 1, self.page_count, sibling_count)
    }

    /// Pagination state the caller should keep after this view was built
    pub fn pagination(&self, page_size: usize) -> PaginationState {
        PaginationState::new(self.page_index, page_size)
    }
}

/// Build the visible page for `records`
///
/// Sorting only ever sees the filtered set. When the filters shrink the set
/// below the requested page, the last available page is shown instead.
pub fn select<'a, I>(
    records: I,
    filter: &FilterState,
    pagination: PaginationState,
    layout: &RecordLayout,
) -> PageView<'a>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut filtered = filter_records(records, filter, layout);
    sort_records(&mut filtered, filter.sort_order, layout);

    let page_size = pagination.page_size.max(1);
    let total = filtered.len();
    let page_count = total.div_ceil(page_size);
    let page_index = pagination.page_index.min(page_count.saturating_sub(1));

    let start = (page_index * page_size).min(total);
    let end = (start + page_size).min(total);
    let page_items: Vec<&Value> = filtered[start..end].to_vec();

    let (start_index, end_index) = if page_items.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + page_items.len())
    };

    if page_index != pagination.page_index {
        debug!(
            requested = pagination.page_index,
            clamped = page_index,
            page_count,
            "select: page index clamped"
        );
    }

    PageView {
        page_items,
        page_count,
        page_index,
        total,
        start_index,
        end_index,
    }
}
