// Page-number ranges with ellipsis markers for pager controls

use serde::Serialize;
use std::fmt;

/// One entry in a pager's display sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageItem {
    /// A 1-based page number
    Page(usize),
    /// A run of elided pages
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => write!(f, "..."),
        }
    }
}

/// Number of siblings shown on each side of the current page by default
pub const DEFAULT_SIBLING_COUNT: usize = 1;

/// Compute the pager sequence for `current_page` (1-based) out of `total_pages`
///
/// Small page counts (`total_pages <= sibling_count + 5`) are listed in full.
/// Larger counts always keep the first and last page, the current page and its
/// siblings, and replace the gaps with [`PageItem::Ellipsis`]. A current page
/// outside `1..=total_pages` is clamped into range.
pub fn pagination_range(current_page: usize, total_pages: usize, sibling_count: usize) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    if sibling_count.saturating_add(5) >= total_pages {
        return pages(1, total_pages);
    }

    let current = current_page.clamp(1, total_pages);
    let left_sibling = current.saturating_sub(sibling_count).max(1);
    let right_sibling = current.saturating_add(sibling_count).min(total_pages);

    let show_left_ellipsis = left_sibling > 2;
    let show_right_ellipsis = right_sibling < total_pages - 1;
    // Wide sibling windows must still leave at least one page behind each ellipsis
    let edge_count = (3 + 2 * sibling_count).min(total_pages - 2);

    match (show_left_ellipsis, show_right_ellipsis) {
        (false, true) => {
            let mut range = pages(1, edge_count);
            range.push(PageItem::Ellipsis);
            range.push(PageItem::Page(total_pages));
            range
        }
        (true, false) => {
            let mut range = vec![PageItem::Page(1), PageItem::Ellipsis];
            range.extend(pages(total_pages - edge_count + 1, total_pages));
            range
        }
        (true, true) => {
            let mut range = vec![PageItem::Page(1), PageItem::Ellipsis];
            range.extend(pages(left_sibling, right_sibling));
            range.push(PageItem::Ellipsis);
            range.push(PageItem::Page(total_pages));
            range
        }
        (false, false) => pages(1, total_pages),
    }
}

fn pages(first: usize, last: usize) -> Vec<PageItem> {
    (first..=last).map(PageItem::Page).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    fn numbers(items: &[PageItem]) -> Vec<usize> {
        items
            .iter()
            .filter_map(|item| match item {
                Page(n) => Some(*n),
                Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_pages_is_empty() {
        assert!(pagination_range(1, 0, 1).is_empty());
        assert!(pagination_range(3, 0, 0).is_empty());
    }

    #[test]
    fn test_small_counts_are_fully_enumerated() {
        for total in 1..=6 {
            let range = pagination_range(1, total, 1);
            assert!(!range.contains(&Ellipsis));
            assert_eq!(numbers(&range), (1..=total).collect::<Vec<_>>());
        }
        // Wider sibling window widens the no-ellipsis threshold
        assert_eq!(pagination_range(4, 8, 3).len(), 8);
    }

    #[test]
    fn test_both_ellipses() {
        assert_eq!(
            pagination_range(5, 20, 1),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_right_ellipsis_only() {
        assert_eq!(
            pagination_range(1, 20, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)]
        );
        assert_eq!(pagination_range(3, 20, 1), pagination_range(1, 20, 1));
    }

    #[test]
    fn test_left_ellipsis_only() {
        assert_eq!(
            pagination_range(20, 20, 1),
            vec![Page(1), Ellipsis, Page(16), Page(17), Page(18), Page(19), Page(20)]
        );
        assert_eq!(pagination_range(18, 20, 1), pagination_range(20, 20, 1));
    }

    #[test]
    fn test_seven_pages() {
        assert_eq!(
            pagination_range(1, 7, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(7)]
        );
        assert_eq!(
            pagination_range(7, 7, 1),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7)]
        );
    }

    #[test]
    fn test_zero_siblings() {
        assert_eq!(
            pagination_range(10, 20, 0),
            vec![Page(1), Ellipsis, Page(10), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_wide_window_never_repeats_pages() {
        let range = pagination_range(9, 9, 3);
        assert_eq!(range[..2], [Page(1), Ellipsis]);
        assert_eq!(numbers(&range), vec![1, 3, 4, 5, 6, 7, 8, 9]);

        let range = pagination_range(1, 9, 3);
        assert_eq!(numbers(&range), vec![1, 2, 3, 4, 5, 6, 7, 9]);
    }

    #[test]
    fn test_current_page_is_clamped() {
        assert_eq!(pagination_range(0, 20, 1), pagination_range(1, 20, 1));
        assert_eq!(pagination_range(99, 20, 1), pagination_range(20, 20, 1));
    }

    #[test]
    fn test_every_page_always_shows_first_last_and_current() {
        for current in 1..=30 {
            let range = pagination_range(current, 30, 1);
            let shown = numbers(&range);
            assert_eq!(shown.first(), Some(&1));
            assert_eq!(shown.last(), Some(&30));
            assert!(shown.contains(&current));
            assert!(shown.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_display() {
        let text: Vec<String> = pagination_range(5, 20, 1).iter().map(ToString::to_string).collect();
        assert_eq!(text.join(" "), "1 ... 4 5 6 ... 20");
    }
}
