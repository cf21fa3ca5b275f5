//! Windowed page-number list for the pagination control.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page numbers to show for `current` out of `total_pages`.
///
/// Page 1 always; an ellipsis when `current > 3`; the pages from
/// `max(2, current - 1)` to `min(total_pages - 1, current + 1)`; an ellipsis
/// when `current < total_pages - 2`; and the last page when there is more
/// than one. An empty collection has no pages at all.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut items = vec![PageItem::Page(1)];
    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total_pages.saturating_sub(1));
    items.extend((start..=end).map(PageItem::Page));

    if current.saturating_add(2) < total_pages {
        items.push(PageItem::Ellipsis);
    }
    if total_pages > 1 {
        items.push(PageItem::Page(total_pages));
    }
    items
}
