// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Number of consecutive page buttons shown before collapsing into `...`.
pub const PAGE_WINDOW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

pub fn pagination_range(current_page: usize, total_pages: usize) -> Vec<PageMarker> {
    pagination_range_with_window(current_page, total_pages, PAGE_WINDOW)
}

/// Page buttons for `current_page` out of `total_pages`, always including the
/// first and last page. The window is clamped at the low end first and then
/// at the high end, so a window that overflows both ends settles on the tail.
pub fn pagination_range_with_window(
    current_page: usize,
    total_pages: usize,
    window: usize,
) -> Vec<PageMarker> {
    let window = window.max(1);
    if total_pages <= window {
        return (1..=total_pages).map(PageMarker::Page).collect();
    }

    let current = current_page as isize;
    let total = total_pages as isize;
    let span = window as isize;

    let mut start = current - span / 2;
    let mut end = current + (span + 1) / 2 - 1;

    if start < 1 {
        start = 1;
        end = span;
    }

    if end > total {
        end = total;
        start = (total - span + 1).max(1);
    }

    let mut pages = Vec::with_capacity(window + 4);
    if start > 1 {
        pages.push(PageMarker::Page(1));
        if start > 2 {
            pages.push(PageMarker::Ellipsis);
        }
    }

    pages.extend((start..=end).map(|page| PageMarker::Page(page as usize)));

    if end < total {
        if end < total - 1 {
            pages.push(PageMarker::Ellipsis);
        }
        pages.push(PageMarker::Page(total_pages));
    }

    pages
}

pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    item_count.div_ceil(page_size)
}

/// The `page`-th window of `page_size` items (1-indexed). Pages past the end
/// come back short or empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
