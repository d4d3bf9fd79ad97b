//! Page windows, page-button lists and footer summaries.

use std::ops::Range;

/// One entry in the page-button strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page { number: u32, active: bool },
    /// A gap between shown pages.
    Ellipsis,
}

/// The "Showing start to end of total" footer line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FooterSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

/// Everything the footer shows for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Current page; always 1 in cursor mode.
    pub page: u32,
    pub total_pages: u32,
    /// Slice of the matching rows shown on this page.
    pub range: Range<usize>,
    pub summary: FooterSummary,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// Empty in cursor mode.
    pub buttons: Vec<PageButton>,
}

/// Number of pages for `total` rows; never less than 1.
pub fn total_pages(total: usize, page_size: u32) -> u32 {
    let size = page_size.max(1) as usize;
    let pages = total.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: u32, total: usize, page_size: u32) -> u32 {
    page.clamp(1, total_pages(total, page_size))
}

/// Page buttons for `current` of `total_pages`.
///
/// At or below `threshold` pages, every page is shown. Above it: the first
/// page, the pages adjacent to `current`, and the last page, with an
/// ellipsis wherever shown pages are not consecutive.
pub fn page_buttons(current: u32, total_pages: u32, threshold: u32) -> Vec<PageButton> {
    let total_pages = total_pages.max(1);
    let current = current.clamp(1, total_pages);

    let shown: Vec<u32> = if total_pages <= threshold {
        (1..=total_pages).collect()
    } else {
        let start = current.saturating_sub(1).max(2);
        let end = (current + 1).min(total_pages - 1);
        let mut shown = vec![1];
        shown.extend(start..=end);
        shown.push(total_pages);
        shown
    };

    let mut buttons = Vec::with_capacity(shown.len() + 2);
    let mut previous: Option<u32> = None;
    for number in shown {
        if previous.is_some_and(|p| number > p + 1) {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page {
            number,
            active: number == current,
        });
        previous = Some(number);
    }
    buttons
}

/// Offset-mode window over `total` matching rows.
///
/// `page` is clamped, so the result is always a valid page.
pub fn offset_window(page: u32, page_size: u32, total: usize, threshold: u32) -> PageWindow {
    let size = page_size.max(1);
    let pages = total_pages(total, size);
    let page = page.clamp(1, pages);

    let start = (page as usize - 1) * size as usize;
    let end = (start + size as usize).min(total);
    let range = start.min(total)..end;

    PageWindow {
        page,
        total_pages: pages,
        summary: FooterSummary {
            start: if total > 0 { start + 1 } else { 0 },
            end,
            total,
        },
        prev_enabled: page > 1,
        next_enabled: page < pages,
        buttons: page_buttons(page, pages, threshold),
        range,
    }
}

/// Cursor-mode window: the server decides what exists on either side.
///
/// `shown` is the number of rows on the current page.
pub fn cursor_window(shown: usize, has_next: bool, has_prev: bool) -> PageWindow {
    PageWindow {
        page: 1,
        total_pages: 1,
        range: 0..shown,
        summary: FooterSummary {
            start: if shown > 0 { 1 } else { 0 },
            end: shown,
            total: shown,
        },
        prev_enabled: has_prev,
        next_enabled: has_next,
        buttons: Vec::new(),
    }
}
