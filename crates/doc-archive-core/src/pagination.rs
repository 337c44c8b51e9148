//! Page slicing and page-button layout.

/// One page of results plus the metadata needed to draw controls.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView<'a, T> {
    pub items: &'a [T],
    pub page_count: usize,
    pub current_page: usize,
}

impl<'a, T> PageView<'a, T> {
    /// Controls to draw, or `None` when everything fits on one page.
    pub fn controls(&self) -> Option<PaginationControls> {
        PaginationControls::build(self.page_count, self.current_page)
    }
}

/// `max(1, ceil(len / page_size))`. A zero page size is treated as one.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice `results` to the requested page.
///
/// `current_page` is clamped into `[1, page_count]` so the returned view is
/// always valid.
pub fn paginate<T>(results: &[T], page_size: usize, current_page: usize) -> PageView<'_, T> {
    let page_size = page_size.max(1);
    let page_count = page_count(results.len(), page_size);
    let current_page = current_page.clamp(1, page_count);

    let start = ((current_page - 1) * page_size).min(results.len());
    let end = (start + page_size).min(results.len());

    PageView {
        items: &results[start..end],
        page_count,
        current_page,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageButton {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Previous/next targets and the numbered buttons between them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaginationControls {
    pub previous: Option<usize>,
    pub buttons: Vec<PageButton>,
    pub next: Option<usize>,
}

impl PaginationControls {
    /// Layout for `current` out of `page_count` pages.
    ///
    /// Pages 1 and `page_count` are always listed along with `current ± 1`.
    /// Positions `current ± 2` that are not listed become an ellipsis; other
    /// pages are omitted.
    pub fn build(page_count: usize, current: usize) -> Option<Self> {
        if page_count <= 1 {
            return None;
        }
        let current = current.clamp(1, page_count);

        let mut buttons = Vec::new();
        for number in 1..=page_count {
            let near_current = number + 1 >= current && number <= current + 1;
            if number == 1 || number == page_count || near_current {
                buttons.push(PageButton::Page {
                    number,
                    current: number == current,
                });
            } else if number + 2 == current || number == current + 2 {
                buttons.push(PageButton::Ellipsis);
            }
        }

        Some(PaginationControls {
            previous: (current > 1).then(|| current - 1),
            buttons,
            next: (current < page_count).then(|| current + 1),
        })
    }
}
