use doc_archive_config::FileType;

use crate::filter::filter;
use crate::highlight::highlight;
use crate::pagination::{page_count, paginate, PageView, PaginationControls};
use crate::query::{QueryState, TypeSet};
use crate::record::DocumentRecord;
use crate::repository::Repository;

/// Owns the query state for one browsing session and keeps the filtered
/// result in step with it.
///
/// Every mutation recomputes the result from scratch and clamps the current
/// page into `[1, page_count]`. Changing the search term, the type filter or
/// the page size also returns to page 1.
pub struct ArchiveBrowser<'a> {
    repository: &'a Repository,
    state: QueryState,
    results: Vec<&'a DocumentRecord>,
}

impl<'a> ArchiveBrowser<'a> {
    pub fn new(repository: &'a Repository) -> Self {
        Self::with_state(repository, QueryState::default())
    }

    pub fn with_state(repository: &'a Repository, state: QueryState) -> Self {
        let mut browser = ArchiveBrowser {
            repository,
            state,
            results: Vec::new(),
        };
        browser.state.page_size = browser.state.page_size.max(1);
        browser.recompute();
        browser
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn results(&self) -> &[&'a DocumentRecord] {
        &self.results
    }

    pub fn page_count(&self) -> usize {
        page_count(self.results.len(), self.state.page_size)
    }

    pub fn page(&self) -> PageView<'_, &'a DocumentRecord> {
        paginate(&self.results, self.state.page_size, self.state.current_page)
    }

    pub fn controls(&self) -> Option<PaginationControls> {
        PaginationControls::build(self.page_count(), self.state.current_page)
    }

    /// Highlight the active search term in a display-safe field.
    pub fn highlight(&self, text: &str) -> String {
        highlight(text, &self.state.search_term)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
        self.reset_and_recompute();
    }

    pub fn clear_search(&mut self) {
        self.set_search_term(String::new());
    }

    pub fn set_type_enabled(&mut self, file_type: FileType, enabled: bool) {
        self.state.enabled_types.set(file_type, enabled);
        self.reset_and_recompute();
    }

    pub fn set_enabled_types(&mut self, types: TypeSet) {
        self.state.enabled_types = types;
        self.reset_and_recompute();
    }

    /// Enable or disable every type at once.
    pub fn set_all_types(&mut self, enabled: bool) {
        let types = if enabled {
            TypeSet::all()
        } else {
            TypeSet::empty()
        };
        self.set_enabled_types(types);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.reset_and_recompute();
    }

    /// Move to `page`. Returns false, leaving the state untouched, when the
    /// page is out of range or already current.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.page_count() || page == self.state.current_page {
            return false;
        }
        self.state.current_page = page;
        tracing::debug!(page, "changed page");
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.state.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.state.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    fn reset_and_recompute(&mut self) {
        self.state.current_page = 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.results = filter(self.repository, &self.state);
        let pages = self.page_count();
        self.state.current_page = self.state.current_page.clamp(1, pages);
        tracing::debug!(
            term = %self.state.search_term,
            types = ?self.state.enabled_types,
            matches = self.results.len(),
            pages,
            page = self.state.current_page,
            "recomputed results"
        );
    }
}
