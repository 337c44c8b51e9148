use std::fmt;

use doc_archive_config::{BrowseSettings, FileType};

/// Set over the four file types.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct TypeSet {
    bits: u8,
}

impl TypeSet {
    pub fn all() -> Self {
        FileType::ALL.into_iter().collect()
    }

    pub fn empty() -> Self {
        TypeSet { bits: 0 }
    }

    fn bit(file_type: FileType) -> u8 {
        match file_type {
            FileType::Doc => 1,
            FileType::Img => 1 << 1,
            FileType::Video => 1 << 2,
            FileType::Audio => 1 << 3,
        }
    }

    pub fn contains(self, file_type: FileType) -> bool {
        self.bits & Self::bit(file_type) != 0
    }

    pub fn insert(&mut self, file_type: FileType) {
        self.bits |= Self::bit(file_type);
    }

    pub fn remove(&mut self, file_type: FileType) {
        self.bits &= !Self::bit(file_type);
    }

    pub fn set(&mut self, file_type: FileType, enabled: bool) {
        if enabled {
            self.insert(file_type);
        } else {
            self.remove(file_type);
        }
    }

    pub fn is_all(self) -> bool {
        self == Self::all()
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = FileType> {
        FileType::ALL
            .into_iter()
            .filter(move |file_type| self.contains(*file_type))
    }
}

impl Default for TypeSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<FileType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = FileType>>(iter: I) -> Self {
        let mut set = TypeSet::empty();
        for file_type in iter {
            set.insert(file_type);
        }
        set
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Search, filter and page parameters driving the current view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryState {
    pub search_term: String,
    pub enabled_types: TypeSet,
    pub page_size: usize,
    pub current_page: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            search_term: String::new(),
            enabled_types: TypeSet::all(),
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl QueryState {
    /// Initial state taken from `[browse]` settings.
    pub fn from_settings(settings: &BrowseSettings) -> Self {
        QueryState {
            search_term: String::new(),
            enabled_types: settings.enabled_types.iter().copied().collect(),
            page_size: settings.page_size.max(1),
            current_page: 1,
        }
    }
}
