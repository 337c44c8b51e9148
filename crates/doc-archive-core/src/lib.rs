//! Filtering, search highlighting and pagination over a document archive.
//!
//! The repository is loaded once and never mutated. [`filter`], [`paginate`]
//! and [`highlight`] are pure; [`ArchiveBrowser`] owns a [`QueryState`] and
//! re-runs them whenever the state changes.

mod browser;
mod error;
mod filter;
mod highlight;
mod pagination;
mod query;
mod record;
mod repository;
pub mod scan;
mod stats;

pub use browser::ArchiveBrowser;
pub use doc_archive_config::FileType;
pub use doc_archive_markdown::{convert, convert_opt, escape_markup};
pub use error::{ArchiveError, ArchiveResult};
pub use filter::filter;
pub use highlight::highlight;
pub use pagination::{page_count, paginate, PageButton, PageView, PaginationControls};
pub use query::{QueryState, TypeSet, DEFAULT_PAGE_SIZE};
pub use record::DocumentRecord;
pub use repository::Repository;
pub use scan::{scan_directory, DirectoryScanner};
pub use stats::{size_in_bytes, ArchiveStats};
