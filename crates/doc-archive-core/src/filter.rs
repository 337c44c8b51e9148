use crate::query::QueryState;
use crate::record::DocumentRecord;
use crate::repository::Repository;

/// Records matching `query`, in repository order.
///
/// A record is kept when its file type is enabled and, for a non-empty search
/// term, the lower-cased term occurs in its title, description or category.
/// Pagination fields of `query` are ignored.
pub fn filter<'a>(repository: &'a Repository, query: &QueryState) -> Vec<&'a DocumentRecord> {
    let needle = query.search_term.to_lowercase();
    repository
        .iter()
        .filter(|record| query.enabled_types.contains(record.file_type))
        .filter(|record| needle.is_empty() || record.matches_lowercase(&needle))
        .collect()
}
