//! Vault query filtering.
//!
//! FilterExpr::parse -> { All | Date(prefix) | Content(needle) }
//! filter_memories keeps input order; no sorting here.
//!
//! A query starting with the literal `date:` (case-insensitive) selects the
//! date predicate; everything else is a case-insensitive content substring
//! match. Recomputed from the raw query string on every render.

use crate::backend::Memory;

/// A parsed vault filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// Empty query: every item matches.
    All,
    /// `date:<prefix>` - exact-prefix match against `created_at`. The
    /// target is everything after the first ':' (so `date:10:30` keeps
    /// `10:30`), lower-cased along with the rest of the query.
    Date(String),
    /// Case-insensitive substring match against `content`.
    Content(String),
}

impl FilterExpr {
    /// Derive the filter from a raw query string.
    pub fn parse(query: &str) -> Self {
        if query.is_empty() {
            return FilterExpr::All;
        }
        let lowered = query.to_lowercase();
        match lowered.strip_prefix("date:") {
            Some(target) => FilterExpr::Date(target.to_string()),
            None => FilterExpr::Content(lowered),
        }
    }

    /// Test one memory against this expression.
    pub fn matches(&self, memory: &Memory) -> bool {
        match self {
            FilterExpr::All => true,
            // An empty target (query of exactly `date:`) matches every item
            // with a non-empty timestamp; that boundary is intentional.
            FilterExpr::Date(target) => {
                !memory.created_at.is_empty() && memory.created_at.starts_with(target.as_str())
            }
            FilterExpr::Content(needle) => memory.content.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Narrow a memory list by a free-text query. Pure and synchronous; the
/// result preserves input order.
pub fn filter_memories<'a>(items: &'a [Memory], query: &str) -> Vec<&'a Memory> {
    let expr = FilterExpr::parse(query);
    items.iter().filter(|m| expr.matches(m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, content: &str, created_at: &str) -> Memory {
        Memory {
            id: id.to_string(),
            content: content.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn sample() -> Vec<Memory> {
        vec![
            memory("1", "had coffee today", "2024-01-05T08:12:00Z"),
            memory("2", "walked the dog", "2024-01-06T09:00:00Z"),
            memory("3", "Coffee with Sam", "2024-02-01T17:30:00Z"),
            memory("4", "no timestamp yet", ""),
        ]
    }

    #[test]
    fn empty_query_matches_all_in_order() {
        let items = sample();
        let out = filter_memories(&items, "");
        assert_eq!(out.len(), items.len());
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn date_prefix_exact_day() {
        let items = sample();
        let out = filter_memories(&items, "date:2024-01-05");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn date_prefix_whole_month() {
        let items = sample();
        let out = filter_memories(&items, "date:2024-01");
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn date_token_is_case_insensitive() {
        let items = sample();
        let out = filter_memories(&items, "DATE:2024-02-01");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "3");
    }

    #[test]
    fn bare_date_token_matches_nonempty_timestamps() {
        // `date:` alone -> empty target -> everything with a timestamp.
        let items = sample();
        let out = filter_memories(&items, "date:");
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn date_target_keeps_later_colons() {
        assert_eq!(
            FilterExpr::parse("date:2024-01-05t08:12"),
            FilterExpr::Date("2024-01-05t08:12".to_string())
        );
    }

    #[test]
    fn content_substring_case_insensitive() {
        let items = sample();
        let out = filter_memories(&items, "Coffee");
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn content_no_match_yields_empty() {
        let items = sample();
        assert!(filter_memories(&items, "zzz-nothing").is_empty());
    }
}
