//! Immutable builder state.
//!
//! Every builder operation derives a fresh [`BuilderState`] from the current
//! one; a state is never mutated after construction, so any intermediate
//! builder stays valid and independently reusable.

use crate::value::Value;

/// Predicate context for the next predicate-producing call.
///
/// `Combinator` means the chain just emitted `AND`/`OR` (or entered a grouped
/// sub-clause), so the next predicate must not re-emit the `WHERE` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Context {
    #[default]
    TopLevel,
    Combinator,
}

/// The ordered fragments, bound values, and sub-state carried by a builder.
#[derive(Debug, Clone, Default)]
pub struct BuilderState {
    /// Ordered SQL-text tokens; order equals emission order.
    pub(crate) fragments: Vec<String>,
    /// Bound scalars, matching the left-to-right `?` markers in `fragments`.
    pub(crate) values: Vec<Value>,
    /// Column names captured by `insert`, consumed by `into`.
    pub(crate) insert_keys: Option<Vec<String>>,
    /// Predicate context for the next predicate-producing call.
    pub(crate) context: Context,
}

impl BuilderState {
    pub(crate) fn last_fragment(&self) -> Option<&str> {
        self.fragments.last().map(String::as_str)
    }

    /// A `WHERE` keyword exists anywhere on the chain.
    ///
    /// Matches only fragments that start with the keyword, so identifiers
    /// that merely contain the text (e.g. `FROM where_log`) don't count.
    pub(crate) fn has_where(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| f == "WHERE" || f.starts_with("WHERE "))
    }

    /// The last fragment is a bare combinator token.
    pub(crate) fn ends_with_combinator(&self) -> bool {
        matches!(self.last_fragment(), Some("AND") | Some("OR"))
    }

    /// The last fragment already belongs to the LIMIT/OFFSET tail.
    pub(crate) fn ends_with_pagination(&self) -> bool {
        self.last_fragment()
            .is_some_and(|f| f.contains("LIMIT") || f.contains("OFFSET"))
    }

    /// Count of `?` placeholder markers across all fragments.
    pub(crate) fn placeholder_count(&self) -> usize {
        self.fragments
            .iter()
            .map(|f| f.matches('?').count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(fragments: &[&str]) -> BuilderState {
        BuilderState {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn has_where_scans_all_fragments() {
        assert!(state(&["SELECT *", "FROM t", "WHERE a = ?"]).has_where());
        assert!(!state(&["SELECT *", "FROM t"]).has_where());
    }

    #[test]
    fn has_where_ignores_identifiers_containing_the_keyword() {
        assert!(!state(&["SELECT *", "FROM where_log"]).has_where());
        assert!(!state(&["SELECT *", "FROM t", "somewhere = ?"]).has_where());
        assert!(state(&["SELECT *", "FROM where_log", "WHERE a = ?"]).has_where());
    }

    #[test]
    fn ends_with_combinator_only_matches_bare_tokens() {
        assert!(state(&["WHERE a = ?", "AND"]).ends_with_combinator());
        assert!(state(&["WHERE a = ?", "OR"]).ends_with_combinator());
        assert!(!state(&["WHERE a = ?", "AND b = ?"]).ends_with_combinator());
    }

    #[test]
    fn placeholder_count_sums_markers() {
        let s = state(&["WHERE a = ?", "AND", "b IN(?,?)"]);
        assert_eq!(s.placeholder_count(), 3);
    }
}
