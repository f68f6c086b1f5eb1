//! Search and sort options shared by list endpoints.

use serde::Deserialize;
use std::cmp::Ordering;

/// Sort direction for alphabetical listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Case-insensitive comparison of two labels in this direction.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let ordering = a.to_lowercase().cmp(&b.to_lowercase());
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Filter applied to an in-memory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl ListQuery {
    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_case_insensitive() {
        assert_eq!(SortOrder::Asc.compare("alpha", "Beta"), Ordering::Less);
        assert_eq!(SortOrder::Desc.compare("alpha", "Beta"), Ordering::Greater);
        assert_eq!(SortOrder::Asc.compare("Same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_search_term_blank() {
        let query = ListQuery {
            search: Some("   ".to_string()),
            sort: SortOrder::Asc,
        };
        assert!(query.search_term().is_none());

        let query = ListQuery {
            search: Some(" ana ".to_string()),
            sort: SortOrder::Asc,
        };
        assert_eq!(query.search_term(), Some("ana"));
    }
}
