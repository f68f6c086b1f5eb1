//! Search and sort query parameters shared by list endpoints.

use serde::Deserialize;

use crate::domain::listing::{ListQuery, SortOrder};

/// `?search=...&sort=asc|desc`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery {
            search: params.search,
            sort: params.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        let query: ListQuery = params.into();

        assert!(query.search.is_none());
        assert_eq!(query.sort, SortOrder::Asc);
    }

    #[test]
    fn test_sort_desc() {
        let params: ListParams =
            serde_json::from_str(r#"{"search":"ana","sort":"desc"}"#).unwrap();
        assert_eq!(params.sort, SortOrder::Desc);
        assert_eq!(params.search.as_deref(), Some("ana"));
    }

    #[test]
    fn test_unknown_sort_is_error() {
        assert!(serde_json::from_str::<ListParams>(r#"{"sort":"sideways"}"#).is_err());
    }
}
