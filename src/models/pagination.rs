//! Pagination and search primitives shared across all list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Maximum items per page.
    const MAX_PER_PAGE: i64 = 100;

    /// Default items per page.
    const DEFAULT_PER_PAGE: i64 = 10;

    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    /// Row offset for the current page, saturating for absurdly large pages.
    pub fn offset(&self) -> i64 {
        (self.current_page() - 1).saturating_mul(self.limit())
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Free-text search parameter accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    /// `ILIKE` pattern for the trimmed search term, if one was given.
    pub fn pattern(&self) -> Option<String> {
        like_pattern(self.search.as_deref())
    }
}

/// Build a case-insensitive containment pattern, skipping blank terms.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", escape_like(t)))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `(a ILIKE $n OR b ILIKE $n ...)` over the given columns, all bound to one parameter.
pub fn search_condition(columns: &[&str], param_index: u32) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} ILIKE ${param_index}"))
        .collect();
    format!("({})", parts.join(" OR "))
}

/// Paged result envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total_records: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total_records: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let total_pages = (total_records + per_page - 1) / per_page;
        Self {
            items,
            total_records,
            current_page: pagination.current_page(),
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn non_positive_page_becomes_first_page() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(-4, 10);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn pagination_clamps_limit() {
        assert_eq!(Pagination::new(1, 500).limit(), 100);
        assert_eq!(Pagination::new(1, 0).limit(), 1);
    }

    #[test]
    fn pagination_offset_calculation() {
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let p: Pagination = serde_json::from_value(serde_json::json!({
            "page": i64::MAX,
            "limit": 10
        }))
        .unwrap();
        assert_eq!(p.current_page(), i64::MAX);
        assert_eq!(p.offset(), i64::MAX);
        assert!(p.offset() >= 0);
    }

    #[test]
    fn paged_result_total_pages() {
        let p = Pagination::new(1, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &p);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_records, 25);
        assert_eq!(result.current_page, 1);

        let empty = PagedResult::<i32>::new(vec![], 0, &p);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some(" ada ")), Some("%ada%".to_string()));
    }

    #[test]
    fn like_wildcards_in_search_match_literally() {
        assert_eq!(like_pattern(Some("a_b")), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern(Some("50%")), Some("%50\\%%".to_string()));
        assert_eq!(like_pattern(Some("_")), Some("%\\_%".to_string()));
        assert_eq!(like_pattern(Some(r"c:\x")), Some(r"%c:\\x%".to_string()));
    }

    #[test]
    fn search_condition_reuses_one_parameter() {
        let sql = search_condition(&["p.first_name", "p.last_name"], 2);
        assert_eq!(sql, "(p.first_name ILIKE $2 OR p.last_name ILIKE $2)");
    }
}
