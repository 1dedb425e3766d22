//! Page links for paginated responses.
//!
//! A paginator is built from the current request so that page links keep
//! every other query parameter (`with`, `only`, filters) intact.

use url::form_urlencoded;

use crate::request::RequestContext;

/// Builds paginators for the current request.
pub trait PaginatorFactory: Send + Sync {
    /// Returns the URL of `page` under `base`.
    fn page_url(&self, base: &str, page: usize) -> String;

    /// The page the request asked for, starting at 1.
    fn current_page(&self) -> usize;

    /// Pagination meta data for a listing of `total` items in pages of
    /// `per_page`.
    fn meta(&self, base: &str, total: usize, per_page: usize) -> Page {
        Page::new(self, base, total, per_page)
    }
}

/// Paginator that carries the request's query parameters into page links.
#[derive(Debug, Clone)]
pub struct QueryPaginatorFactory {
    query: Vec<(String, String)>,
    page_parameter: String,
}

impl QueryPaginatorFactory {
    /// Creates a paginator using the `page` parameter.
    pub fn new(request: &RequestContext) -> Self {
        Self::with_parameter(request, "page")
    }

    /// Creates a paginator using `page_parameter` for the page number.
    pub fn with_parameter(request: &RequestContext, page_parameter: impl Into<String>) -> Self {
        Self {
            query: request.query().to_vec(),
            page_parameter: page_parameter.into(),
        }
    }

    /// Name of the page parameter.
    pub fn page_parameter(&self) -> &str {
        &self.page_parameter
    }
}

impl PaginatorFactory for QueryPaginatorFactory {
    fn page_url(&self, base: &str, page: usize) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.query {
            if name != &self.page_parameter {
                serializer.append_pair(name, value);
            }
        }
        serializer.append_pair(&self.page_parameter, &page.to_string());

        format!("{}?{}", base, serializer.finish())
    }

    fn current_page(&self) -> usize {
        self.query
            .iter()
            .find(|(name, _)| name == &self.page_parameter)
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }
}

/// Pagination meta data for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Current page, starting at 1.
    pub current: usize,
    /// Last page, at least 1.
    pub last: usize,
    /// Items per page.
    pub per_page: usize,
    /// Total number of items.
    pub total: usize,
    /// Link to the previous page.
    pub previous: Option<String>,
    /// Link to the next page.
    pub next: Option<String>,
}

impl Page {
    fn new<P: PaginatorFactory + ?Sized>(
        paginator: &P,
        base: &str,
        total: usize,
        per_page: usize,
    ) -> Self {
        let per_page = per_page.max(1);
        let last = total.div_ceil(per_page).max(1);
        let current = paginator.current_page().min(last);

        Self {
            current,
            last,
            per_page,
            total,
            previous: (current > 1).then(|| paginator.page_url(base, current - 1)),
            next: (current < last).then(|| paginator.page_url(base, current + 1)),
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.current - 1) * self.per_page
    }

    /// Renders the meta data as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "current_page": self.current,
            "last_page": self.last,
            "per_page": self.per_page,
            "total": self.total,
            "links": {
                "previous": self.previous,
                "next": self.next,
            }
        })
    }
}
