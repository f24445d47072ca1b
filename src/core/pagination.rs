use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Page/limit query parameters, shared by every paginated endpoint.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: i64,
    pub item_count: i64,
    pub items_per_page: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, params: &PageParams) -> Self {
        let limit = params.limit();
        Page {
            meta: PageMeta {
                total_items,
                item_count: items.len() as i64,
                items_per_page: limit,
                total_pages: (total_items + limit - 1) / limit,
                current_page: params.page(),
            },
            items,
        }
    }

    /// "Nothing here yet" is a valid page, not an error.
    pub fn empty(params: &PageParams) -> Self {
        Page::new(Vec::new(), 0, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_clamped() {
        let params = PageParams { page: Some(0), limit: Some(100_000) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn meta_counts_pages() {
        let params = PageParams { page: Some(2), limit: Some(10) };
        let page = Page::new(vec![1, 2, 3], 23, &params);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.item_count, 3);
        assert_eq!(page.meta.current_page, 2);
    }
}
