use crate::filters::FilterValues;
use crate::query;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameters of a single listing page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// 1-based page number
    pub page: u32,
    /// Listings per page
    pub page_size: u32,
    /// Active filter values
    pub filters: FilterValues,
}

impl ListingQuery {
    pub fn new(page: u32, page_size: u32, filters: FilterValues) -> Self {
        Self {
            page,
            page_size,
            filters,
        }
    }

    /// Query pairs sent to the listing service: paging first, then the filters
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (query::PAGE, self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        pairs.extend(query::query_pairs(&self.filters));
        pairs
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: FilterValues::default(),
        }
    }
}
