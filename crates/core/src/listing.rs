//! Product list querying: pagination, sorting, search and column filters,
//! and their translation into the list endpoint's query string.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::product::ProductType;
use crate::types::Timestamp;

/// Rows per page when nothing else is chosen.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Title,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Price => "price",
            Self::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Parameters of `GET /api/products/`. Unset fields are left out of the
/// query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub product_type: ProductType,
    pub cursor: Option<u64>,
    pub limit: Option<u64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub title_search: Option<String>,
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,
    pub updated_after: Option<Timestamp>,
    pub updated_before: Option<Timestamp>,
    pub active: Option<bool>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortDirection>,
}

impl ProductQuery {
    /// Query-string pairs in the order the backend documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("productType", self.product_type.as_str().to_string())];

        if let Some(cursor) = self.cursor {
            pairs.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(title) = &self.title_search {
            pairs.push(("titleSearch", title.clone()));
        }
        for (key, value) in [
            ("createdAfter", self.created_after),
            ("createdBefore", self.created_before),
            ("updatedAfter", self.updated_after),
            ("updatedBefore", self.updated_before),
        ] {
            if let Some(ts) = value {
                pairs.push((key, ts.to_rfc3339_opts(SecondsFormat::Millis, true)));
            }
        }
        if let Some(active) = self.active {
            pairs.push(("active", active.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_str().to_string()));
        }

        pairs
    }

    /// Stable key identifying this query in the client cache.
    pub fn cache_key(&self) -> String {
        let query: Vec<String> = self
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("products?{}", query.join("&"))
    }
}

// ---------------------------------------------------------------------------
// List screen state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Offset of the first row on the current page. Saturates instead of
    /// overflowing on absurd page numbers.
    pub fn cursor(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows (at least one).
    pub fn page_count(&self, total: u64) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(self.page_size).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sorting {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Date window used by the created/updated filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub after: Option<Timestamp>,
    pub before: Option<Timestamp>,
}

/// Column filters of the product table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub title: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub tags: Vec<String>,
    pub created: DateRange,
    pub updated: DateRange,
    pub active: Option<bool>,
}

/// Everything the product table needs to build its next request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListState {
    pub pagination: Pagination,
    pub sorting: Sorting,
    pub search: String,
    pub filters: ProductFilters,
}

impl ProductListState {
    /// Changing the search text jumps back to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.pagination.page_index = 0;
    }

    /// Changing filters jumps back to the first page.
    pub fn set_filters(&mut self, filters: ProductFilters) {
        self.filters = filters;
        self.pagination.page_index = 0;
    }

    pub fn set_sorting(&mut self, field: SortField, direction: SortDirection) {
        self.sorting = Sorting { field, direction };
    }

    pub fn set_page(&mut self, page_index: u64) {
        self.pagination.page_index = page_index;
    }

    pub fn to_query(&self, product_type: ProductType) -> ProductQuery {
        let search = Some(self.search.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        ProductQuery {
            product_type,
            cursor: Some(self.pagination.cursor()),
            limit: Some(self.pagination.page_size),
            min_price: self.filters.min_price,
            max_price: self.filters.max_price,
            tags: self.filters.tags.clone(),
            search,
            title_search: self.filters.title.clone().filter(|t| !t.is_empty()),
            created_after: self.filters.created.after,
            created_before: self.filters.created.before,
            updated_after: self.filters.updated.after,
            updated_before: self.filters.updated.before,
            active: self.filters.active,
            sort_by: Some(self.sorting.field),
            sort_order: Some(self.sorting.direction),
        }
    }
}
