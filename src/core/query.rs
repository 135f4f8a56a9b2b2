//! Query and pagination value objects for product listings.
//!
//! A [`ProductQuery`] captures everything a list request can say: free-text
//! search, category and stock filters, sort order, and the page window. Out
//! of range paging values are normalized silently (never rejected); filter
//! fields are tri-state where the distinction between "absent" and "false"
//! matters. [`Page`] is the wrapper every listing comes back in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound on rows per page; larger requests are clamped down to this.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Closed set of product categories.
///
/// The `products` table stores the label as plain text; this enum is the
/// write-boundary guard that keeps unknown labels out of new rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Consumer electronics
    Electronics,
    /// Apparel
    Clothing,
    /// Household goods
    Home,
    /// Sporting goods
    Sports,
    /// Books and print
    Books,
}

impl Category {
    /// Every valid category, in display order.
    pub const ALL: [Self; 5] = [
        Self::Electronics,
        Self::Clothing,
        Self::Home,
        Self::Sports,
        Self::Books,
    ];

    /// The stored label for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Home => "Home",
            Self::Sports => "Sports",
            Self::Books => "Books",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory {
                value: s.to_string(),
            })
    }
}

/// Sort keys accepted by the product listing.
///
/// Only these three columns are sortable; parsing any other key is an error
/// rather than a silent fallback, so a bad key can never reach the query
/// builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Creation timestamp (the default; newest first when descending)
    #[default]
    CreatedAt,
    /// Unit price
    Price,
    /// Product name
    Name,
}

impl SortKey {
    /// The wire name of this sort key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "price" => Ok(Self::Price),
            "name" => Ok(Self::Name),
            _ => Err(Error::UnknownSortKey {
                value: s.to_string(),
            }),
        }
    }
}

/// One product list request: filters, sort order, and page window.
///
/// All fields have defaults, so a partially-specified request (for example
/// deserialized from UI form state) fills in the rest. `in_stock` is
/// tri-state: `None` applies no filter at all, while `Some(false)` filters
/// to out-of-stock rows only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    /// Free-text term matched case-insensitively against name or
    /// description; blank or whitespace-only means "no text filter"
    pub q: Option<String>,
    /// Exact-match category filter
    pub category: Option<Category>,
    /// Stock filter: `None` = all rows, `Some(b)` = rows where
    /// `in_stock == b`
    pub in_stock: Option<bool>,
    /// Field to sort by
    pub order_by: SortKey,
    /// Sort ascending instead of the default descending
    pub order_asc: bool,
    /// 1-based page number; values below 1 are treated as 1
    pub page: u64,
    /// Rows per page; clamped to `[1, MAX_PAGE_SIZE]`
    pub page_size: u64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            in_stock: None,
            order_by: SortKey::default(),
            order_asc: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductQuery {
    /// The page number actually used, clamped to a minimum of 1.
    #[must_use]
    pub fn effective_page(&self) -> u64 {
        self.page.max(1)
    }

    /// The page size actually used, clamped to `[1, MAX_PAGE_SIZE]`.
    #[must_use]
    pub fn effective_page_size(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based index of the first row in the requested window,
    /// saturating for page numbers too large to address any row.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.effective_page() - 1).saturating_mul(self.effective_page_size())
    }

    /// The trimmed search term, or `None` when `q` is absent or blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// A copy of this request with paging clamped and the search term
    /// trimmed (blank collapsed to `None`), so semantically equivalent
    /// requests compare and hash equal. Used as the cache key.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            q: self.search_term().map(str::to_string),
            category: self.category,
            in_stock: self.in_stock,
            order_by: self.order_by,
            order_asc: self.order_asc,
            page: self.effective_page(),
            page_size: self.effective_page_size(),
        }
    }
}

/// One page of query results plus the filter-wide total.
///
/// `total` counts every row matching the filters, ignoring the page window,
/// so `items.len() <= page_size` and `items.len() <= total` always hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows for the requested window, in query order
    pub items: Vec<T>,
    /// Count of all rows matching the filters, across all pages
    pub total: u64,
    /// Effective (clamped) 1-based page number
    pub page: u64,
    /// Effective (clamped) page size
    pub page_size: u64,
}

impl<T> Page<T> {
    /// An empty page echoing the request's effective window values.
    #[must_use]
    pub fn empty(query: &ProductQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: query.effective_page(),
            page_size: query.effective_page_size(),
        }
    }

    /// Number of pages needed to cover `total` rows at this page size.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Number of rows in this window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this window holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
