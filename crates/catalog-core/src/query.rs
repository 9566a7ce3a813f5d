//! Listing queries: search filter, pagination and id lookup

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::item::Item;

/// Page number used when the request does not give one
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the request does not give one
pub const DEFAULT_LIMIT: usize = 10;

/// Raw listing parameters as they arrive in a query string.
///
/// Numbers are kept as text and parsed leniently so that values such as
/// `"2.5"` or `"3abc"` behave like their leading integer instead of failing
/// the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    /// Requested page, never below 1
    pub fn page_number(&self) -> usize {
        clamp_to_one(self.page.as_deref(), DEFAULT_PAGE)
    }

    /// Requested page size, never below 1
    pub fn limit_number(&self) -> usize {
        clamp_to_one(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    /// Lowercased search text, or `None` when no filtering applies
    pub fn needle(&self) -> Option<String> {
        self.q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub results: Vec<T>,
}

/// Filter `items` by the query text and cut out the requested page.
///
/// `total` counts every match; `total_pages` is `ceil(total / limit)` and is
/// zero for an empty match set. A page past the end yields empty results.
pub fn paginate(items: Vec<Item>, query: &ItemQuery) -> Page<Item> {
    let page = query.page_number();
    let limit = query.limit_number();

    let matches: Vec<Item> = match query.needle() {
        Some(needle) => items
            .into_iter()
            .filter(|item| item.name_matches(&needle))
            .collect(),
        None => items,
    };

    let total = matches.len();
    let total_pages = total.div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);
    let results = matches.into_iter().skip(start).take(limit).collect();

    Page {
        page,
        limit,
        total,
        total_pages,
        results,
    }
}

/// First item whose id equals the leniently parsed `raw_id`
pub fn find_item(items: Vec<Item>, raw_id: &str) -> Result<Item> {
    let id = parse_lenient_int(raw_id).ok_or_else(CatalogError::item_not_found)?;
    items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(CatalogError::item_not_found)
}

/// Parse the leading integer of `raw`, skipping leading whitespace and
/// accepting one sign. Returns `None` when there are no leading digits.
/// Values beyond the `i64` range saturate.
pub fn parse_lenient_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: Vec<i64> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = digits.into_iter().fold(0i64, |acc, d| {
        if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        }
    });
    Some(value)
}

fn clamp_to_one(raw: Option<&str>, default: usize) -> usize {
    match raw.and_then(parse_lenient_int) {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        Some(_) => 1,
        None => default,
    }
}
