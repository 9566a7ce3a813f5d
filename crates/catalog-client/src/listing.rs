//! Paginated, searchable list state
//!
//! Every change to the page or search text starts a new fetch. Fetches are
//! numbered; a response is only applied if it belongs to the latest fetch, so
//! a slow reply for an old search cannot overwrite a newer one. There is no
//! debounce: each keystroke is its own fetch.

use std::ops::Range;

use catalog_core::{Item, Page};

use crate::client::{CatalogClient, ItemsData, ListParams};
use crate::error::ClientError;

/// Page size requested by the list
pub const PAGE_LIMIT: usize = 100;

/// Message shown when a listing comes back empty
pub const EMPTY_MESSAGE: &str = "No items found.";

/// A fetch the front end should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub params: ListParams,
}

impl FetchRequest {
    /// Run the fetch against `client`
    pub async fn execute(self, client: &CatalogClient) -> FetchOutcome {
        let result = client.list_items(&self.params).await;
        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of a [`FetchRequest`]
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Page<Item>, ClientError>,
}

/// What the list area should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Rows(&'a [Item]),
}

/// State of the item list: parameters, in-flight status and last results
#[derive(Debug, Clone)]
pub struct ListingState {
    page: usize,
    limit: usize,
    search: String,
    loading: bool,
    generation: u64,
    data: ItemsData,
    last_error: Option<String>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingState {
    pub fn new() -> Self {
        Self {
            page: 1,
            limit: PAGE_LIMIT,
            search: String::new(),
            loading: false,
            generation: 0,
            data: ItemsData::new(),
            last_error: None,
        }
    }

    /// The initial fetch
    pub fn start(&mut self) -> FetchRequest {
        self.begin_fetch()
    }

    /// Replace the search text. Always returns to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) -> FetchRequest {
        self.search = search.into();
        self.page = 1;
        self.begin_fetch()
    }

    /// Append a typed character to the search text
    pub fn push_search_char(&mut self, c: char) -> FetchRequest {
        let mut search = self.search.clone();
        search.push(c);
        self.set_search(search)
    }

    /// Remove the last character of the search text, if any
    pub fn pop_search_char(&mut self) -> Option<FetchRequest> {
        let mut search = self.search.clone();
        search.pop()?;
        Some(self.set_search(search))
    }

    /// Move to the next page when allowed
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if !self.can_next() {
            return None;
        }
        self.page += 1;
        Some(self.begin_fetch())
    }

    /// Move to the previous page when allowed
    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if !self.can_prev() {
            return None;
        }
        self.page -= 1;
        Some(self.begin_fetch())
    }

    /// Apply a finished fetch. Returns false if it was superseded and ignored.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "Ignoring superseded fetch"
            );
            return false;
        }

        self.loading = false;
        match outcome.result {
            Ok(page) => {
                self.data.apply_page(page);
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!("Failed to fetch items: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1 && !self.loading
    }

    pub fn can_next(&self) -> bool {
        !self.loading && self.page < self.data.total_pages
    }

    pub fn view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.data.items.is_empty() {
            ListView::Empty
        } else {
            ListView::Rows(&self.data.items)
        }
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.data.total_pages)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn items(&self) -> &[Item] {
        &self.data.items
    }

    pub fn total_pages(&self) -> usize {
        self.data.total_pages
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        FetchRequest {
            generation: self.generation,
            params: ListParams {
                page: self.page,
                limit: self.limit,
                q: self.search.clone(),
            },
        }
    }
}

/// Fixed-row-height windowing over a list.
///
/// Only rows intersecting the viewport (plus `overscan` rows either side) are
/// rendered. Units are whatever the front end measures in: pixels, terminal
/// lines. Row height is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualWindow {
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self {
            row_height: 40,
            viewport_height: 400,
            overscan: 1,
        }
    }
}

impl VirtualWindow {
    pub fn new(row_height: u32, viewport_height: u32) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height,
            overscan: 0,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Number of rows that fit in the viewport, counting a partial row
    pub fn rows_per_viewport(&self) -> usize {
        self.viewport_height.div_ceil(self.row_height) as usize
    }

    /// Total height of `item_count` rows
    pub fn content_height(&self, item_count: usize) -> u64 {
        item_count as u64 * u64::from(self.row_height)
    }

    /// Largest useful scroll offset
    pub fn max_scroll(&self, item_count: usize) -> u32 {
        let overflow = self
            .content_height(item_count)
            .saturating_sub(u64::from(self.viewport_height));
        u32::try_from(overflow).unwrap_or(u32::MAX)
    }

    /// Offset of the top of row `index`
    pub fn row_offset(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height)
    }

    /// Indices of rows to render at `scroll_offset`
    pub fn visible_range(&self, item_count: usize, scroll_offset: u32) -> Range<usize> {
        if item_count == 0 {
            return 0..0;
        }
        let scroll = u64::from(scroll_offset.min(self.max_scroll(item_count)));
        let row_height = u64::from(self.row_height);
        let first = (scroll / row_height) as usize;
        let last = (scroll + u64::from(self.viewport_height)).div_ceil(row_height) as usize;
        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(item_count);
        start..end
    }

    /// Scroll offset that brings row `index` fully into view, starting from
    /// `scroll_offset`
    pub fn scroll_to(&self, index: usize, scroll_offset: u32, item_count: usize) -> u32 {
        let top = self.row_offset(index);
        let bottom = top + u64::from(self.row_height);
        let current = u64::from(scroll_offset);

        let target = if top < current {
            top
        } else if bottom > current + u64::from(self.viewport_height) {
            bottom.saturating_sub(u64::from(self.viewport_height))
        } else {
            current
        };
        u32::try_from(target)
            .unwrap_or(u32::MAX)
            .min(self.max_scroll(item_count))
    }
}
