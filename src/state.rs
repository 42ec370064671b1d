//! Observable session state
//!
//! Every container has exactly one owner that writes to it. Everyone else
//! subscribes and reads immutable snapshots.

use tokio::sync::watch;

/// Number of results requested per page
pub const PAGE_SIZE: usize = 20;

/// Fetch the next page once the visible window is this close to the end of the list
pub const PAGING_OFFSET: usize = 6;

/// Single-writer, multi-reader state holder
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Receiver notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Inspect the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Apply `f` and notify subscribers only when it reports a change
    pub(crate) fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Pagination state of the active query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Query text the results belong to
    pub query: String,
    /// Offset of the last applied page, always a multiple of `page_size`
    pub offset: usize,
    /// Results per page (fixed)
    pub page_size: usize,
    /// Total matches reported by the catalog
    pub total_results: usize,
}

impl QueryState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            query: String::new(),
            offset: 0,
            page_size: PAGE_SIZE,
            total_results: 0,
        }
    }
}

/// Lifecycle of the search state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// Nothing requested yet, or the last query was cleared
    #[default]
    Idle,
    /// A search or page fetch is in flight
    Searching,
    /// Last fetch applied its page
    Loaded,
    /// Last fetch failed and the results were cleared
    Failed,
}

/// Which list the recipe screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsView {
    /// Catalog search results
    #[default]
    All,
    /// Locally bookmarked recipes
    Bookmarks,
}

/// Search screen state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchUiState {
    pub phase: SearchPhase,
    pub view: ResultsView,
    /// Past queries, oldest first, no duplicates
    pub previous_searches: Vec<String>,
}

impl SearchUiState {
    pub fn searching(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn showing_all(&self) -> bool {
        self.view == ResultsView::All
    }

    pub fn showing_bookmarks(&self) -> bool {
        self.view == ResultsView::Bookmarks
    }
}
