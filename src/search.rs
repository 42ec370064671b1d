//! Paginated catalog search
//!
//! `QueryCoordinator` is the only writer of the result list, the query state
//! and the search UI state. Pages of the same query accumulate; a new query
//! starts from an empty list.
//!
//! Every `start_search` bumps a generation counter and every fetch carries the
//! generation it was issued under. A completion that arrives after a newer
//! search started is dropped instead of being applied to the newer query's
//! results.

use crate::{
    catalog::RecipeCatalog,
    history::SearchHistory,
    models::{Recipe, RecipeDetail},
    state::{PAGE_SIZE, PAGING_OFFSET, QueryState, ResultsView, SearchPhase, SearchUiState, StateCell},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

/// What happened to a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page appended to the results
    Applied { loaded: usize, total: usize },
    /// Fetch failed, results were cleared
    Failed,
    /// A newer search started while this fetch was in flight
    Stale,
    /// Nothing was requested
    Skipped,
}

pub struct QueryCoordinator {
    catalog: Arc<dyn RecipeCatalog>,
    history: Mutex<SearchHistory>,
    generation: AtomicU64,
    results: StateCell<Vec<Recipe>>,
    query: StateCell<QueryState>,
    ui: StateCell<SearchUiState>,
    selected: StateCell<Option<RecipeDetail>>,
}

impl QueryCoordinator {
    pub fn new(catalog: Arc<dyn RecipeCatalog>, history: SearchHistory) -> Self {
        let ui = SearchUiState {
            previous_searches: history.entries().to_vec(),
            ..Default::default()
        };

        Self {
            catalog,
            history: Mutex::new(history),
            generation: AtomicU64::new(0),
            results: StateCell::default(),
            query: StateCell::default(),
            ui: StateCell::new(ui),
            selected: StateCell::default(),
        }
    }

    pub fn results(&self) -> watch::Receiver<Vec<Recipe>> {
        self.results.subscribe()
    }

    pub fn query_state(&self) -> watch::Receiver<QueryState> {
        self.query.subscribe()
    }

    pub fn ui_state(&self) -> watch::Receiver<SearchUiState> {
        self.ui.subscribe()
    }

    pub fn selected(&self) -> watch::Receiver<Option<RecipeDetail>> {
        self.selected.subscribe()
    }

    pub fn snapshot_results(&self) -> Vec<Recipe> {
        self.results.snapshot()
    }

    pub fn snapshot_query(&self) -> QueryState {
        self.query.snapshot()
    }

    pub fn snapshot_ui(&self) -> SearchUiState {
        self.ui.snapshot()
    }

    pub fn snapshot_selected(&self) -> Option<RecipeDetail> {
        self.selected.snapshot()
    }

    /// Start a new query from offset 0.
    ///
    /// An empty (or all-whitespace) query clears the current search instead.
    pub async fn start_search(&self, query: &str) -> FetchOutcome {
        let query = query.trim();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.is_empty() {
            log::debug!("empty query, clearing search state");
            self.results.set(Vec::new());
            self.query.set(QueryState::default());
            self.ui.update(|ui| ui.phase = SearchPhase::Idle);
            return FetchOutcome::Skipped;
        }

        self.results.set(Vec::new());
        self.query.set(QueryState::new(query));
        self.record_history(query).await;
        self.ui.update(|ui| ui.phase = SearchPhase::Searching);

        log::info!("searching for '{}'", query);
        self.fetch_page(generation, query.to_string(), 0).await
    }

    /// Fetch the page after the last applied one, if there is one and no fetch is running.
    pub async fn load_next_page(&self) -> FetchOutcome {
        let state = self.query.snapshot();
        let loaded = self.results.with(Vec::len);

        if state.query.is_empty() || loaded >= state.total_results {
            return FetchOutcome::Skipped;
        }

        // check and enter Searching in one step so two callers cannot fetch the same offset
        let claimed = self.ui.update_if(|ui| {
            if ui.searching() {
                return false;
            }
            ui.phase = SearchPhase::Searching;
            true
        });
        if !claimed {
            return FetchOutcome::Skipped;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let next_offset = state.offset + state.page_size;

        log::debug!("loading '{}' page at offset {}", state.query, next_offset);
        self.fetch_page(generation, state.query, next_offset).await
    }

    /// Scroll signal from the result list. `visible_end` is one past the last visible index.
    pub async fn on_scroll(&self, visible_end: usize) -> FetchOutcome {
        if !self.should_load_more(visible_end) {
            return FetchOutcome::Skipped;
        }
        self.load_next_page().await
    }

    pub fn should_load_more(&self, visible_end: usize) -> bool {
        let loaded = self.results.with(Vec::len);
        let total = self.query.with(|q| q.total_results);
        visible_end + PAGING_OFFSET > loaded && loaded < total
    }

    /// Fetch full details for one recipe into the selected slot.
    ///
    /// A failed fetch leaves the slot empty.
    pub async fn select_recipe(&self, id: i64) -> Option<RecipeDetail> {
        let detail = match self.catalog.recipe(id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                log::error!("problems getting recipe for id {}: {}", id, e);
                None
            }
        };
        self.selected.set(detail.clone());
        detail
    }

    /// Show an already loaded detail, e.g. a bookmark read back from storage.
    pub fn show_detail(&self, detail: Option<RecipeDetail>) {
        self.selected.set(detail);
    }

    pub fn set_view(&self, view: ResultsView) {
        self.ui.update(|ui| ui.view = view);
    }

    async fn record_history(&self, query: &str) {
        let mut history = self.history.lock().await;
        match history.record(query).await {
            Ok(true) => {
                let entries = history.entries().to_vec();
                self.ui.update(|ui| ui.previous_searches = entries);
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("failed to save search history: {}", e);
                // the in-memory list still gained the entry
                let entries = history.entries().to_vec();
                self.ui.update(|ui| ui.previous_searches = entries);
            }
        }
    }

    async fn fetch_page(&self, generation: u64, query: String, offset: usize) -> FetchOutcome {
        let response = self.catalog.search(&query, offset, PAGE_SIZE).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("dropping stale results for '{}' at offset {}", query, offset);
            return FetchOutcome::Stale;
        }

        match response {
            Ok(page) => {
                let mut loaded = 0;
                self.results.update(|results| {
                    results.extend(page.recipes);
                    loaded = results.len();
                });
                self.query.set(QueryState {
                    query,
                    offset,
                    page_size: PAGE_SIZE,
                    total_results: page.total_results,
                });
                self.ui.update(|ui| ui.phase = SearchPhase::Loaded);
                FetchOutcome::Applied {
                    loaded,
                    total: page.total_results,
                }
            }
            Err(e) => {
                log::error!("problems getting recipes for '{}': {}", query, e);
                self.results.set(Vec::new());
                self.query.set(QueryState::new(query));
                self.ui.update(|ui| ui.phase = SearchPhase::Failed);
                FetchOutcome::Failed
            }
        }
    }
}
