//! One search session: the coordinators wired together with explicit dependencies.

use crate::{
    Result,
    bookmarks::BookmarkCoordinator,
    catalog::{RecipeCatalog, SpoonacularClient},
    config::AppConfig,
    db::{BookmarkStore, Database, KeyValueStore},
    grocery::GroceryList,
    history::SearchHistory,
    models::RecipeDetail,
    search::QueryCoordinator,
    state::ResultsView,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct Session {
    search: Arc<QueryCoordinator>,
    bookmarks: Arc<BookmarkCoordinator>,
    grocery: Arc<GroceryList>,
    grocery_feed: JoinHandle<()>,
}

impl Session {
    /// Build a session over the given collaborators.
    ///
    /// Loads the search history and the current bookmarks, and starts the
    /// grocery list following the bookmarked ingredients.
    pub async fn new(
        catalog: Arc<dyn RecipeCatalog>,
        store: Arc<dyn BookmarkStore>,
        prefs: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let history = SearchHistory::load(prefs).await?;
        let search = Arc::new(QueryCoordinator::new(catalog, history));

        let bookmarks = Arc::new(BookmarkCoordinator::new(store));
        bookmarks.refresh().await?;

        let grocery = Arc::new(GroceryList::new());
        let grocery_feed = grocery.attach(bookmarks.ingredients());

        Ok(Self {
            search,
            bookmarks,
            grocery,
            grocery_feed,
        })
    }

    /// Session backed by the Spoonacular client and the on-disk database from `config`.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let db = Arc::new(Database::open(config.database_path()).await?);
        let catalog = Arc::new(SpoonacularClient::with_timeout(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.request_timeout(),
        )?);

        Self::new(catalog, db.clone(), db).await
    }

    pub fn search(&self) -> &Arc<QueryCoordinator> {
        &self.search
    }

    pub fn bookmarks(&self) -> &Arc<BookmarkCoordinator> {
        &self.bookmarks
    }

    pub fn grocery(&self) -> &Arc<GroceryList> {
        &self.grocery
    }

    /// Fetch and bookmark a recipe, reusing the selected detail when it matches.
    pub async fn bookmark_recipe(&self, id: i64) -> Result<Option<RecipeDetail>> {
        let detail = match self.search.snapshot_selected() {
            Some(detail) if detail.id == id => Some(detail),
            _ => self.search.select_recipe(id).await,
        };

        match detail {
            Some(detail) => {
                self.bookmarks.bookmark(&detail).await?;
                Ok(Some(detail))
            }
            None => Ok(None),
        }
    }

    /// Bookmark whatever detail is currently selected. Returns false when nothing is.
    pub async fn bookmark_selected(&self) -> Result<bool> {
        match self.search.snapshot_selected() {
            Some(detail) => {
                self.bookmarks.bookmark(&detail).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Select a bookmark for the detail view, read back from storage.
    pub async fn open_bookmark(&self, id: i64) -> Result<Option<RecipeDetail>> {
        let detail = self.bookmarks.load_bookmark(id).await?;
        self.search.show_detail(detail.clone());
        Ok(detail)
    }

    /// Switch to the bookmark list and refresh it from storage.
    pub async fn show_bookmarks(&self) -> Result<()> {
        self.search.set_view(ResultsView::Bookmarks);
        self.bookmarks.refresh().await
    }

    pub fn show_all(&self) {
        self.search.set_view(ResultsView::All);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.grocery_feed.abort();
    }
}
