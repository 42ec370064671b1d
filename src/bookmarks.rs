use crate::{
    Result,
    db::BookmarkStore,
    models::{Ingredient, Recipe, RecipeDetail},
    state::StateCell,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Mediates every bookmark write and publishes what the store holds.
///
/// After each write the coordinator re-reads the store and publishes the
/// bookmark list and the flattened ingredient list. Subscribers are only
/// notified when a list actually changed.
pub struct BookmarkCoordinator {
    store: Arc<dyn BookmarkStore>,
    bookmarks: StateCell<Vec<Recipe>>,
    ingredients: StateCell<Vec<Ingredient>>,
}

impl BookmarkCoordinator {
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self {
            store,
            bookmarks: StateCell::default(),
            ingredients: StateCell::default(),
        }
    }

    pub fn bookmarks(&self) -> watch::Receiver<Vec<Recipe>> {
        self.bookmarks.subscribe()
    }

    pub fn ingredients(&self) -> watch::Receiver<Vec<Ingredient>> {
        self.ingredients.subscribe()
    }

    /// Save the recipe row, then its ingredient rows.
    ///
    /// The two writes are separate store calls. If the ingredient write fails
    /// for a recipe that was not bookmarked before, the new recipe row is
    /// removed again on a best-effort basis. An existing bookmark keeps its
    /// previous rows. The ingredient error is returned either way.
    pub async fn bookmark(&self, detail: &RecipeDetail) -> Result<()> {
        let recipe = detail.recipe();
        let existed = self.store.find_recipe_by_id(recipe.id).await?.is_some();
        self.store.insert_recipe(&recipe).await?;

        if let Err(e) = self
            .store
            .insert_ingredients(recipe.id, &detail.extended_ingredients)
            .await
        {
            log::error!("failed to save ingredients for recipe {}: {}", recipe.id, e);
            if !existed {
                if let Err(cleanup) = self.store.delete_recipe_by_id(recipe.id).await {
                    log::warn!("recipe {} left without ingredients: {}", recipe.id, cleanup);
                }
            }
            self.refresh_after_write().await;
            return Err(e);
        }

        log::info!(
            "bookmarked recipe {} with {} ingredients",
            recipe.id,
            detail.extended_ingredients.len()
        );
        self.refresh_after_write().await;
        Ok(())
    }

    /// Remove a bookmark and its ingredients. Unknown ids are ignored.
    pub async fn unbookmark(&self, recipe_id: i64) -> Result<()> {
        if self.store.delete_recipe_by_id(recipe_id).await? {
            log::info!("removed bookmark {}", recipe_id);
        } else {
            log::debug!("bookmark {} not present", recipe_id);
        }
        self.refresh().await
    }

    pub async fn remove(&self, recipe: &Recipe) -> Result<()> {
        self.store.delete_recipe(recipe).await?;
        self.refresh().await
    }

    /// Bookmarked recipes in the order they were saved
    pub async fn list_bookmarks(&self) -> Result<Vec<Recipe>> {
        self.store.find_all_recipes().await
    }

    /// Ingredients of every bookmark: recipe order first, then ingredient order.
    /// Entries from different recipes are never merged.
    pub async fn list_all_bookmarked_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.store.find_all_ingredients().await
    }

    pub async fn is_bookmarked(&self, recipe_id: i64) -> Result<bool> {
        Ok(self.store.find_recipe_by_id(recipe_id).await?.is_some())
    }

    /// Read a bookmark back as a detail, built from the stored recipe and ingredients.
    pub async fn load_bookmark(&self, recipe_id: i64) -> Result<Option<RecipeDetail>> {
        let Some(recipe) = self.store.find_recipe_by_id(recipe_id).await? else {
            return Ok(None);
        };
        let ingredients = self.store.find_recipe_ingredients(recipe_id).await?;
        Ok(Some(RecipeDetail::from_bookmark(recipe, ingredients)))
    }

    /// Publish after a write that already landed. A failed re-read only leaves
    /// the published lists behind the store until the next refresh.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            log::warn!("failed to refresh bookmarks after write: {}", e);
        }
    }

    /// Re-read the store and publish both lists.
    pub async fn refresh(&self) -> Result<()> {
        let recipes = self.list_bookmarks().await?;
        let ingredients = self.list_all_bookmarked_ingredients().await?;

        publish(&self.bookmarks, recipes, same_recipes);
        publish(&self.ingredients, ingredients, |a, b| a == b);
        Ok(())
    }
}

/// `Recipe` equality only looks at ids; a renamed bookmark still counts as a change here.
fn same_recipes(a: &[Recipe], b: &[Recipe]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.id == y.id && x.title == y.title && x.image == y.image)
}

fn publish<T: Clone>(cell: &StateCell<Vec<T>>, next: Vec<T>, same: impl Fn(&[T], &[T]) -> bool) {
    cell.update_if(|current| {
        if same(current.as_slice(), &next) {
            return false;
        }
        *current = next;
        true
    });
}
