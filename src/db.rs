use crate::{
    Result,
    models::{ExtendedIngredient, Ingredient, Recipe},
};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Durable relation of bookmarked recipes and their ingredient rows.
///
/// Pure read/write contract. Deleting a recipe removes its ingredient rows.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Insert a recipe, or update title/image of an existing one in place.
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()>;
    /// Replace the ingredient rows owned by `recipe_id`.
    async fn insert_ingredients(&self, recipe_id: i64, ingredients: &[ExtendedIngredient]) -> Result<()>;
    /// All recipes in insertion order.
    async fn find_all_recipes(&self) -> Result<Vec<Recipe>>;
    /// All ingredient rows, grouped by recipe insertion order, then row order.
    async fn find_all_ingredients(&self) -> Result<Vec<Ingredient>>;
    async fn find_recipe_by_id(&self, id: i64) -> Result<Option<Recipe>>;
    async fn find_recipe_ingredients(&self, id: i64) -> Result<Vec<Ingredient>>;
    /// Returns whether a row was removed.
    async fn delete_recipe(&self, recipe: &Recipe) -> Result<bool>;
    /// Returns whether a row was removed.
    async fn delete_recipe_by_id(&self, id: i64) -> Result<bool>;
}

/// Flat string settings
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>>;
    async fn save_string(&self, key: &str, value: &str) -> Result<()>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and bring the schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        log::info!("opening bookmark database at {}", path.display());
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS recipes (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id INTEGER NOT NULL UNIQUE,
                    title TEXT NOT NULL,
                    image TEXT
                );

                CREATE TABLE IF NOT EXISTS ingredients (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    recipe_id INTEGER NOT NULL,
                    ingredient_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    aisle TEXT NOT NULL,
                    amount REAL NOT NULL,
                    unit TEXT NOT NULL,
                    original TEXT NOT NULL,
                    image TEXT,
                    FOREIGN KEY (recipe_id) REFERENCES recipes (id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_ingredients_recipe_id ON ingredients(recipe_id);

                CREATE TABLE IF NOT EXISTS config (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
                );",
            )?;
            Ok(())
        })
        .await
    }

    async fn execute<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let start_time = Instant::now();
        let result = {
            let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            operation(&conn)
        };

        let elapsed = start_time.elapsed();
        if elapsed > Duration::from_millis(100) {
            log::warn!("slow database operation took {:?}", elapsed);
        }

        result
    }
}

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        title: row.get(1)?,
        image: row.get(2)?,
    })
}

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        recipe_id: row.get(0)?,
        id: row.get(1)?,
        name: row.get(2)?,
        aisle: row.get(3)?,
        amount: row.get(4)?,
        unit: row.get(5)?,
        original: row.get(6)?,
        image: row.get(7)?,
    })
}

#[async_trait]
impl BookmarkStore for Database {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.execute(|conn| {
            conn.execute(
                "INSERT INTO recipes (id, title, image) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET title = excluded.title, image = excluded.image",
                params![recipe.id, recipe.title, recipe.image],
            )?;
            Ok(())
        })
        .await
    }

    async fn insert_ingredients(&self, recipe_id: i64, ingredients: &[ExtendedIngredient]) -> Result<()> {
        self.execute(|conn| {
            let transaction = conn.unchecked_transaction()?;

            transaction.execute(
                "DELETE FROM ingredients WHERE recipe_id = ?1",
                params![recipe_id],
            )?;
            {
                let mut stmt = transaction.prepare(
                    "INSERT INTO ingredients (recipe_id, ingredient_id, name, aisle, amount, unit, original, image)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;

                for ingredient in ingredients {
                    stmt.execute(params![
                        recipe_id,
                        ingredient.id,
                        ingredient.name,
                        ingredient.aisle,
                        ingredient.amount,
                        ingredient.unit,
                        ingredient.original,
                        ingredient.image,
                    ])?;
                }
            } // stmt is dropped here

            transaction.commit()?;
            Ok(())
        })
        .await
    }

    async fn find_all_recipes(&self) -> Result<Vec<Recipe>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, image FROM recipes ORDER BY seq")?;
            let recipes = stmt
                .query_map([], recipe_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(recipes)
        })
        .await
    }

    async fn find_all_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.recipe_id, i.ingredient_id, i.name, i.aisle, i.amount, i.unit, i.original, i.image
                 FROM ingredients i
                 JOIN recipes r ON r.id = i.recipe_id
                 ORDER BY r.seq, i.seq",
            )?;
            let ingredients = stmt
                .query_map([], ingredient_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ingredients)
        })
        .await
    }

    async fn find_recipe_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        self.execute(|conn| {
            let recipe = conn
                .query_row(
                    "SELECT id, title, image FROM recipes WHERE id = ?1",
                    params![id],
                    recipe_from_row,
                )
                .optional()?;
            Ok(recipe)
        })
        .await
    }

    async fn find_recipe_ingredients(&self, id: i64) -> Result<Vec<Ingredient>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT recipe_id, ingredient_id, name, aisle, amount, unit, original, image
                 FROM ingredients WHERE recipe_id = ?1 ORDER BY seq",
            )?;
            let ingredients = stmt
                .query_map(params![id], ingredient_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ingredients)
        })
        .await
    }

    async fn delete_recipe(&self, recipe: &Recipe) -> Result<bool> {
        self.delete_recipe_by_id(recipe.id).await
    }

    async fn delete_recipe_by_id(&self, id: i64) -> Result<bool> {
        self.execute(|conn| {
            let removed = conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.execute(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM config WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn save_string(&self, key: &str, value: &str) -> Result<()> {
        self.execute(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO config (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }
}
