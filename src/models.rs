//! Catalog and storage data types

use serde::{Deserialize, Deserializer, Serialize};
use std::hash::{Hash, Hasher};

/// Catalog fields are routinely `null`; treat that the same as missing.
fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A search result. Two recipes are the same recipe when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Recipe {}

impl Hash for Recipe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Full recipe information, fetched one at a time on demand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_default")]
    pub instructions: String,
    #[serde(default, deserialize_with = "null_default")]
    pub source_url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub preparation_minutes: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub cooking_minutes: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub servings: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub ready_in_minutes: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub extended_ingredients: Vec<ExtendedIngredient>,
}

impl RecipeDetail {
    pub fn recipe(&self) -> Recipe {
        Recipe {
            id: self.id,
            title: self.title.clone(),
            image: self.image.clone(),
        }
    }

    /// Rebuild a detail from a stored bookmark. Fields the store does not keep stay empty.
    pub fn from_bookmark(recipe: Recipe, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            image: recipe.image,
            extended_ingredients: ingredients.into_iter().map(ExtendedIngredient::from).collect(),
            ..Default::default()
        }
    }
}

/// Ingredient as the catalog reports it. `id` is only unique within one recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub aisle: String,
    #[serde(default, deserialize_with = "null_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_default")]
    pub original: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Stored ingredient row, tagged with the bookmarked recipe that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub aisle: String,
    pub amount: f64,
    pub unit: String,
    pub original: String,
    pub image: Option<String>,
}

impl Ingredient {
    pub fn from_extended(recipe_id: i64, ingredient: &ExtendedIngredient) -> Self {
        Self {
            recipe_id,
            id: ingredient.id,
            name: ingredient.name.clone(),
            aisle: ingredient.aisle.clone(),
            amount: ingredient.amount,
            unit: ingredient.unit.clone(),
            original: ingredient.original.clone(),
            image: ingredient.image.clone(),
        }
    }
}

impl From<Ingredient> for ExtendedIngredient {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            aisle: ingredient.aisle,
            amount: ingredient.amount,
            unit: ingredient.unit,
            original: ingredient.original,
            image: ingredient.image,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default, rename = "results", alias = "recipes")]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub total_results: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_identity_is_id() {
        let a = Recipe { id: 5, title: "Pasta".to_string(), image: None };
        let b = Recipe { id: 5, title: "Renamed".to_string(), image: Some("x.jpg".to_string()) };
        let c = Recipe { id: 6, title: "Pasta".to_string(), image: None };
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: std::collections::HashSet<Recipe> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_search_page_parses_catalog_response() {
        let body = r#"{
            "results": [
                {"id": 1, "title": "Pasta Carbonara", "image": "https://img/1.jpg", "imageType": "jpg"},
                {"id": 2, "title": "Pasta Pomodoro", "image": null}
            ],
            "offset": 0,
            "number": 2,
            "totalResults": 45
        }"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_results, 45);
        assert_eq!(page.recipes.len(), 2);
        assert_eq!(page.recipes[0].image.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(page.recipes[1].image, None);
    }

    #[test]
    fn test_search_page_accepts_recipes_alias() {
        let body = r#"{"recipes": [{"id": 9, "title": "Soup"}], "totalResults": 1}"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.recipes[0].id, 9);
    }

    #[test]
    fn test_detail_tolerates_nulls_and_missing_fields() {
        let body = r#"{
            "id": 716429,
            "title": "Pasta with Garlic",
            "summary": null,
            "sourceUrl": "https://example.com/pasta",
            "preparationMinutes": null,
            "readyInMinutes": 45,
            "servings": 2,
            "extendedIngredients": [
                {"id": 1001, "name": "butter", "aisle": "Milk, Eggs, Other Dairy", "amount": 1.0, "unit": "tbsp", "original": "1 tbsp butter"},
                {"id": 2047, "name": "salt", "aisle": null, "amount": 0.5, "unit": "tsp", "original": "1/2 tsp salt"}
            ]
        }"#;
        let detail: RecipeDetail = serde_json::from_str(body).unwrap();
        assert_eq!(detail.summary, "");
        assert_eq!(detail.preparation_minutes, 0);
        assert_eq!(detail.cooking_minutes, 0);
        assert_eq!(detail.ready_in_minutes, 45);
        assert_eq!(detail.source_url, "https://example.com/pasta");
        assert_eq!(detail.extended_ingredients.len(), 2);
        assert_eq!(detail.extended_ingredients[1].aisle, "");
    }

    #[test]
    fn test_detail_from_bookmark_keeps_ingredient_order() {
        let recipe = Recipe { id: 3, title: "Stew".to_string(), image: None };
        let rows = vec![
            Ingredient::from_extended(3, &ExtendedIngredient { id: 1, name: "beef".to_string(), ..Default::default() }),
            Ingredient::from_extended(3, &ExtendedIngredient { id: 2, name: "carrot".to_string(), ..Default::default() }),
        ];
        let detail = RecipeDetail::from_bookmark(recipe, rows);
        assert_eq!(detail.id, 3);
        let names: Vec<&str> = detail.extended_ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["beef", "carrot"]);
    }
}
