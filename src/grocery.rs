//! Grocery list derived from the bookmarked ingredients
//!
//! Each entry pairs an ingredient with its checked flag, so the two can never
//! fall out of alignment. Checked flags live only in memory and are reset
//! whenever the ingredient list is rebuilt.

use crate::{models::Ingredient, state::StateCell};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How the grocery list is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One combined list, filterable and checkable
    #[default]
    AllList,
    /// Unchecked ("need") and checked ("have") sections
    NeedHave,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroceryItem {
    pub ingredient: Ingredient,
    pub checked: bool,
}

/// Index lists into the base items, each in original order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeedHave {
    pub need: Vec<usize>,
    pub have: Vec<usize>,
}

/// What the grocery screen shows right now
#[derive(Debug, PartialEq)]
pub enum GroceryView<'a> {
    /// `(base index, item)` pairs, already narrowed by the filter
    All(Vec<(usize, &'a GroceryItem)>),
    NeedHave {
        need: Vec<(usize, &'a GroceryItem)>,
        have: Vec<(usize, &'a GroceryItem)>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroceryUiState {
    items: Vec<GroceryItem>,
    filter: Option<String>,
    view_mode: ViewMode,
}

impl GroceryUiState {
    pub fn items(&self) -> &[GroceryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ingredients(&self) -> Vec<&Ingredient> {
        self.items.iter().map(|item| &item.ingredient).collect()
    }

    pub fn checked(&self) -> Vec<bool> {
        self.items.iter().map(|item| item.checked).collect()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// True while a filter narrows the list
    pub fn filtering(&self) -> bool {
        self.filter.is_some()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Items matching the filter (all items when there is none), with their base index.
    ///
    /// Matching is a case-sensitive substring test on the ingredient name.
    pub fn visible(&self) -> Vec<(usize, &GroceryItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| match &self.filter {
                Some(text) => item.ingredient.name.contains(text.as_str()),
                None => true,
            })
            .collect()
    }

    /// Split the unfiltered list by checked flag.
    pub fn need_have(&self) -> NeedHave {
        let (have, need): (Vec<usize>, Vec<usize>) =
            (0..self.items.len()).partition(|&i| self.items[i].checked);
        NeedHave { need, have }
    }

    pub fn view(&self) -> GroceryView<'_> {
        match self.view_mode {
            ViewMode::AllList => GroceryView::All(self.visible()),
            ViewMode::NeedHave => {
                let split = self.need_have();
                let pick = |indices: Vec<usize>| {
                    indices
                        .into_iter()
                        .map(|i| (i, &self.items[i]))
                        .collect::<Vec<_>>()
                };
                GroceryView::NeedHave {
                    need: pick(split.need),
                    have: pick(split.have),
                }
            }
        }
    }
}

/// Owner of the grocery state
#[derive(Debug, Default)]
pub struct GroceryList {
    state: StateCell<GroceryUiState>,
}

impl GroceryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> watch::Receiver<GroceryUiState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> GroceryUiState {
        self.state.snapshot()
    }

    /// Follow an ingredient feed, rebuilding the list on every published change.
    ///
    /// The current value of the feed is applied before this returns. The task
    /// ends when the feed's sender is dropped.
    pub fn attach(self: &Arc<Self>, mut ingredients: watch::Receiver<Vec<Ingredient>>) -> JoinHandle<()> {
        let initial = ingredients.borrow_and_update().clone();
        self.set_ingredients(initial);

        let list = Arc::clone(self);
        tokio::spawn(async move {
            while ingredients.changed().await.is_ok() {
                let next = ingredients.borrow_and_update().clone();
                list.set_ingredients(next);
            }
            log::debug!("ingredient feed closed, grocery list detached");
        })
    }

    /// Replace the ingredient list. A different list resets every checked flag;
    /// an identical one leaves the state alone.
    ///
    /// Returns whether the list was rebuilt.
    pub fn set_ingredients(&self, ingredients: Vec<Ingredient>) -> bool {
        let rebuilt = self.state.update_if(|state| {
            let unchanged = state.items.len() == ingredients.len()
                && state
                    .items
                    .iter()
                    .zip(&ingredients)
                    .all(|(item, next)| item.ingredient == *next);
            if unchanged {
                return false;
            }

            state.items = ingredients
                .into_iter()
                .map(|ingredient| GroceryItem {
                    ingredient,
                    checked: false,
                })
                .collect();
            true
        });

        if rebuilt {
            log::debug!("grocery list rebuilt with {} items", self.state.with(GroceryUiState::len));
        }
        rebuilt
    }

    /// Set the checked flag of the item at base index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn toggle_checked(&self, index: usize, value: bool) {
        let mut out_of_range = None;
        self.state.update_if(|state| {
            let len = state.items.len();
            match state.items.get_mut(index) {
                Some(item) if item.checked == value => false,
                Some(item) => {
                    item.checked = value;
                    true
                }
                None => {
                    out_of_range = Some(len);
                    false
                }
            }
        });

        if let Some(len) = out_of_range {
            panic!("grocery index {} out of range for {} items", index, len);
        }
    }

    /// Narrow the visible list. An empty string clears the filter.
    pub fn set_filter(&self, text: &str) {
        let filter = (!text.is_empty()).then(|| text.to_string());
        self.state.update_if(|state| {
            if state.filter == filter {
                return false;
            }
            state.filter = filter;
            true
        });
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.state.update_if(|state| {
            if state.view_mode == mode {
                return false;
            }
            state.view_mode = mode;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(recipe_id: i64, id: i64, name: &str) -> Ingredient {
        Ingredient {
            recipe_id,
            id,
            name: name.to_string(),
            aisle: String::new(),
            amount: 1.0,
            unit: String::new(),
            original: name.to_string(),
            image: None,
        }
    }

    fn names<'a>(items: impl IntoIterator<Item = (usize, &'a GroceryItem)>) -> Vec<&'a str> {
        items.into_iter().map(|(_, item)| item.ingredient.name.as_str()).collect()
    }

    fn seeded(names: &[&str]) -> GroceryList {
        let list = GroceryList::new();
        list.set_ingredients(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| ingredient(1, i as i64, name))
                .collect(),
        );
        list
    }

    fn assert_aligned(list: &GroceryList) {
        let state = list.snapshot();
        assert_eq!(state.checked().len(), state.ingredients().len());
    }

    #[test]
    fn test_filter_scenario() {
        let list = seeded(&["salt", "pepper", "sea salt"]);
        list.toggle_checked(1, true);
        let before = list.snapshot();

        list.set_filter("salt");
        let state = list.snapshot();
        assert!(state.filtering());
        assert_eq!(names(state.visible()), vec!["salt", "sea salt"]);
        assert_eq!(state.visible().iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(state.items(), before.items(), "Base list untouched");

        list.set_filter("");
        let state = list.snapshot();
        assert!(!state.filtering());
        assert_eq!(state.visible().len(), 3);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let list = seeded(&["Salt", "Pepper", "Sea Salt"]);
        list.set_filter("salt");
        assert!(list.snapshot().visible().is_empty());

        list.set_filter("Salt");
        assert_eq!(names(list.snapshot().visible()), vec!["Salt", "Sea Salt"]);
    }

    #[test]
    fn test_need_have_partition_preserves_order() {
        let list = seeded(&["flour", "egg", "milk", "bacon", "salt"]);
        list.toggle_checked(1, true);
        list.toggle_checked(3, true);

        let split = list.snapshot().need_have();
        assert_eq!(split.need, vec![0, 2, 4]);
        assert_eq!(split.have, vec![1, 3]);

        let mut union: Vec<usize> = split.need.iter().chain(&split.have).copied().collect();
        union.sort_unstable();
        assert_eq!(union, (0..5).collect::<Vec<_>>());
    }

    #[test]
    fn test_need_have_ignores_filter() {
        let list = seeded(&["flour", "egg", "milk"]);
        list.toggle_checked(0, true);
        let unfiltered = list.snapshot().need_have();

        list.set_filter("egg");
        list.set_view_mode(ViewMode::NeedHave);
        let state = list.snapshot();
        assert_eq!(state.need_have(), unfiltered);

        match state.view() {
            GroceryView::NeedHave { need, have } => {
                assert_eq!(names(need), vec!["egg", "milk"]);
                assert_eq!(names(have), vec!["flour"]);
            }
            other => panic!("expected need/have view, got {:?}", other),
        }
    }

    #[test]
    fn test_view_mode_does_not_touch_checked() {
        let list = seeded(&["flour", "egg"]);
        list.toggle_checked(1, true);

        list.set_view_mode(ViewMode::NeedHave);
        list.set_view_mode(ViewMode::AllList);
        assert_eq!(list.snapshot().checked(), vec![false, true]);
        assert!(matches!(list.snapshot().view(), GroceryView::All(items) if items.len() == 2));
    }

    #[test]
    fn test_rebuild_resets_checked() {
        let list = seeded(&["flour", "egg"]);
        list.toggle_checked(0, true);
        list.toggle_checked(1, true);

        let mut next = list.snapshot().ingredients().into_iter().cloned().collect::<Vec<_>>();
        next.push(ingredient(2, 0, "bacon"));
        assert!(list.set_ingredients(next));

        assert_eq!(list.snapshot().checked(), vec![false, false, false]);
        assert_aligned(&list);

        list.toggle_checked(2, true);
        assert!(list.set_ingredients(vec![ingredient(2, 0, "bacon")]));
        assert_eq!(list.snapshot().checked(), vec![false]);
        assert_aligned(&list);
    }

    #[test]
    fn test_identical_list_keeps_checked() {
        let list = seeded(&["flour", "egg"]);
        list.toggle_checked(1, true);

        let same = list.snapshot().ingredients().into_iter().cloned().collect();
        assert!(!list.set_ingredients(same));
        assert_eq!(list.snapshot().checked(), vec![false, true]);
    }

    #[test]
    fn test_repeated_ingredient_ids_stay_distinct() {
        let list = GroceryList::new();
        list.set_ingredients(vec![ingredient(5, 2047, "salt"), ingredient(9, 2047, "salt")]);
        list.toggle_checked(0, true);

        let state = list.snapshot();
        assert_eq!(state.len(), 2);
        assert_eq!(state.checked(), vec![true, false]);
    }

    #[test]
    fn test_alignment_holds_through_every_operation() {
        let list = GroceryList::new();
        assert_aligned(&list);
        list.set_ingredients(vec![ingredient(1, 1, "flour"), ingredient(1, 2, "egg")]);
        assert_aligned(&list);
        list.toggle_checked(0, true);
        assert_aligned(&list);
        list.set_filter("egg");
        assert_aligned(&list);
        list.set_view_mode(ViewMode::NeedHave);
        assert_aligned(&list);
        list.set_ingredients(Vec::new());
        assert_aligned(&list);
        assert!(list.snapshot().is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_toggle_out_of_range_panics() {
        let list = seeded(&["flour"]);
        list.toggle_checked(1, true);
    }

    #[tokio::test]
    async fn test_attach_follows_feed() {
        let list = Arc::new(GroceryList::new());
        let (tx, rx) = watch::channel(vec![ingredient(1, 1, "flour")]);
        let mut state_rx = list.subscribe();

        let task = list.attach(rx);
        assert_eq!(list.snapshot().len(), 1, "Current feed value is applied immediately");

        tx.send(vec![ingredient(1, 1, "flour"), ingredient(2, 1, "egg")]).unwrap();
        state_rx.wait_for(|state| state.len() == 2).await.unwrap();

        drop(tx);
        task.await.unwrap();
    }
}
