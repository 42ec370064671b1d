//! Previously issued search queries, persisted as a single delimited string.
//!
//! The persisted form is the queries joined by [`DELIMITER`]. A query that
//! itself contains the delimiter comes back split into several entries on the
//! next load.

use crate::{Result, db::KeyValueStore};
use std::sync::Arc;

pub const PREVIOUS_SEARCH_KEY: &str = "PREVIOUS_SEARCH_KEY";
pub const DELIMITER: char = ',';

pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    /// Read the persisted history once. Missing or empty means no history.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let entries = match store.get_string(PREVIOUS_SEARCH_KEY).await? {
            Some(saved) if !saved.is_empty() => saved.split(DELIMITER).map(str::to_string).collect(),
            _ => Vec::new(),
        };
        log::debug!("loaded {} previous searches", entries.len());

        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append `term` unless an identical entry exists, then persist the whole list.
    ///
    /// Returns `true` when the list changed.
    pub async fn record(&mut self, term: &str) -> Result<bool> {
        if self.entries.iter().any(|existing| existing == term) {
            return Ok(false);
        }

        self.entries.push(term.to_string());
        let joined = self.entries.join(&DELIMITER.to_string());
        self.store.save_string(PREVIOUS_SEARCH_KEY, &joined).await?;
        Ok(true)
    }
}
