use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Config file (defaults to the per-user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog and list matching recipes.
    Search(SearchArgs),
    /// Show one recipe, from bookmarks when saved, otherwise from the catalog.
    Show { id: i64 },
    /// Fetch a recipe and save it with its ingredients.
    Bookmark { id: i64 },
    /// Remove a saved recipe and its ingredients.
    Unbookmark { id: i64 },
    /// List saved recipes in the order they were saved.
    Bookmarks,
    /// Print the grocery list built from every saved recipe.
    Groceries(GroceryArgs),
    /// List previous search terms.
    History,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,

    /// Number of result pages to load.
    #[arg(long, default_value_t = 1)]
    pub pages: usize,
}

#[derive(Debug, Args)]
pub struct GroceryArgs {
    /// Only show ingredients whose name contains this text (case-sensitive).
    #[arg(long)]
    pub filter: Option<String>,

    /// Split the list into needed and already-had sections.
    #[arg(long)]
    pub need_have: bool,

    /// Mark the items at these list positions as had.
    #[arg(long, num_args = 1..)]
    pub check: Vec<usize>,
}
