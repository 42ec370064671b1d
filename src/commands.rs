//! Command implementations behind the CLI. Each writes its report to `out`.

use crate::{
    cli::{GroceryArgs, SearchArgs},
    grocery::{GroceryItem, GroceryView, ViewMode},
    models::RecipeDetail,
    search::FetchOutcome,
    session::Session,
    state::SearchPhase,
};
use anyhow::{Context as _, bail};
use std::io::Write;

pub async fn search(session: &Session, args: SearchArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let search = session.search();
    search.start_search(&args.query).await;

    for _ in 1..args.pages {
        if !matches!(search.load_next_page().await, FetchOutcome::Applied { .. }) {
            break;
        }
    }

    if search.snapshot_ui().phase == SearchPhase::Failed {
        bail!("search for '{}' failed", args.query.trim());
    }

    let state = search.snapshot_query();
    let results = search.snapshot_results();
    writeln!(out, "{} of {} results for '{}'", results.len(), state.total_results, state.query)?;
    for recipe in &results {
        writeln!(out, "{}\t{}", recipe.id, recipe.title)?;
    }
    Ok(())
}

/// Bookmarked recipes are read from storage; anything else comes from the catalog.
pub async fn show(session: &Session, id: i64, out: &mut impl Write) -> anyhow::Result<()> {
    let detail = match session.open_bookmark(id).await.context("read bookmark")? {
        Some(detail) => detail,
        None => match session.search().select_recipe(id).await {
            Some(detail) => detail,
            None => bail!("recipe {} could not be fetched", id),
        },
    };
    write_detail(&detail, out)?;
    Ok(())
}

pub async fn bookmark(session: &Session, id: i64, out: &mut impl Write) -> anyhow::Result<()> {
    match session.bookmark_recipe(id).await.context("save bookmark")? {
        Some(detail) => {
            writeln!(
                out,
                "bookmarked {} ({} ingredients)",
                detail.title,
                detail.extended_ingredients.len()
            )?;
            Ok(())
        }
        None => bail!("recipe {} could not be fetched", id),
    }
}

pub async fn unbookmark(session: &Session, id: i64, out: &mut impl Write) -> anyhow::Result<()> {
    let bookmarks = session.bookmarks();
    if !bookmarks.is_bookmarked(id).await? {
        writeln!(out, "recipe {} is not bookmarked", id)?;
        return Ok(());
    }
    bookmarks.unbookmark(id).await.context("remove bookmark")?;
    writeln!(out, "removed bookmark {}", id)?;
    Ok(())
}

pub async fn bookmarks(session: &Session, out: &mut impl Write) -> anyhow::Result<()> {
    session.show_bookmarks().await.context("load bookmarks")?;
    for recipe in session.bookmarks().list_bookmarks().await? {
        writeln!(out, "{}\t{}", recipe.id, recipe.title)?;
    }
    Ok(())
}

/// Print the grocery list. Positions passed to `--check` index the unfiltered list.
pub fn groceries(session: &Session, args: GroceryArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let grocery = session.grocery();

    let len = grocery.snapshot().len();
    for &index in &args.check {
        if index >= len {
            bail!("no grocery item at position {} ({} items)", index, len);
        }
        grocery.toggle_checked(index, true);
    }

    if let Some(text) = &args.filter {
        grocery.set_filter(text);
    }
    if args.need_have {
        grocery.set_view_mode(ViewMode::NeedHave);
    }

    let state = grocery.snapshot();
    match state.view() {
        GroceryView::All(items) => {
            for (index, item) in items {
                write_item(index, item, out)?;
            }
        }
        GroceryView::NeedHave { need, have } => {
            writeln!(out, "Need")?;
            for (index, item) in need {
                write_item(index, item, out)?;
            }
            writeln!(out, "Have")?;
            for (index, item) in have {
                write_item(index, item, out)?;
            }
        }
    }
    Ok(())
}

pub fn history(session: &Session, out: &mut impl Write) -> anyhow::Result<()> {
    for term in session.search().snapshot_ui().previous_searches {
        writeln!(out, "{}", term)?;
    }
    Ok(())
}

fn write_detail(detail: &RecipeDetail, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{} ({})", detail.title, detail.id)?;
    if detail.ready_in_minutes > 0 {
        writeln!(out, "ready in {} minutes, serves {}", detail.ready_in_minutes, detail.servings)?;
    }
    if !detail.source_url.is_empty() {
        writeln!(out, "{}", detail.source_url)?;
    }
    for ingredient in &detail.extended_ingredients {
        if ingredient.original.is_empty() {
            writeln!(out, "  - {}", ingredient.name)?;
        } else {
            writeln!(out, "  - {}", ingredient.original)?;
        }
    }
    if !detail.instructions.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", detail.instructions)?;
    }
    Ok(())
}

fn write_item(index: usize, item: &GroceryItem, out: &mut impl Write) -> std::io::Result<()> {
    let mark = if item.checked { 'x' } else { ' ' };
    writeln!(out, "[{}] {:>3} {}", mark, index, item.ingredient.name)
}
