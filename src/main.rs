use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;
use recipe_finder::cli::{Cli, Command};
use recipe_finder::{commands, config::AppConfig, session::Session};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    recipe_finder::logging::init().context("init logging")?;

    let cli = Cli::parse();
    log::debug!("parsed cli: {:?}", cli);

    let config = AppConfig::load(cli.config.as_deref()).context("load config")?;
    if config.api_key.is_empty() {
        log::warn!(
            "no API key configured; set {} or api_key in {}",
            recipe_finder::config::API_KEY_ENV,
            AppConfig::default_path().display()
        );
    }

    let session = Session::open(&config).await.context("open session")?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Search(args) => commands::search(&session, args, &mut out).await.context("search")?,
        Command::Show { id } => commands::show(&session, id, &mut out).await.context("show")?,
        Command::Bookmark { id } => commands::bookmark(&session, id, &mut out).await.context("bookmark")?,
        Command::Unbookmark { id } => commands::unbookmark(&session, id, &mut out).await.context("unbookmark")?,
        Command::Bookmarks => commands::bookmarks(&session, &mut out).await.context("bookmarks")?,
        Command::Groceries(args) => commands::groceries(&session, args, &mut out).context("groceries")?,
        Command::History => commands::history(&session, &mut out).context("history")?,
    }

    Ok(())
}
