use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use inquire::error::InquireResult;

mod cli;
mod config;
mod entries;
mod parsers;
mod store;
#[cfg(test)]
mod tests;
mod web;

use cli::{Command, ForgetArgs};
use config::Config;
use store::Store;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config.db_path();
    Store::open(&path, Duration::from_millis(config.busy_timeout_ms))
        .with_context(|| format!("failed to open database at {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = cli::Args::parse();

    let mut config = Config::load()?;
    if let Some(db) = args.db {
        config.db_path = Some(db);
    }

    match args.command {
        Command::Init {} => {
            let store = open_store(&config)?;
            store.init_schema()?;
            println!("database initialized at {}", config.db_path().display());
            Ok(())
        }

        Command::Clean { yes } => {
            if !yes {
                match inquire::prompt_confirmation(
                    "This will delete ALL history and bookmarks. Are you really sure?",
                ) {
                    InquireResult::Ok(true) => {}
                    InquireResult::Ok(false) => return Ok(()),
                    InquireResult::Err(err) => bail!("An error occurred: {}", err),
                }
            }

            let store = open_store(&config)?;
            store.clean()?;
            println!("database cleaned");
            Ok(())
        }

        Command::ImportHistory { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let entries = parsers::parse_history_json(&content)?;
            log::info!("parsed {} history entries from {}", entries.len(), file.display());

            let store = open_store(&config)?;
            store.init_schema()?;
            let report = store.insert_history(&entries)?;
            print_json(&report)
        }

        Command::ImportBookmarks { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let entries = parsers::parse_bookmarks_file(&file, &content)?;
            log::info!("parsed {} bookmarks from {}", entries.len(), file.display());

            let store = open_store(&config)?;
            store.init_schema()?;
            let report = store.insert_bookmarks(&entries)?;
            print_json(&report)
        }

        Command::Search {
            term,
            limit,
            history,
            bookmarks,
        } => {
            let limit = limit.unwrap_or(config.default_search_limit);
            let store = open_store(&config)?;

            if history {
                print_json(&store.search_history(&term, limit)?)
            } else if bookmarks {
                print_json(&store.search_bookmarks(&term, limit)?)
            } else {
                print_json(&store.search_all(&term, limit)?)
            }
        }

        Command::Stats {} => {
            let store = open_store(&config)?;
            print_json(&store.dashboard_stats()?)
        }

        Command::Reindex { check } => {
            let store = open_store(&config)?;
            if check {
                store.check_index()?;
                println!("full-text indexes are consistent");
            } else {
                store.rebuild_index()?;
                println!("full-text indexes rebuilt");
            }
            Ok(())
        }

        Command::Forget {
            target: ForgetArgs { history, bookmark },
        } => {
            let store = open_store(&config)?;
            let removed = match (history, bookmark) {
                (Some(id), _) => store.delete_history(&id)?,
                (None, Some(id)) => store.delete_bookmark(id)?,
                (None, None) => bail!("nothing to forget"),
            };
            println!("{} item removed", if removed { 1 } else { 0 });
            Ok(())
        }

        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
                config.validate()?;
            }

            let store = open_store(&config)?;
            store.init_schema()?;
            web::start_daemon(Arc::new(store), config)
        }
    }
}
