use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Database file. Overrides DB_PATH and the config file.
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ForgetArgs {
    /// History entry id
    #[clap(long)]
    pub history: Option<String>,

    /// Bookmark id
    #[clap(long)]
    pub bookmark: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema (safe to run again).
    Init {},

    /// Delete ALL history and bookmarks.
    Clean {
        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },

    /// Import a history export (.json).
    ImportHistory {
        /// Path to the export
        file: PathBuf,
    },

    /// Import bookmarks (.json, .html or .htm).
    ImportBookmarks {
        /// Path to the export
        file: PathBuf,
    },

    /// Full-text search over history and bookmarks.
    Search {
        /// Search term, passed to the full-text index as is
        #[clap(allow_hyphen_values = true)]
        term: String,

        /// Maximum number of results
        #[clap(short, long)]
        limit: Option<usize>,

        /// Search history only
        #[clap(long, conflicts_with = "bookmarks")]
        history: bool,

        /// Search bookmarks only
        #[clap(long)]
        bookmarks: bool,
    },

    /// Print dashboard statistics.
    Stats {},

    /// Rebuild the full-text indexes.
    Reindex {
        /// Only run an integrity check
        #[clap(long, default_value = "false")]
        check: bool,
    },

    /// Delete a single history entry or bookmark.
    Forget {
        #[clap(flatten)]
        target: ForgetArgs,
    },

    /// Start the api and dashboard server.
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[clap(long)]
        listen: Option<String>,
    },
}
