use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use notesync_core::models::NoteOrder;

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Offline-first notes, kept in sync with a remote document store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the store configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quick capture: notesync "note title"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        title: Vec<String>,
        /// Note body (read from stdin when piped and omitted)
        #[arg(short, long)]
        body: Option<String>,
    },
    /// List notes
    List {
        /// Number of pages to show
        #[arg(short, long, default_value = "1")]
        page: i64,
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortOrder::Newest)]
        order: SortOrder,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search note titles and bodies
    Search {
        /// Search query (case-sensitive substring)
        query: String,
        /// Number of pages to show
        #[arg(short, long, default_value = "1")]
        page: i64,
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortOrder::Newest)]
        order: SortOrder,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title (opens $EDITOR when neither title nor body is given)
        #[arg(short, long)]
        title: Option<String>,
        /// New body
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Delete one or more notes
    Delete {
        /// Note IDs or unique ID prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List deleted notes recorded on the remote store
    Deleted {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a deleted note
    Restore {
        /// Deleted note ID or unique ID prefix
        id: String,
    },
    /// Show the number of cached notes
    Count {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile the local cache with the remote store
    Sync {
        /// Output the sync report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortOrder {
    /// Title, A to Z
    Title,
    /// Title, Z to A
    TitleDesc,
    /// Oldest edit first
    Oldest,
    /// Newest edit first
    Newest,
}

impl From<SortOrder> for NoteOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Title => Self::TitleAsc,
            SortOrder::TitleDesc => Self::TitleDesc,
            SortOrder::Oldest => Self::DateAsc,
            SortOrder::Newest => Self::DateDesc,
        }
    }
}
