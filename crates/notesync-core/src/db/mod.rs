//! Database layer for notesync

mod connection;
mod migrations;
mod note_cache;

pub use connection::Database;
pub use note_cache::LibSqlNoteCache;
