//! notesync-core - Core library for notesync
//!
//! This crate contains the note model, the cache and network stores, the
//! interactors behind each user operation, and the sync engine that reconciles
//! the two stores. Front-ends (currently the CLI) drive it through
//! [`state::JobCoordinator`].

pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod interactors;
pub mod models;
pub mod remote;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Note, NoteId};
