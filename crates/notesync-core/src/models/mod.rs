//! Data models for notesync

mod note;
mod order;

pub use note::{normalize_title, Note, NoteId};
pub use order::{
    NoteOrder, ORDER_BY_ASC_DATE_UPDATED, ORDER_BY_ASC_TITLE, ORDER_BY_DESC_DATE_UPDATED,
    ORDER_BY_DESC_TITLE,
};
