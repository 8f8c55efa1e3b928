pub mod add;
pub mod common;
pub mod count;
pub mod delete;
pub mod deleted;
pub mod edit;
pub mod list;
pub mod restore;
pub mod search;
pub mod sync;
