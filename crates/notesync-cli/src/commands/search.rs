use notesync_core::models::NoteOrder;

use crate::commands::common::{normalize_search_query, App};
use crate::commands::list::{print_notes, search};
use crate::error::CliError;

pub async fn run_search(
    app: &App,
    query: &str,
    page: i64,
    order: NoteOrder,
    as_json: bool,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let notes = search(app, normalized_query, order, page).await?;
    print_notes(&notes, as_json)
}
