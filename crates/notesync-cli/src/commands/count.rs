use notesync_core::interactors::NoteListStateEvent;

use crate::commands::common::{accept, dispatch, App};
use crate::error::CliError;

pub async fn run_count(app: &App, as_json: bool) -> Result<(), CliError> {
    let list = app.list.clone();
    let outcome = dispatch(&NoteListStateEvent::GetNumNotesInCache, async move {
        list.get_num_notes
            .get_num_notes(&NoteListStateEvent::GetNumNotesInCache)
            .await
    })
    .await?;

    let count = accept(outcome)?
        .and_then(|state| state.num_notes_in_cache)
        .unwrap_or_default();
    if as_json {
        println!("{}", serde_json::json!({ "count": count }));
    } else {
        println!("{count}");
    }
    Ok(())
}
