use notesync_core::interactors::NoteListStateEvent;

use crate::commands::common::{
    accept, dispatch, normalize_note_identifier, resolve_note, App,
};
use crate::commands::deleted::fetch_deleted_notes;
use crate::error::CliError;

pub async fn run_restore(app: &App, id: &str) -> Result<(), CliError> {
    let query = normalize_note_identifier(id)?;
    let deleted = fetch_deleted_notes(app).await?;
    let note = resolve_note(&deleted, &query)?;

    let list = app.list.clone();
    let id = note.id.clone();
    let outcome = dispatch(&NoteListStateEvent::RestoreDeletedNote, async move {
        list.restore_deleted_note
            .restore_deleted_note(&note, &NoteListStateEvent::RestoreDeletedNote)
            .await
    })
    .await?;

    accept(outcome)?;
    println!("{id}");
    Ok(())
}
