use notesync_core::interactors::NoteListStateEvent;
use notesync_core::Note;

use crate::commands::common::{
    accept, dispatch, load_cached_notes, normalize_note_identifier, resolve_note, App,
};
use crate::error::CliError;

/// Delete every id that resolves; unresolvable ids are reported afterwards.
pub async fn run_delete(app: &App, ids: &[String]) -> Result<(), CliError> {
    let cached = load_cached_notes(app).await?;

    let mut notes: Vec<Note> = Vec::with_capacity(ids.len());
    let mut unresolved = Vec::new();
    for id in ids {
        match normalize_note_identifier(id).and_then(|query| resolve_note(&cached, &query)) {
            Ok(note) if notes.iter().any(|picked| picked.id == note.id) => {}
            Ok(note) => notes.push(note),
            Err(error) => unresolved.push(error),
        }
    }

    if !notes.is_empty() {
        let list = app.list.clone();
        let outcome = if let [note] = notes.as_slice() {
            let note = note.clone();
            dispatch(&NoteListStateEvent::DeleteNote, async move {
                list.delete_note
                    .delete_note(&note, &NoteListStateEvent::DeleteNote)
                    .await
            })
            .await?
        } else {
            let selection = notes.clone();
            dispatch(&NoteListStateEvent::DeleteMultipleNotes, async move {
                list.delete_multiple_notes
                    .delete_notes(&selection, &NoteListStateEvent::DeleteMultipleNotes)
                    .await
            })
            .await?
        };

        accept(outcome)?;
        for note in &notes {
            println!("{}", note.id);
        }
    }

    match unresolved.len() {
        0 => Ok(()),
        1 => Err(unresolved.remove(0)),
        _ => Err(CliError::UnresolvedNotes(
            unresolved.iter().map(ToString::to_string).collect(),
        )),
    }
}
