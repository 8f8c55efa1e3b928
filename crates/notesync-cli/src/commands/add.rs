use notesync_core::interactors::NoteListStateEvent;

use crate::commands::common::{accept, dispatch, normalize_content, read_piped_stdin, App};
use crate::error::CliError;

pub async fn run_add(app: &App, title_parts: &[String], body: Option<String>) -> Result<(), CliError> {
    let title = normalize_content(&title_parts.join(" ")).ok_or(CliError::EmptyTitle)?;
    let body = match body {
        Some(body) => body,
        None => read_piped_stdin()?.unwrap_or_default(),
    };

    let list = app.list.clone();
    let outcome = dispatch(&NoteListStateEvent::InsertNewNote, async move {
        list.insert_new_note
            .insert_new_note(None, &title, &body, &NoteListStateEvent::InsertNewNote)
            .await
    })
    .await?;

    if let Some(note) = accept(outcome)?.and_then(|state| state.new_note) {
        println!("{}", note.id);
    }
    Ok(())
}
