use notesync_core::interactors::NoteDetailStateEvent;

use crate::commands::common::{
    accept, capture_editor_input_with_initial, dispatch, render_title_body, resolve_cached_note,
    split_title_body, App,
};
use crate::error::CliError;

pub async fn run_edit(
    app: &App,
    id: &str,
    title: Option<String>,
    body: Option<String>,
) -> Result<(), CliError> {
    let note = resolve_cached_note(app, id).await?;

    let (title, body) = if title.is_none() && body.is_none() {
        let initial = render_title_body(&note.title, &note.body);
        let edited = capture_editor_input_with_initial(&initial)?;
        edited
            .as_deref()
            .and_then(split_title_body)
            .ok_or(CliError::EmptyTitle)?
    } else {
        (
            title.unwrap_or_else(|| note.title.clone()),
            body.unwrap_or_else(|| note.body.clone()),
        )
    };

    if title == note.title && body == note.body {
        println!("{}", note.id);
        return Ok(());
    }

    let detail = app.detail.clone();
    let id = note.id.clone();
    let outcome = dispatch(&NoteDetailStateEvent::UpdateNote, async move {
        detail
            .update_note
            .update_note(&note, &title, &body, &NoteDetailStateEvent::UpdateNote)
            .await
    })
    .await?;

    accept(outcome)?;
    println!("{id}");
    Ok(())
}
