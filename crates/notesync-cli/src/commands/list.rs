use notesync_core::interactors::NoteListStateEvent;
use notesync_core::models::NoteOrder;
use notesync_core::Note;

use crate::commands::common::{
    accept, dispatch, format_note_lines, note_to_list_item, App, NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(app: &App, page: i64, order: NoteOrder, as_json: bool) -> Result<(), CliError> {
    let notes = search(app, String::new(), order, page).await?;
    print_notes(&notes, as_json)
}

/// Run the search interactor; a blank query matches every note.
pub async fn search(
    app: &App,
    query: String,
    order: NoteOrder,
    page: i64,
) -> Result<Vec<Note>, CliError> {
    let list = app.list.clone();
    let outcome = dispatch(&NoteListStateEvent::SearchNotes, async move {
        list.search_notes
            .search_notes(&query, order, page, &NoteListStateEvent::SearchNotes)
            .await
    })
    .await?;

    Ok(accept(outcome)?
        .and_then(|state| state.note_list)
        .unwrap_or_default())
}

pub fn print_notes(notes: &[Note], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes.");
    } else {
        for line in format_note_lines(notes) {
            println!("{line}");
        }
    }
    Ok(())
}
