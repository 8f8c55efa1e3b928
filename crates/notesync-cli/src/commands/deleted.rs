use notesync_core::data::safe_api_call;
use notesync_core::Note;

use crate::commands::common::{format_deleted_lines, note_to_list_item, App, NoteListItem};
use crate::error::CliError;

pub async fn run_deleted(app: &App, as_json: bool) -> Result<(), CliError> {
    let mut notes = fetch_deleted_notes(app).await?;
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No deleted notes.");
    } else {
        for line in format_deleted_lines(&notes) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Read the tombstone ledger from the remote store.
pub async fn fetch_deleted_notes(app: &App) -> Result<Vec<Note>, CliError> {
    if !app.remote_enabled {
        return Err(CliError::SyncNotConfigured);
    }
    safe_api_call(app.deadlines.network, app.network.get_deleted_notes())
        .await
        .split::<()>()
        .map_err(|failure| {
            CliError::Rejected(
                failure
                    .error_message()
                    .unwrap_or("Unknown network error")
                    .to_string(),
            )
        })
}
