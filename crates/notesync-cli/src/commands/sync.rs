use notesync_core::sync::SyncSummary;

use crate::commands::common::App;
use crate::error::CliError;

pub async fn run_sync(app: &App, as_json: bool) -> Result<(), CliError> {
    if !app.remote_enabled {
        return Err(CliError::SyncNotConfigured);
    }

    let engine = app.sync_engine();
    let summary = engine.run().await.split::<()>().map_err(|failure| {
        CliError::SyncFailed(
            failure
                .error_message()
                .unwrap_or("unknown error")
                .to_string(),
        )
    })?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_sync_summary(&summary));
    }
    Ok(())
}

pub fn format_sync_summary(summary: &SyncSummary) -> String {
    let notes = &summary.notes;
    let deleted = &summary.deleted;
    let mut line = format!(
        "Sync completed: {} downloaded, {} updated locally, {} uploaded, {} unchanged",
        notes.downloaded, notes.updated_locally, notes.uploaded, notes.unchanged
    );
    if deleted.removed > 0 {
        line.push_str(&format!(
            "; {} removed as deleted elsewhere",
            deleted.removed
        ));
    }
    if notes.skipped_deleted > 0 {
        line.push_str(&format!(
            "; {} skipped as deleted elsewhere",
            notes.skipped_deleted
        ));
    }
    let failed = notes.failed + deleted.failed;
    if failed > 0 {
        line.push_str(&format!("; {failed} failed (retried next sync)"));
    }
    line
}
