use std::env;
use std::future::Future;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use notesync_core::config::StoreConfig;
use notesync_core::data::{safe_cache_call, Deadlines, NoteCacheStore, NoteNetworkStore};
use notesync_core::db::LibSqlNoteCache;
use notesync_core::interactors::{NetworkMirror, NoteDetailInteractors, NoteListInteractors};
use notesync_core::remote::{FirestoreConfig, FirestoreNoteNetwork};
use notesync_core::state::{DataState, JobCoordinator, MessageType, StateEvent};
use notesync_core::sync::NoteSyncEngine;
use notesync_core::util::format_timestamp;
use notesync_core::Note;
use serde::Serialize;

use crate::error::CliError;
use crate::offline::OfflineNoteNetwork;

/// Everything a command needs, wired once per invocation.
pub struct App {
    pub cache: Arc<dyn NoteCacheStore>,
    pub network: Arc<dyn NoteNetworkStore>,
    pub mirror: NetworkMirror,
    pub list: NoteListInteractors,
    pub detail: NoteDetailInteractors,
    pub deadlines: Deadlines,
    pub config: StoreConfig,
    /// Whether `network` talks to a real remote store
    pub remote_enabled: bool,
}

impl App {
    pub async fn open(db_path: &Path, config_path: &Path) -> Result<Self, CliError> {
        let config = StoreConfig::load_from_path(config_path)?.with_env_overrides()?;
        let cache: Arc<dyn NoteCacheStore> =
            Arc::new(LibSqlNoteCache::open(db_path, config.page_size).await?);
        let (network, remote_enabled): (Arc<dyn NoteNetworkStore>, bool) =
            match FirestoreConfig::from_env()? {
                Some(remote) => {
                    tracing::info!(project = %remote.project_id, "remote store enabled");
                    (Arc::new(FirestoreNoteNetwork::new(remote)), true)
                }
                None => {
                    tracing::debug!("remote store not configured, running offline");
                    (Arc::new(OfflineNoteNetwork), false)
                }
            };
        Ok(Self::with_stores(cache, network, config, remote_enabled))
    }

    pub fn with_stores(
        cache: Arc<dyn NoteCacheStore>,
        network: Arc<dyn NoteNetworkStore>,
        config: StoreConfig,
        remote_enabled: bool,
    ) -> Self {
        let deadlines = Deadlines::from(&config);
        let mirror = NetworkMirror::new(Arc::clone(&network), deadlines.network);
        Self {
            list: NoteListInteractors::new(Arc::clone(&cache), mirror.clone(), deadlines),
            detail: NoteDetailInteractors::new(Arc::clone(&cache), mirror.clone(), deadlines),
            cache,
            network,
            mirror,
            deadlines,
            config,
            remote_enabled,
        }
    }

    pub fn sync_engine(&self) -> NoteSyncEngine {
        NoteSyncEngine::new(Arc::clone(&self.cache), Arc::clone(&self.network), &self.config)
    }

    /// Wait for every detached network write before the process exits.
    pub async fn finish(&self) {
        let pending = self.mirror.pending();
        if pending > 0 {
            tracing::debug!(pending, "flushing network mirror");
        }
        self.mirror.flush().await;
    }
}

/// Run one interactor job through a coordinator and wait for its outcome.
pub async fn dispatch<V, F>(event: &dyn StateEvent, job: F) -> Result<DataState<V>, CliError>
where
    V: Send + 'static,
    F: Future<Output = Option<DataState<V>>> + Send + 'static,
{
    let (coordinator, mut outcomes) = JobCoordinator::<V>::new();
    let handle = coordinator
        .launch_job(event, job)
        .ok_or(CliError::JobNotRun(event.event_name()))?;
    if let Err(error) = handle.await {
        tracing::warn!(%error, event = event.event_name(), "job aborted");
    }
    drop(coordinator);
    outcomes
        .recv()
        .await
        .ok_or(CliError::JobNotRun(event.event_name()))
}

/// Unwrap an outcome: error messages fail the command, others go to stderr.
pub fn accept<V>(outcome: DataState<V>) -> Result<Option<V>, CliError> {
    if let Some(message) = &outcome.state_message {
        match message.response.message_type {
            MessageType::Error => return Err(CliError::Rejected(message.response.message.clone())),
            MessageType::Info => eprintln!("{}", message.response.message),
            MessageType::Success | MessageType::None => {
                tracing::debug!(message = %message.response.message, "job succeeded");
            }
        }
    }
    Ok(outcome.data)
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        body: note.body.clone(),
        created_at: note.created_at,
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.updated_at, now_ms),
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(note);
            let title = truncate(&note.title, 30);
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_at, now_ms);
            format!("{short_id:<13}  {title:<30}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn format_deleted_lines(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            format!(
                "{:<13}  {:<30}  last edited {}",
                short_id(note),
                truncate(&note.title, 30),
                format_timestamp(note.updated_at)
            )
        })
        .collect()
}

fn short_id(note: &Note) -> String {
    note.id.as_str().chars().take(13).collect()
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.body.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Pick the single note whose id equals `query` or starts with it.
pub fn resolve_note(notes: &[Note], query: &str) -> Result<Note, CliError> {
    if let Some(note) = notes.iter().find(|note| note.id.as_str() == query) {
        return Ok(note.clone());
    }

    let matching: Vec<&Note> = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(query))
        .collect();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(query.to_string())),
        [note] => Ok((*note).clone()),
        many => {
            let options = many
                .iter()
                .take(3)
                .map(|note| short_id(note))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Every cached note, read under the cache deadline.
pub async fn load_cached_notes(app: &App) -> Result<Vec<Note>, CliError> {
    safe_cache_call(app.deadlines.cache, app.cache.get_all_notes())
        .await
        .split::<()>()
        .map_err(|failure| {
            CliError::Rejected(
                failure
                    .error_message()
                    .unwrap_or("Unknown cache error")
                    .to_string(),
            )
        })
}

/// Resolve `query` against the cache.
pub async fn resolve_cached_note(app: &App, query: &str) -> Result<Note, CliError> {
    let query = normalize_note_identifier(query)?;
    let notes = load_cached_notes(app).await?;
    resolve_note(&notes, &query)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Split editor text into a title (first line) and a body (the rest).
pub fn split_title_body(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let (title, body) = text.split_once('\n').unwrap_or((text, ""));
    let title = normalize_content(title)?;
    Some((title, body.trim().to_string()))
}

pub fn render_title_body(title: &str, body: &str) -> String {
    if body.is_empty() {
        format!("{title}\n")
    } else {
        format!("{title}\n\n{body}\n")
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program).args(parts).arg(file_path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("notesync-note-{}-{now}.md", std::process::id()))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("NOTESYNC_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notesync")
        .join("notesync.db")
}

pub fn resolve_config_path(cli_config: Option<PathBuf>) -> PathBuf {
    cli_config
        .or_else(|| env::var_os("NOTESYNC_CONFIG").map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notesync")
        .join("config.json")
}
