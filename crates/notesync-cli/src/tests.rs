use std::sync::Arc;

use notesync_core::config::StoreConfig;
use notesync_core::data::memory::{InMemoryNoteCache, InMemoryNoteNetwork};
use notesync_core::data::{NoteCacheStore, NoteNetworkStore};
use notesync_core::db::LibSqlNoteCache;
use notesync_core::sync::{SyncDeletedReport, SyncReport, SyncSummary};
use notesync_core::{Note, NoteId};
use pretty_assertions::assert_eq;

use crate::commands::add::run_add;
use crate::commands::common::{
    default_editor, format_relative_time, normalize_content, normalize_note_identifier,
    normalize_search_query, note_preview, render_title_body, resolve_note, split_title_body, App,
};
use crate::commands::delete::run_delete;
use crate::commands::deleted::fetch_deleted_notes;
use crate::commands::edit::run_edit;
use crate::commands::list::search;
use crate::commands::restore::run_restore;
use crate::commands::sync::{format_sync_summary, run_sync};
use crate::error::CliError;
use crate::offline::OfflineNoteNetwork;

fn note(id: &str, title: &str, body: &str, updated_at: i64) -> Note {
    Note {
        id: NoteId::from(id),
        title: title.to_string(),
        body: body.to_string(),
        created_at: updated_at,
        updated_at,
    }
}

struct TestApp {
    app: App,
    cache: Arc<InMemoryNoteCache>,
    network: Arc<InMemoryNoteNetwork>,
}

fn test_app(notes: Vec<Note>) -> TestApp {
    let cache = Arc::new(InMemoryNoteCache::with_notes(30, notes));
    let network = Arc::new(InMemoryNoteNetwork::new());
    let app = App::with_stores(
        cache.clone(),
        network.clone(),
        StoreConfig::default(),
        true,
    );
    TestApp {
        app,
        cache,
        network,
    }
}

fn offline_app() -> App {
    App::with_stores(
        Arc::new(InMemoryNoteCache::new(30)),
        Arc::new(OfflineNoteNetwork),
        StoreConfig::default(),
        false,
    )
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn note_preview_uses_first_body_line() {
    let note = note("a", "title", "first   line here\nsecond", 1);
    assert_eq!(note_preview(&note, 40), "first line here");
    assert_eq!(note_preview(&note, 8), "first...");
}

#[test]
fn normalize_search_query_rejects_empty() {
    assert!(matches!(
        normalize_search_query("   "),
        Err(CliError::EmptySearchQuery)
    ));
    assert_eq!(normalize_search_query(" milk ").unwrap(), "milk");
}

#[test]
fn normalize_note_identifier_rejects_empty() {
    assert!(matches!(
        normalize_note_identifier(""),
        Err(CliError::EmptyNoteId)
    ));
}

#[test]
fn editor_text_splits_into_title_and_body() {
    assert_eq!(
        split_title_body("Title\n\nline one\nline two\n"),
        Some(("Title".to_string(), "line one\nline two".to_string()))
    );
    assert_eq!(
        split_title_body("  Only title  "),
        Some(("Only title".to_string(), String::new()))
    );
    assert_eq!(split_title_body("   \n\nbody without title"), Some((
        "body without title".to_string(),
        String::new()
    )));
    assert_eq!(split_title_body(" \n "), None);

    let rendered = render_title_body("Title", "body");
    assert_eq!(
        split_title_body(&rendered),
        Some(("Title".to_string(), "body".to_string()))
    );
}

#[test]
fn resolve_note_supports_exact_and_prefix_id() {
    let notes = vec![
        note("abc-1", "one", "", 1),
        note("abd-2", "two", "", 2),
        note("abc", "exact", "", 3),
    ];

    assert_eq!(resolve_note(&notes, "abc").unwrap().title, "exact");
    assert_eq!(resolve_note(&notes, "abd").unwrap().title, "two");
    assert!(matches!(
        resolve_note(&notes, "ab"),
        Err(CliError::AmbiguousNoteId(_))
    ));
    assert!(matches!(
        resolve_note(&notes, "zzz"),
        Err(CliError::NoteNotFound(_))
    ));
}

#[test]
fn sync_summary_line_mentions_failures_only_when_present() {
    let summary = SyncSummary {
        deleted: SyncDeletedReport::default(),
        notes: SyncReport {
            downloaded: 2,
            uploaded: 1,
            ..SyncReport::default()
        },
    };
    let line = format_sync_summary(&summary);
    assert!(line.starts_with("Sync completed: 2 downloaded, 0 updated locally, 1 uploaded"));
    assert!(!line.contains("failed"));

    let failed = SyncSummary {
        notes: SyncReport {
            failed: 3,
            ..SyncReport::default()
        },
        ..summary
    };
    assert!(format_sync_summary(&failed).contains("3 failed"));

    let skipped_only = SyncSummary {
        notes: SyncReport {
            skipped_deleted: 2,
            ..SyncReport::default()
        },
        ..summary
    };
    let line = format_sync_summary(&skipped_only);
    assert!(line.contains("2 skipped as deleted elsewhere"));
    assert!(!line.contains("removed"));
}

#[tokio::test(flavor = "current_thread")]
async fn add_writes_cache_and_mirrors_on_finish() {
    let t = test_app(Vec::new());

    run_add(&t.app, &["Groceries".to_string()], Some("milk".to_string()))
        .await
        .unwrap();
    t.app.finish().await;

    let cached = t.cache.snapshot();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "Groceries");
    assert_eq!(t.network.live_notes().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn add_rejects_blank_title() {
    let t = test_app(Vec::new());

    let error = run_add(&t.app, &["  ".to_string()], Some(String::new()))
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyTitle));
    assert!(t.cache.snapshot().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn search_pages_through_interactor() {
    let notes = (0..5)
        .map(|i| note(&format!("n-{i}"), &format!("Title {i}"), "", i64::from(i)))
        .collect();
    let t = test_app(notes);

    let found = search(&t.app, String::new(), Default::default(), 1)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["n-4", "n-3", "n-2", "n-1", "n-0"]);
}

#[tokio::test(flavor = "current_thread")]
async fn edit_with_flags_updates_title_only() {
    let t = test_app(vec![note("abc", "old", "keep", 1)]);

    run_edit(&t.app, "ab", Some("new".to_string()), None)
        .await
        .unwrap();
    t.app.finish().await;

    let cached = t.cache.search_note_by_id(&NoteId::from("abc")).await.unwrap().unwrap();
    assert_eq!(cached.title, "new");
    assert_eq!(cached.body, "keep");
    assert_eq!(t.network.live_notes()[0].title, "new");
}

#[tokio::test(flavor = "current_thread")]
async fn delete_many_then_restore_one() {
    let t = test_app(vec![
        note("aaa", "first", "", 1),
        note("bbb", "second", "", 2),
    ]);

    run_delete(&t.app, &["aaa".to_string(), "bbb".to_string()])
        .await
        .unwrap();
    t.app.finish().await;
    assert!(t.cache.snapshot().is_empty());
    assert_eq!(fetch_deleted_notes(&t.app).await.unwrap().len(), 2);

    run_restore(&t.app, "bb").await.unwrap();
    t.app.finish().await;

    let cached = t.cache.snapshot();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id.as_str(), "bbb");
    assert!(!t.network.has_tombstone(&NoteId::from("bbb")));
    assert!(t.network.has_tombstone(&NoteId::from("aaa")));
}

#[tokio::test(flavor = "current_thread")]
async fn delete_removes_resolvable_notes_and_reports_unknown_id() {
    let t = test_app(vec![
        note("aaa", "first", "", 1),
        note("bbb", "second", "", 2),
        note("ccc", "third", "", 3),
    ]);

    let error = run_delete(&t.app, &["aaa".to_string(), "zzz".to_string(), "bb".to_string()])
        .await
        .unwrap_err();
    t.app.finish().await;

    assert!(matches!(error, CliError::NoteNotFound(ref id) if id == "zzz"));
    let remaining: Vec<_> = t
        .cache
        .snapshot()
        .into_iter()
        .map(|note| note.id.to_string())
        .collect();
    assert_eq!(remaining, vec!["ccc".to_string()]);
    assert!(t.network.has_tombstone(&NoteId::from("aaa")));
    assert!(t.network.has_tombstone(&NoteId::from("bbb")));
}

#[tokio::test(flavor = "current_thread")]
async fn delete_aggregates_every_unresolved_id() {
    let t = test_app(vec![note("abc-1", "one", "", 1), note("abc-2", "two", "", 2)]);

    let error = run_delete(&t.app, &["abc".to_string(), "zzz".to_string()])
        .await
        .unwrap_err();

    let CliError::UnresolvedNotes(reasons) = error else {
        panic!("expected aggregate error, got {error:?}");
    };
    assert_eq!(reasons.len(), 2);
    assert!(reasons[1].contains("zzz"));
    assert_eq!(t.cache.snapshot().len(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn delete_repeated_id_deletes_once() {
    let t = test_app(vec![note("aaa", "first", "", 1), note("bbb", "second", "", 2)]);

    run_delete(&t.app, &["aaa".to_string(), "aa".to_string()])
        .await
        .unwrap();
    t.app.finish().await;

    assert_eq!(t.cache.snapshot().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn note_lookup_surfaces_cache_failure() {
    let t = test_app(vec![note("aaa", "first", "", 1)]);
    t.cache.set_unavailable(true);

    let error = run_delete(&t.app, &["aaa".to_string()]).await.unwrap_err();
    assert!(matches!(error, CliError::Rejected(ref message) if message.contains("unavailable")));
    let error = run_edit(&t.app, "aaa", Some("new".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::Rejected(_)));

    t.cache.set_unavailable(false);
    assert_eq!(t.cache.snapshot()[0].title, "first");
}

#[tokio::test(flavor = "current_thread")]
async fn sync_pulls_remote_notes() {
    let t = test_app(Vec::new());
    t.network.seed_notes([note("remote", "from elsewhere", "", 5)]);

    run_sync(&t.app, true).await.unwrap();
    assert_eq!(t.cache.snapshot().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn offline_app_refuses_sync_and_tombstone_reads() {
    let app = offline_app();

    assert!(matches!(
        run_sync(&app, false).await.unwrap_err(),
        CliError::SyncNotConfigured
    ));
    assert!(matches!(
        fetch_deleted_notes(&app).await.unwrap_err(),
        CliError::SyncNotConfigured
    ));

    run_add(&app, &["still works".to_string()], Some(String::new()))
        .await
        .unwrap();
    app.finish().await;
    assert_eq!(app.cache.get_num_notes().await.unwrap(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn offline_network_accepts_writes_and_fails_reads() {
    let network = OfflineNoteNetwork;
    let note = note("a", "t", "", 1);

    network.insert_or_update_note(&note).await.unwrap();
    network.insert_deleted_note(&note).await.unwrap();
    assert!(network.get_all_notes().await.is_err());
    assert!(network.get_deleted_notes().await.is_err());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn commands_work_against_libsql_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LibSqlNoteCache::open(dir.path().join("notes.db"), 30)
        .await
        .unwrap();
    let network = Arc::new(InMemoryNoteNetwork::new());
    let app = App::with_stores(Arc::new(cache), network.clone(), StoreConfig::default(), true);

    run_add(&app, &["On disk".to_string()], Some("body".to_string()))
        .await
        .unwrap();
    let found = search(&app, "disk".to_string(), Default::default(), 1)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let id = found[0].id.to_string();
    run_delete(&app, &[id]).await.unwrap();
    app.finish().await;

    assert_eq!(app.cache.get_num_notes().await.unwrap(), 0);
    assert_eq!(network.tombstones().len(), 1);
}
