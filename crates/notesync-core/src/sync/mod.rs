//! Cache/network reconciliation.
//!
//! A pass is a full scan of both stores: there is no change feed and no
//! persisted cursor. Nothing is locked across the two snapshots, so an edit
//! landing between them is picked up by the next pass instead.
//!
//! `updated_at` from the client clock decides conflicts. Devices with skewed
//! clocks can therefore resolve a conflict the wrong way.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::StoreConfig;
use crate::data::{
    safe_api_call, safe_cache_call, CallResult, Deadlines, NoteCacheStore, NoteNetworkStore,
};
use crate::models::{Note, NoteId};
use crate::state::SyncState;

/// Counters for one `sync_notes` pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Network notes inserted into the cache
    pub downloaded: usize,
    /// Cache notes overwritten by a newer network copy
    pub updated_locally: usize,
    /// Cache notes pushed to the network
    pub uploaded: usize,
    /// Pairs whose title and body already agreed
    pub unchanged: usize,
    /// Notes ignored because they have a tombstone
    pub skipped_deleted: usize,
    /// Per-note calls that failed; retried by the next pass
    pub failed: usize,
}

/// Counters for one `sync_deleted_notes` pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncDeletedReport {
    pub tombstones: usize,
    /// Cache rows actually removed
    pub removed: usize,
    pub failed: usize,
}

/// Result of a full startup run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub deleted: SyncDeletedReport,
    pub notes: SyncReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteOutcome {
    Downloaded,
    UpdatedLocally,
    Uploaded,
    Failed,
}

impl SyncReport {
    fn record(&mut self, outcome: NoteOutcome) {
        match outcome {
            NoteOutcome::Downloaded => self.downloaded += 1,
            NoteOutcome::UpdatedLocally => self.updated_locally += 1,
            NoteOutcome::Uploaded => self.uploaded += 1,
            NoteOutcome::Failed => self.failed += 1,
        }
    }
}

/// Brings the cache and the network store into agreement.
pub struct NoteSyncEngine {
    cache: Arc<dyn NoteCacheStore>,
    network: Arc<dyn NoteNetworkStore>,
    deadlines: Deadlines,
    permits: Arc<Semaphore>,
    state: Mutex<SyncState>,
}

impl NoteSyncEngine {
    pub fn new(
        cache: Arc<dyn NoteCacheStore>,
        network: Arc<dyn NoteNetworkStore>,
        config: &StoreConfig,
    ) -> Self {
        Self {
            cache,
            network,
            deadlines: Deadlines::from(config),
            permits: Arc::new(Semaphore::new(
                config.sync_concurrency.clamp(1, Semaphore::MAX_PERMITS),
            )),
            state: Mutex::new(SyncState::Offline),
        }
    }

    /// State left behind by the most recent pass.
    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn finish<T>(&self, result: CallResult<T>) -> CallResult<T> {
        self.set_state(match &result {
            CallResult::Success(_) => SyncState::Synced,
            CallResult::NetworkError => SyncState::Offline,
            CallResult::GenericError(_) => SyncState::Error,
        });
        result
    }

    /// Startup run: pull deletions first so the note pass cannot resurrect
    /// anything, then reconcile live notes while ignoring tombstoned ids.
    ///
    /// The note pass is skipped if the tombstone ledger could not be read.
    pub async fn run(&self) -> CallResult<SyncSummary> {
        self.set_state(SyncState::Syncing);
        let (deleted, tombstoned) = match self.pull_deletions().await.split() {
            Ok(pulled) => pulled,
            Err(failure) => return self.finish(failure),
        };
        let result = self
            .reconcile(&tombstoned)
            .await
            .map(|notes| SyncSummary { deleted, notes });
        if let CallResult::Success(summary) = &result {
            tracing::info!(?summary, "sync run complete");
        }
        self.finish(result)
    }

    /// Remove every tombstoned id from the cache. Never writes to the network.
    pub async fn sync_deleted_notes(&self) -> CallResult<SyncDeletedReport> {
        self.set_state(SyncState::Syncing);
        let result = self.pull_deletions().await.map(|(report, _)| report);
        self.finish(result)
    }

    /// Three-way merge with the cache as working copy.
    pub async fn sync_notes(&self) -> CallResult<SyncReport> {
        self.set_state(SyncState::Syncing);
        let result = self.reconcile(&HashSet::new()).await;
        self.finish(result)
    }

    async fn pull_deletions(&self) -> CallResult<(SyncDeletedReport, HashSet<NoteId>)> {
        let tombstones =
            match safe_api_call(self.deadlines.network, self.network.get_deleted_notes())
                .await
                .split()
            {
                Ok(tombstones) => tombstones,
                Err(failure) => {
                    tracing::warn!(error = ?failure.error_message(), "could not read tombstones");
                    return failure;
                }
            };

        let mut report = SyncDeletedReport {
            tombstones: tombstones.len(),
            ..SyncDeletedReport::default()
        };
        let ids: Vec<NoteId> = tombstones.into_iter().map(|note| note.id).collect();

        if !ids.is_empty() {
            match safe_cache_call(self.deadlines.cache, self.cache.delete_notes(&ids)).await {
                CallResult::Success(removed) => {
                    report.removed = usize::try_from(removed).unwrap_or_default();
                }
                failure => {
                    tracing::warn!(
                        error = ?failure.error_message(),
                        count = ids.len(),
                        "could not remove tombstoned notes from cache"
                    );
                    report.failed = ids.len();
                }
            }
        }

        tracing::info!(
            tombstones = report.tombstones,
            removed = report.removed,
            "synced deleted notes"
        );
        CallResult::Success((report, ids.into_iter().collect()))
    }

    async fn reconcile(&self, tombstoned: &HashSet<NoteId>) -> CallResult<SyncReport> {
        let cache_notes =
            match safe_cache_call(self.deadlines.cache, self.cache.get_all_notes())
                .await
                .split()
            {
                Ok(notes) => notes,
                Err(failure) => {
                    tracing::warn!(error = ?failure.error_message(), "could not read cache");
                    return failure;
                }
            };
        let network_notes =
            match safe_api_call(self.deadlines.network, self.network.get_all_notes())
                .await
                .split()
            {
                Ok(notes) => notes,
                Err(failure) => {
                    tracing::warn!(error = ?failure.error_message(), "could not read network");
                    return failure;
                }
            };

        let mut report = SyncReport::default();
        let mut working: HashMap<NoteId, Note> = cache_notes
            .into_iter()
            .map(|note| (note.id.clone(), note))
            .collect();

        let mut tasks = JoinSet::new();
        for remote in network_notes {
            if tombstoned.contains(&remote.id) {
                working.remove(&remote.id);
                report.skipped_deleted += 1;
                continue;
            }
            match working.remove(&remote.id) {
                Some(local) if local.same_content(&remote) => report.unchanged += 1,
                Some(local) if remote.updated_at > local.updated_at => {
                    let cache = Arc::clone(&self.cache);
                    let deadline = self.deadlines.cache;
                    self.spawn_note(&mut tasks, async move {
                        let result = safe_cache_call(
                            deadline,
                            cache.update_note(
                                &remote.id,
                                &remote.title,
                                &remote.body,
                                Some(remote.updated_at),
                            ),
                        )
                        .await;
                        outcome(&remote.id, result, NoteOutcome::UpdatedLocally)
                    });
                }
                Some(local) => self.spawn_upload(&mut tasks, local),
                None => {
                    let cache = Arc::clone(&self.cache);
                    let deadline = self.deadlines.cache;
                    self.spawn_note(&mut tasks, async move {
                        let result = safe_cache_call(deadline, cache.insert_note(&remote)).await;
                        outcome(&remote.id, result, NoteOutcome::Downloaded)
                    });
                }
            }
        }
        drain(&mut tasks, &mut report).await;

        for (id, local) in working {
            if tombstoned.contains(&id) {
                report.skipped_deleted += 1;
                continue;
            }
            self.spawn_upload(&mut tasks, local);
        }
        drain(&mut tasks, &mut report).await;

        tracing::info!(
            downloaded = report.downloaded,
            updated_locally = report.updated_locally,
            uploaded = report.uploaded,
            unchanged = report.unchanged,
            failed = report.failed,
            "synced notes"
        );
        CallResult::Success(report)
    }

    fn spawn_upload(&self, tasks: &mut JoinSet<NoteOutcome>, local: Note) {
        let network = Arc::clone(&self.network);
        let deadline = self.deadlines.network;
        self.spawn_note(tasks, async move {
            let result = safe_api_call(deadline, network.insert_or_update_note(&local))
                .await
                .map(|()| 1);
            outcome(&local.id, result, NoteOutcome::Uploaded)
        });
    }

    fn spawn_note<F>(&self, tasks: &mut JoinSet<NoteOutcome>, work: F)
    where
        F: Future<Output = NoteOutcome> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return NoteOutcome::Failed;
            };
            work.await
        });
    }
}

/// Map a per-note store result to its counter.
fn outcome(id: &NoteId, result: CallResult<i64>, success: NoteOutcome) -> NoteOutcome {
    match result {
        CallResult::Success(count) if count > 0 => success,
        CallResult::Success(_) => {
            tracing::warn!(note = %id, "store reported no rows changed");
            NoteOutcome::Failed
        }
        failure => {
            tracing::warn!(note = %id, error = ?failure.error_message(), "note sync failed");
            NoteOutcome::Failed
        }
    }
}

async fn drain(tasks: &mut JoinSet<NoteOutcome>, report: &mut SyncReport) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => report.record(outcome),
            Err(error) => {
                tracing::warn!(%error, "note sync task aborted");
                report.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{InMemoryNoteCache, InMemoryNoteNetwork, NoteFactory};
    use pretty_assertions::assert_eq;

    struct Harness {
        cache: Arc<InMemoryNoteCache>,
        network: Arc<InMemoryNoteNetwork>,
        engine: NoteSyncEngine,
    }

    fn harness(cache_notes: Vec<Note>, network_notes: Vec<Note>) -> Harness {
        let cache = Arc::new(InMemoryNoteCache::with_notes(30, cache_notes));
        let network = Arc::new(InMemoryNoteNetwork::new());
        network.seed_notes(network_notes);
        let engine = NoteSyncEngine::new(
            Arc::clone(&cache) as Arc<dyn NoteCacheStore>,
            Arc::clone(&network) as Arc<dyn NoteNetworkStore>,
            &StoreConfig::default(),
        );
        Harness {
            cache,
            network,
            engine,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remote_only_notes_are_downloaded() {
        let remote = NoteFactory::create_note_list("remote", 3);
        let h = harness(Vec::new(), remote.clone());

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.downloaded, 3);
        assert_eq!(h.cache.snapshot(), remote);
        assert_eq!(h.engine.state(), SyncState::Synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unvalidated_concurrency_is_clamped() {
        let remote = NoteFactory::create_note_list("remote", 2);
        let cache = Arc::new(InMemoryNoteCache::new(30));
        let network = Arc::new(InMemoryNoteNetwork::new());
        network.seed_notes(remote.clone());
        let config = StoreConfig {
            sync_concurrency: usize::MAX,
            ..StoreConfig::default()
        };
        let engine = NoteSyncEngine::new(
            Arc::clone(&cache) as Arc<dyn NoteCacheStore>,
            Arc::clone(&network) as Arc<dyn NoteNetworkStore>,
            &config,
        );

        let report = engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.downloaded, 2);
        assert_eq!(cache.snapshot(), remote);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn local_only_notes_are_uploaded() {
        let local = NoteFactory::create_note_list("local", 2);
        let h = harness(local.clone(), Vec::new());

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.uploaded, 2);

        let uploaded = h.network.live_notes();
        let ids: Vec<&NoteId> = uploaded.iter().map(|note| &note.id).collect();
        assert_eq!(ids, local.iter().map(|note| &note.id).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newer_network_copy_wins() {
        let local = NoteFactory::create_note("x", "old title", "old", NoteFactory::BASE_TIME);
        let remote = NoteFactory::create_note("x", "new title", "new", NoteFactory::BASE_TIME + 5_000);
        let h = harness(vec![local], vec![remote.clone()]);

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.updated_locally, 1);

        let cached = h.cache.search_note_by_id(&remote.id).await.unwrap().unwrap();
        assert_eq!(cached.title, "new title");
        assert_eq!(cached.updated_at, remote.updated_at);
        assert_eq!(h.network.live_notes(), vec![remote]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newer_or_equal_cache_copy_is_pushed() {
        let local = NoteFactory::create_note("x", "local edit", "", NoteFactory::BASE_TIME + 5_000);
        let remote = NoteFactory::create_note("x", "stale", "", NoteFactory::BASE_TIME);
        let tie_local = NoteFactory::create_note("y", "cache side", "", NoteFactory::BASE_TIME);
        let tie_remote = NoteFactory::create_note("y", "network side", "", NoteFactory::BASE_TIME);
        let h = harness(vec![local, tie_local], vec![remote, tie_remote]);

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.uploaded, 2);

        let titles: Vec<String> = h.network.live_notes().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["local edit".to_string(), "cache side".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_pass_changes_nothing() {
        let mut local = NoteFactory::create_note_list("local", 3);
        let remote = NoteFactory::create_note_list("remote", 2);
        local[0].updated_at += 10_000;
        let h = harness(local, remote);

        h.engine.sync_notes().await.ok().unwrap();
        let cache_after_first = h.cache.snapshot();
        let network_after_first = h.network.live_notes();

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.unchanged, 5);
        assert_eq!(report.uploaded + report.downloaded + report.updated_locally, 0);
        assert_eq!(h.cache.snapshot(), cache_after_first);
        assert_eq!(h.network.live_notes(), network_after_first);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tombstones_remove_cached_notes() {
        let notes = NoteFactory::create_note_list("n", 4);
        let h = harness(notes.clone(), Vec::new());
        h.network.seed_deleted_notes(vec![
            notes[0].clone(),
            notes[2].clone(),
            NoteFactory::create_note("never-cached", "t", "", 1),
        ]);

        let report = h.engine.sync_deleted_notes().await.ok().unwrap();
        assert_eq!(report.tombstones, 3);
        assert_eq!(report.removed, 2);
        for note in [&notes[0], &notes[2]] {
            assert_eq!(h.cache.search_note_by_id(&note.id).await.unwrap(), None);
        }
        assert!(h.network.live_notes().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_does_not_resurrect_deleted_notes() {
        let deleted = NoteFactory::create_note("gone", "deleted elsewhere", "", 1);
        let kept = NoteFactory::create_note("kept", "still here", "", 1);
        let h = harness(vec![deleted.clone(), kept.clone()], vec![deleted.clone()]);
        h.network.seed_deleted_notes(vec![deleted.clone()]);

        let summary = h.engine.run().await.ok().unwrap();
        assert_eq!(summary.deleted.removed, 1);
        assert_eq!(summary.notes.skipped_deleted, 1);
        assert_eq!(summary.notes.uploaded, 1);
        assert_eq!(h.cache.search_note_by_id(&deleted.id).await.unwrap(), None);
        assert!(h.cache.search_note_by_id(&kept.id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_network_aborts_pass_without_touching_cache() {
        let local = NoteFactory::create_note_list("local", 2);
        let h = harness(local.clone(), Vec::new());
        h.network.set_offline(true);

        assert_eq!(h.engine.run().await, CallResult::NetworkError);
        assert_eq!(h.engine.state(), SyncState::Offline);
        assert_eq!(h.cache.snapshot(), local);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn per_note_failures_do_not_abort_the_pass() {
        let mut remote = NoteFactory::create_note_list("remote", 3);
        remote.push(NoteFactory::create_note(
            crate::data::memory::FORCE_NEW_NOTE_EXCEPTION,
            "poison",
            "",
            1,
        ));
        let h = harness(Vec::new(), remote);

        let report = h.engine.sync_notes().await.ok().unwrap();
        assert_eq!(report.downloaded, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(h.cache.snapshot().len(), 3);
    }
}
