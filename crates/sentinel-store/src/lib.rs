#![warn(missing_docs)]
//! # sentinel-store
//!
//! ## Purpose
//! Owns the evaluation lifecycle: the currently displayed evaluation and the
//! durable, newest-first history.
//!
//! ## Responsibilities
//! - Run submissions through an [`AnalysisProvider`] and record successful
//!   results as immutable [`ModelEvaluation`] values.
//! - Keep in-memory history and the persisted blob consistent after every
//!   insert/delete (write-through). Each insert/delete is applied to the
//!   latest stored blob, so stores in other processes sharing the file do
//!   not undo each other.
//! - Load and delete history entries by identifier.
//! - Discard results of superseded submissions.
//!
//! ## Data flow
//! Intent -> [`EvaluationStore`] -> [`encode_history`] ->
//! [`HistoryBackend::write`]. On open, [`HistoryBackend::read`] ->
//! [`decode_history`] seeds the history.
//!
//! ## Ownership and lifetimes
//! The store exclusively owns its view of history and the current
//! evaluation. All mutation goes through `&mut self`; across processes the
//! [`FileBackend`] lease serializes read-modify-write cycles. [`PendingSubmission`] is an owned value that may cross a
//! thread boundary while the provider call runs.
//!
//! ## Error model
//! - A failed analysis returns [`StoreError::Analysis`] and changes nothing.
//! - A failed write returns [`StoreError`] and leaves memory as it was
//!   before the operation; new state is committed only after the write.
//! - An unreadable history blob at open is logged and treated as empty.
//! - Unknown identifiers are silent no-ops.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sentinel_analysis_contract::{
    AnalysisFailure, AnalysisProvider, AnalysisRequest, AnalysisResult,
};
use sentinel_core::{
    CoreError, EvaluationInputs, HISTORY_STORAGE_KEY, ModelEvaluation, decode_history,
    encode_history,
};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 8;

/// How long a writer waits for another writer's lease by default.
pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(10);
const LEASE_POLL: Duration = Duration::from_millis(50);
const STALE_LEASE_AGE: Duration = Duration::from_secs(60);

/// Replacement computed from the latest stored blob; `None` keeps the blob.
pub type BlobUpdate<'a> = dyn FnMut(Option<String>) -> Result<Option<String>, StoreError> + 'a;

/// Durable storage for the single serialized history blob.
pub trait HistoryBackend: Send + Sync {
    /// Reads the blob; `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the blob. Must be all-or-nothing.
    fn write(&self, blob: &str) -> Result<(), StoreError>;

    /// Reads the latest blob, hands it to `apply`, and writes the blob
    /// `apply` returns. Backends that can be shared hold exclusive access
    /// for the whole read-modify-write.
    fn update(&self, apply: &mut BlobUpdate<'_>) -> Result<(), StoreError> {
        if let Some(blob) = apply(self.read()?)? {
            self.write(&blob)?;
        }
        Ok(())
    }
}

/// History stored as `<dir>/sentinel_history.json`.
///
/// Updates are serialized across processes by a lease file next to the
/// history (`sentinel_history.json.lock`). A lease older than a minute is
/// considered abandoned and removed.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    lease_timeout: Duration,
}

impl FileBackend {
    /// Backend writing to the fixed storage key inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{HISTORY_STORAGE_KEY}.json")),
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
        }
    }

    /// Replaces how long an update waits for a lease held by someone else.
    pub fn with_lease_timeout(mut self, timeout: Duration) -> Self {
        self.lease_timeout = timeout;
        self
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lease file guarding updates.
    pub fn lease_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn acquire_lease(&self) -> Result<HistoryLease, StoreError> {
        let lease_path = self.lease_path();
        if let Some(parent) = lease_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lease_path)
            {
                Ok(_) => return Ok(HistoryLease { path: lease_path }),
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    if lease_is_stale(&lease_path) {
                        tracing::warn!(path = %lease_path.display(), "removing abandoned history lease");
                        let _ = fs::remove_file(&lease_path);
                        continue;
                    }
                    if started.elapsed() >= self.lease_timeout {
                        return Err(StoreError::Backend(format!(
                            "timed out waiting for history lease {}",
                            lease_path.display()
                        )));
                    }
                    thread::sleep(LEASE_POLL);
                }
                Err(error) => return Err(StoreError::Io(error)),
            }
        }
    }
}

impl HistoryBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::Io(error)),
        }
    }

    fn write(&self, blob: &str) -> Result<(), StoreError> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StoreError::Backend("history path has no parent".to_string()))?;
        fs::create_dir_all(parent)?;

        // Same directory as the target, so the rename is atomic.
        let staging = parent.join(format!(
            ".{HISTORY_STORAGE_KEY}.json.tmp.{}.{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.subsec_nanos())
                .unwrap_or_default()
        ));
        if let Err(error) = write_synced(&staging, blob) {
            let _ = fs::remove_file(&staging);
            return Err(error.into());
        }
        if let Err(error) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(error.into());
        }
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn update(&self, apply: &mut BlobUpdate<'_>) -> Result<(), StoreError> {
        let _lease = self.acquire_lease()?;
        if let Some(blob) = apply(self.read()?)? {
            self.write(&blob)?;
        }
        Ok(())
    }
}

/// Held while one writer owns the history file; removes the lease on drop.
struct HistoryLease {
    path: PathBuf,
}

impl Drop for HistoryLease {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lease_is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age >= STALE_LEASE_AGE)
}

fn write_synced(path: &Path, blob: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(blob.as_bytes())?;
    file.sync_all()
}

/// In-memory backend. Clones share the same slot, which lets tests simulate
/// a process restart by opening a second store on a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with a blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    /// Current blob, if any.
    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl HistoryBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn write(&self, blob: &str) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".to_string()))?;
        *slot = Some(blob.to_string());
        Ok(())
    }

    fn update(&self, apply: &mut BlobUpdate<'_>) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".to_string()))?;
        if let Some(blob) = apply(slot.clone())? {
            *slot = Some(blob);
        }
        Ok(())
    }
}

/// A submission that has been started but not yet completed.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    generation: u64,
    request: AnalysisRequest,
}

impl PendingSubmission {
    /// Request to hand to the provider.
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Generation stamp this submission was started under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of completing a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The evaluation was recorded, made current, and persisted.
    Recorded(ModelEvaluation),
    /// A newer submission or view change superseded this one; its result was
    /// dropped.
    Superseded,
}

/// Repository for the current evaluation and history.
pub struct EvaluationStore {
    backend: Box<dyn HistoryBackend>,
    history: Vec<ModelEvaluation>,
    current: Option<ModelEvaluation>,
    generation: u64,
    rng: StdRng,
    clock: fn() -> String,
}

impl EvaluationStore {
    /// Opens the store and reads persisted history once.
    ///
    /// An absent, unreadable, or malformed blob yields an empty history; the
    /// problem is logged and never returned.
    pub fn open(backend: impl HistoryBackend + 'static) -> Self {
        let history = read_history(&backend);
        tracing::info!(entries = history.len(), "evaluation history loaded");

        Self {
            backend: Box::new(backend),
            history,
            current: None,
            generation: 0,
            rng: StdRng::from_os_rng(),
            clock: now_timestamp,
        }
    }

    /// Replaces the identifier generator's randomness source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    /// History, newest first.
    pub fn history(&self) -> &[ModelEvaluation] {
        &self.history
    }

    /// Currently displayed evaluation.
    pub fn current(&self) -> Option<&ModelEvaluation> {
        self.current.as_ref()
    }

    /// History entry by identifier.
    pub fn get(&self, id: &str) -> Option<&ModelEvaluation> {
        self.history.iter().find(|evaluation| evaluation.id == id)
    }

    /// Runs one submission to completion.
    ///
    /// # Errors
    /// Returns [`StoreError::Analysis`] when the provider fails, or a
    /// persistence error when the write fails. Neither changes state.
    pub fn submit(
        &mut self,
        provider: &dyn AnalysisProvider,
        inputs: EvaluationInputs,
    ) -> Result<SubmitOutcome, StoreError> {
        let pending = self.begin_submission(inputs);
        let outcome = provider.analyze(pending.request());
        self.complete_submission(pending, outcome)
    }

    /// Starts a submission. Any older pending submission is superseded.
    pub fn begin_submission(&mut self, inputs: EvaluationInputs) -> PendingSubmission {
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            model = %inputs.model_name,
            "submission started"
        );
        PendingSubmission {
            generation: self.generation,
            request: AnalysisRequest::new(inputs),
        }
    }

    /// Supersedes every pending submission without starting a new one.
    pub fn invalidate_pending(&mut self) {
        self.generation += 1;
    }

    /// Applies a provider outcome to a pending submission.
    ///
    /// # Errors
    /// Returns [`StoreError::Analysis`] for a failed analysis of a live
    /// submission, or a persistence error when the write fails.
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<AnalysisResult, AnalysisFailure>,
    ) -> Result<SubmitOutcome, StoreError> {
        if pending.generation != self.generation {
            tracing::warn!(
                generation = pending.generation,
                latest = self.generation,
                "dropping result of superseded submission"
            );
            return Ok(SubmitOutcome::Superseded);
        }

        let result = outcome.inspect_err(|failure| {
            tracing::warn!(%failure, "analysis failed; state unchanged");
        })?;

        let inputs = pending.request.inputs;
        let draft = ModelEvaluation {
            id: String::new(),
            model_name: inputs.model_name,
            architecture: inputs.architecture,
            use_case: inputs.use_case,
            timestamp: (self.clock)(),
            threats: result.threats,
            scores: result.scores,
            overall_risk_score: result.overall_risk,
        };

        let Self {
            backend,
            history,
            rng,
            ..
        } = self;
        let mut committed = None;
        backend.update(&mut |blob| {
            let mut latest = latest_history(blob, history.as_slice());
            let mut evaluation = draft.clone();
            evaluation.id = fresh_id(rng, &latest);
            latest.insert(0, evaluation.clone());
            let encoded = encode_history(&latest)?;
            committed = Some((evaluation, latest));
            Ok(Some(encoded))
        })?;
        let Some((evaluation, latest)) = committed else {
            return Err(StoreError::Backend(
                "history backend skipped the update".to_string(),
            ));
        };

        self.history = latest;
        self.current = Some(evaluation.clone());
        tracing::info!(id = %evaluation.id, threats = evaluation.threats.len(), "evaluation recorded");
        Ok(SubmitOutcome::Recorded(evaluation))
    }

    /// Makes a history entry current. Returns `false` (and does nothing) when
    /// the identifier is unknown.
    pub fn load_from_history(&mut self, id: &str) -> bool {
        match self.get(id).cloned() {
            Some(evaluation) => {
                self.current = Some(evaluation);
                true
            }
            None => {
                tracing::debug!(%id, "load ignored: no such history entry");
                false
            }
        }
    }

    /// Removes a history entry and persists. The current evaluation is left
    /// as it is, even when it is the deleted entry.
    ///
    /// Returns `Ok(false)` without writing when the identifier is unknown.
    ///
    /// # Errors
    /// Returns a persistence error when the write fails; history is then
    /// unchanged.
    pub fn delete_from_history(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            tracing::debug!(%id, "delete ignored: no such history entry");
            return Ok(false);
        }

        let Self {
            backend, history, ..
        } = self;
        let mut committed = None;
        backend.update(&mut |blob| {
            let mut latest = latest_history(blob, history.as_slice());
            let before = latest.len();
            latest.retain(|evaluation| evaluation.id != id);
            let removed = latest.len() != before;
            let encoded = if removed {
                Some(encode_history(&latest)?)
            } else {
                None
            };
            committed = Some((latest, removed));
            Ok(encoded)
        })?;
        let Some((latest, removed)) = committed else {
            return Ok(false);
        };

        self.history = latest;
        if removed {
            tracing::info!(%id, remaining = self.history.len(), "history entry deleted");
        } else {
            tracing::debug!(%id, "delete ignored: entry already removed elsewhere");
        }
        Ok(removed)
    }
}

fn fresh_id(rng: &mut StdRng, history: &[ModelEvaluation]) -> String {
    loop {
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        if history.iter().all(|evaluation| evaluation.id != id) {
            return id;
        }
    }
}

// History other writers may have changed since open. A blob that no longer
// decodes falls back to what this store last saw.
fn latest_history(blob: Option<String>, seen: &[ModelEvaluation]) -> Vec<ModelEvaluation> {
    match blob {
        Some(blob) => decode_history(&blob).unwrap_or_else(|error| {
            tracing::warn!(%error, "stored history malformed; keeping loaded history");
            seen.to_vec()
        }),
        None => Vec::new(),
    }
}

fn read_history(backend: &dyn HistoryBackend) -> Vec<ModelEvaluation> {
    let blob = match backend.read() {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(%error, "history unreadable; starting empty");
            return Vec::new();
        }
    };

    decode_history(&blob).unwrap_or_else(|error| {
        tracing::warn!(%error, "history blob malformed; starting empty");
        Vec::new()
    })
}

/// Current UTC time as an RFC 3339 timestamp.
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Provider could not produce a valid analysis.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisFailure),
    /// History could not be encoded.
    #[error(transparent)]
    Codec(#[from] CoreError),
    /// Filesystem failure in the file backend.
    #[error("history io failure: {0}")]
    Io(#[from] io::Error),
    /// Other backend failure.
    #[error("history backend failure: {0}")]
    Backend(String),
}
