//! Sync controller — optimistic mutation and write-through.
//!
//! Mediates every user-initiated change to the health document: apply to
//! local state first, recompute the display score, then write through to
//! the document store. Local state is always the source of truth for the
//! next recompute — the store write is fire-and-forget relative to
//! subsequent local mutations. A failed write surfaces
//! [`ControllerError::Sync`] and the optimistic state is deliberately left
//! in place: local and persisted state diverge until the next successful
//! write. This is an observable contract, not an oversight.
//!
//! Checklist updates snapshot the document, mutate the copy, and swap it
//! in whole, since the presentation layer may hold the previous snapshot
//! mid-render.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;
use thiserror::Error;

use crate::analyzer::{AnalysisError, ReportAnalyzer};
use crate::models::{HealthDocument, SessionUser};
use crate::score;
use crate::session::{SessionError, SessionProvider};
use crate::store::{DocumentPatch, DocumentStore, StoreError, Subscription};

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Session initialization failed: {0}")]
    Session(#[from] SessionError),

    #[error("Report analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("{kind} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Could not save your progress: {0}")]
    Sync(StoreError),

    #[error("An analysis is already in progress for this session")]
    AnalysisInFlight,

    #[error("No active session")]
    NoSession,

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Snapshot of the analysis currently in flight, if any. Lets the
/// presentation layer disable the upload affordance while one is
/// outstanding.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveAnalysis {
    /// When the analysis started (ISO 8601).
    pub started_at: String,
    /// Length of the report text under analysis.
    pub text_length: usize,
}

/// Orchestrates session identity, report analysis, checklist mutation, and
/// persistence for one session's health document.
pub struct SyncController {
    store: Arc<DocumentStore>,
    analyzer: Arc<dyn ReportAnalyzer>,
    sessions: SessionProvider,
    user: RwLock<Option<SessionUser>>,
    document: RwLock<Option<HealthDocument>>,
    /// At most one analysis may be outstanding per session.
    analysis_lock: Mutex<()>,
    /// What's currently being analyzed (observable state).
    current_analysis: Mutex<Option<ActiveAnalysis>>,
}

impl SyncController {
    pub fn new(store: Arc<DocumentStore>, analyzer: Arc<dyn ReportAnalyzer>) -> Self {
        Self {
            store,
            analyzer,
            sessions: SessionProvider::new(),
            user: RwLock::new(None),
            document: RwLock::new(None),
            analysis_lock: Mutex::new(()),
            current_analysis: Mutex::new(None),
        }
    }

    /// Establish the session identity and load any persisted document into
    /// local state. Idempotent; required before any other operation.
    /// Failure is fatal to the session.
    pub fn start_session(&self) -> Result<SessionUser, ControllerError> {
        let user = self.sessions.get_or_create()?;

        let stored = self
            .store
            .get(&user.id)
            .map_err(ControllerError::Sync)?;
        *self.document.write().map_err(|_| ControllerError::LockPoisoned)? = stored;
        *self.user.write().map_err(|_| ControllerError::LockPoisoned)? = Some(user.clone());

        Ok(user)
    }

    /// The current session user, if a session has been started.
    pub fn session(&self) -> Option<SessionUser> {
        self.user.read().ok()?.clone()
    }

    /// Snapshot of the current local document state for rendering.
    pub fn document(&self) -> Option<HealthDocument> {
        self.document.read().ok()?.clone()
    }

    /// Subscribe the presentation layer to document changes for this
    /// session. Dropping the returned handle unsubscribes — hold it for
    /// exactly as long as the view lives.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription, ControllerError>
    where
        F: Fn(Option<&HealthDocument>) + Send + Sync + 'static,
    {
        let user = self.session().ok_or(ControllerError::NoSession)?;
        self.store
            .subscribe(&user.id, callback)
            .map_err(ControllerError::Sync)
    }

    /// Analyze report text and store the resulting document, overwriting
    /// any prior document for this session.
    ///
    /// At most one analysis may be in flight; a second call while one is
    /// outstanding fails with [`ControllerError::AnalysisInFlight`]. On
    /// analyzer failure the existing stored document is left untouched.
    pub fn analyze_and_store(
        &self,
        report_text: &str,
    ) -> Result<HealthDocument, ControllerError> {
        let user = self.session().ok_or(ControllerError::NoSession)?;
        let _guard = self.try_acquire_analysis(report_text.len())?;

        let analysis = self.analyzer.analyze(report_text)?;
        let doc = HealthDocument::new(analysis.score, analysis.suggestions, analysis.daily_plan);

        self.store
            .put(&user.id, &doc)
            .map_err(ControllerError::Sync)?;
        *self
            .document
            .write()
            .map_err(|_| ControllerError::LockPoisoned)? = Some(doc.clone());

        tracing::info!(
            user_id = %user.id,
            base_score = ?doc.base_score,
            "New health document stored"
        );
        Ok(doc)
    }

    /// Toggle completion of `suggestions[index]`, recompute the display
    /// score, and write the change through.
    ///
    /// A no-op if no session or no document is loaded. Fails with
    /// [`ControllerError::IndexOutOfRange`] (document unmodified) on an
    /// invalid index.
    pub fn toggle_suggestion(&self, index: usize) -> Result<(), ControllerError> {
        self.mutate_checklist("suggestion", move |doc| {
            let len = doc.suggestions.len();
            let item = doc
                .suggestions
                .get_mut(index)
                .ok_or(ControllerError::IndexOutOfRange {
                    kind: "suggestion",
                    index,
                    len,
                })?;
            item.completed = !item.completed;
            Ok(DocumentPatch {
                suggestions: Some(doc.suggestions.clone()),
                ..Default::default()
            })
        })
    }

    /// Toggle completion of `daily_plan[day_index].tasks[task_index]`,
    /// recompute the display score, and write the change through.
    ///
    /// Same no-op and out-of-range contract as [`Self::toggle_suggestion`].
    pub fn toggle_task(&self, day_index: usize, task_index: usize) -> Result<(), ControllerError> {
        self.mutate_checklist("task", move |doc| {
            let days = doc.daily_plan.len();
            let day = doc
                .daily_plan
                .get_mut(day_index)
                .ok_or(ControllerError::IndexOutOfRange {
                    kind: "day",
                    index: day_index,
                    len: days,
                })?;
            let tasks = day.tasks.len();
            let task = day
                .tasks
                .get_mut(task_index)
                .ok_or(ControllerError::IndexOutOfRange {
                    kind: "task",
                    index: task_index,
                    len: tasks,
                })?;
            task.completed = !task.completed;
            Ok(DocumentPatch {
                daily_plan: Some(doc.daily_plan.clone()),
                ..Default::default()
            })
        })
    }

    // ── Internal ────────────────────────────────────────────

    /// Shared toggle machinery: snapshot, mutate the copy, recompute,
    /// install optimistically, then merge-write.
    fn mutate_checklist<F>(&self, kind: &'static str, mutate: F) -> Result<(), ControllerError>
    where
        F: FnOnce(&mut HealthDocument) -> Result<DocumentPatch, ControllerError>,
    {
        let Some(user) = self.session() else {
            return Ok(());
        };

        let patch = {
            let mut guard = self
                .document
                .write()
                .map_err(|_| ControllerError::LockPoisoned)?;
            let Some(current) = guard.as_ref() else {
                return Ok(());
            };

            let mut updated = current.clone();
            let mut patch = mutate(&mut updated)?;
            updated.display_score = score::recalculate(&updated);
            patch.display_score = Some(updated.display_score);

            // Local state is committed before the store write: the next
            // toggle recomputes from this state even if the write fails.
            *guard = Some(updated);
            patch
        };

        self.store.merge(&user.id, patch).map_err(|e| {
            tracing::warn!(
                user_id = %user.id,
                kind = kind,
                error = %e,
                "Write-through failed after optimistic update, local state kept"
            );
            ControllerError::Sync(e)
        })
    }

    /// What analysis is currently running? `None` when idle.
    pub fn current_analysis(&self) -> Option<ActiveAnalysis> {
        self.current_analysis.lock().ok()?.clone()
    }

    /// Is an analysis currently outstanding for this session?
    pub fn analysis_in_flight(&self) -> bool {
        self.analysis_lock.try_lock().is_err()
    }

    fn try_acquire_analysis(
        &self,
        text_length: usize,
    ) -> Result<AnalysisGuard<'_>, ControllerError> {
        let guard = match self.analysis_lock.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::WouldBlock) => {
                return Err(ControllerError::AnalysisInFlight)
            }
            Err(std::sync::TryLockError::Poisoned(_)) => return Err(ControllerError::LockPoisoned),
        };
        if let Ok(mut current) = self.current_analysis.lock() {
            *current = Some(ActiveAnalysis {
                started_at: chrono::Utc::now().to_rfc3339(),
                text_length,
            });
        }
        Ok(AnalysisGuard {
            _guard: guard,
            controller: self,
        })
    }

    fn clear_current_analysis(&self) {
        if let Ok(mut current) = self.current_analysis.lock() {
            *current = None;
        }
    }
}

/// RAII token for the analysis-in-flight lock. Dropping it releases the
/// lock and clears the observable state, on every exit path.
struct AnalysisGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    controller: &'a SyncController,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.controller.clear_current_analysis();
    }
}
