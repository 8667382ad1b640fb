//! # Document Editor
//!
//! A `DocumentEditor` owns one syllabus [`Document`], applies mutations to
//! it, tracks unsaved changes and persists them in the background.
//!
//! ## Lifecycle
//!
//! ```text
//!            load ok
//! Loading ───────────▶ Ready ──close──▶ Closed
//!    │  ▲              (Clean ⇄ Dirty)
//!    │  └── load() ──┐
//!    └── load err ──▶ LoadFailed
//! ```
//!
//! Mutations are only accepted in `Ready`, so a document is never edited
//! while a load is replacing it.
//!
//! ## Saving
//!
//! - Every save snapshots the document first, then talks to the backend
//!   without holding the document lock
//! - A save gate allows one save in flight; explicit saves queue behind it,
//!   autosaves that find it busy are folded into a follow-up save
//! - Dirty state is a revision comparison, so edits made while a save was in
//!   flight stay dirty and go out with the next save

use crate::autosave::{AutosaveScheduler, AutosaveTarget, SaveTrigger};
use crate::backend::{PersistenceBackend, SaveAck};
use crate::config::EditorConfig;
use crate::document::{Difficulty, Document, Schedule, Topic, Unit};
use crate::errors::{EditorError, SaveError};
use crate::mutations::{Applied, AssessmentMethodPatch, Mutation, TopicPatch, UnitPatch};
use crate::progress::Progress;
use crate::render::{render_all, render_view, RenderSurface, Severity};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;

const UNSAVED_CHANGES_PROMPT: &str = "You have unsaved changes. Do you want to save before closing?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Loading,
    Ready,
    LoadFailed,
    Closed,
}

/// How `close` ended
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// Nothing unsaved
    Clean,
    /// User chose to save and the save succeeded
    Saved(SaveAck),
    /// User chose not to save
    Discarded,
    /// User chose to save but the save failed; the editor closed anyway
    SaveFailed(SaveError),
}

pub struct DocumentEditor {
    inner: Arc<EditorInner>,
}

struct EditorInner {
    document_id: String,
    config: EditorConfig,
    backend: Arc<dyn PersistenceBackend>,
    surface: Arc<dyn RenderSurface>,
    core: Mutex<EditorCore>,

    /// Held for the duration of every backend call
    save_gate: tokio::sync::Mutex<()>,

    scheduler: Mutex<Option<AutosaveScheduler>>,
}

struct EditorCore {
    document: Document,
    state: EditorState,

    /// Bumped by every mutation that changed the document
    revision: u64,

    /// Revision of the last snapshot the backend accepted
    saved_revision: u64,

    /// An autosave arrived while the gate was taken
    autosave_pending: bool,
}

impl EditorCore {
    fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    fn ensure_ready(&self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Ready => Ok(()),
            EditorState::Closed => Err(EditorError::Closed),
            state => Err(EditorError::NotReady(state)),
        }
    }
}

impl DocumentEditor {
    /// Create an editor in `Loading` with an empty document.
    ///
    /// Must be called from within a Tokio runtime; the autosave timers are
    /// spawned on it. Call [`load`](Self::load) to fetch the content.
    pub fn new(
        document_id: impl Into<String>,
        backend: Arc<dyn PersistenceBackend>,
        surface: Arc<dyn RenderSurface>,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let handle = Handle::try_current().map_err(|e| EditorError::Runtime(e.to_string()))?;

        let inner = Arc::new(EditorInner {
            document_id: document_id.into(),
            backend,
            surface,
            core: Mutex::new(EditorCore {
                document: Document::new(),
                state: EditorState::Loading,
                revision: 0,
                saved_revision: 0,
                autosave_pending: false,
            }),
            save_gate: tokio::sync::Mutex::new(()),
            scheduler: Mutex::new(None),
            config,
        });

        let scheduler = AutosaveScheduler::spawn(
            &handle,
            Arc::downgrade(&inner),
            inner.config.debounce(),
            inner.config.heartbeat(),
        );
        *inner.lock_scheduler() = Some(scheduler);

        Ok(Self { inner })
    }

    /// Create an editor and load its document
    pub async fn open(
        document_id: impl Into<String>,
        backend: Arc<dyn PersistenceBackend>,
        surface: Arc<dyn RenderSurface>,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let editor = Self::new(document_id, backend, surface, config)?;
        editor.load().await?;
        Ok(editor)
    }

    /// Fetch the document from the backend and re-render every view.
    ///
    /// On failure the document is reset to empty and the editor moves to
    /// `LoadFailed`. Can be called again to retry, or from `Ready` to
    /// discard local changes.
    pub async fn load(&self) -> Result<Document, EditorError> {
        let inner = &self.inner;
        {
            let mut core = inner.lock_core();
            if core.state == EditorState::Closed {
                return Err(EditorError::Closed);
            }
            core.state = EditorState::Loading;
        }

        let _gate = inner.save_gate.lock().await;
        tracing::info!(document_id = %inner.document_id, "loading document");
        let result = inner.backend.load(&inner.document_id).await;

        let mut core = inner.lock_core();
        if core.state == EditorState::Closed {
            return Err(EditorError::Closed);
        }
        core.revision = 0;
        core.saved_revision = 0;
        core.autosave_pending = false;

        match result {
            Ok(mut document) => {
                document.normalize();
                core.document = document;
                core.state = EditorState::Ready;
                render_all(&*inner.surface, &core.document);
                tracing::info!(
                    document_id = %inner.document_id,
                    topics = core.document.topics.len(),
                    units = core.document.units.len(),
                    "document loaded"
                );
                Ok(core.document.clone())
            }
            Err(e) => {
                core.document = Document::new();
                core.state = EditorState::LoadFailed;
                tracing::error!(document_id = %inner.document_id, error = %e, "failed to load document");
                inner
                    .surface
                    .notify(&format!("Failed to load syllabus content: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Apply a mutation, re-render the affected views and restart the
    /// debounce timer.
    ///
    /// A rejected mutation leaves the document and dirty state unchanged and
    /// is reported to the surface as a warning.
    pub fn apply(&self, mutation: Mutation) -> Result<Applied, EditorError> {
        let inner = &self.inner;
        let mut core = inner.lock_core();
        core.ensure_ready()?;

        let applied = match mutation.apply(&mut core.document) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(
                    document_id = %inner.document_id,
                    mutation = mutation.name(),
                    error = %e,
                    "mutation rejected"
                );
                inner.surface.notify(&e.to_string(), Severity::Warning);
                return Err(e.into());
            }
        };

        if !applied.is_change() {
            tracing::debug!(mutation = mutation.name(), "mutation had no effect");
            return Ok(applied);
        }

        core.revision += 1;
        for &view in mutation.affected_views() {
            render_view(&*inner.surface, &core.document, view);
        }
        tracing::debug!(
            document_id = %inner.document_id,
            mutation = mutation.name(),
            revision = core.revision,
            "mutation applied"
        );
        drop(core);

        inner.touch();
        Ok(applied)
    }

    pub fn add_topic(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        duration_hours: f64,
        difficulty: Difficulty,
    ) -> Result<Topic, EditorError> {
        let mutation = Mutation::AddTopic {
            name: name.into(),
            description: description.into(),
            duration_hours,
            difficulty,
        };
        match self.apply(mutation)? {
            Applied::Topic(topic) => Ok(topic),
            other => unreachable!("add_topic produced {other:?}"),
        }
    }

    pub fn update_topic(&self, index: usize, patch: TopicPatch) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateTopic { index, patch }).map(drop)
    }

    /// No-op when `index` is out of range
    pub fn toggle_topic_completion(&self, index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::ToggleTopicCompletion { index }).map(drop)
    }

    /// Caller must have confirmed the deletion
    pub fn delete_topic(&self, index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteTopic { index }).map(drop)
    }

    pub fn reorder_topic(&self, from: usize, to: usize) -> Result<(), EditorError> {
        self.apply(Mutation::ReorderTopic { from, to }).map(drop)
    }

    pub fn add_unit(&self) -> Result<Unit, EditorError> {
        match self.apply(Mutation::AddUnit)? {
            Applied::Unit(unit) => Ok(unit),
            other => unreachable!("add_unit produced {other:?}"),
        }
    }

    pub fn update_unit(&self, index: usize, patch: UnitPatch) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateUnit { index, patch }).map(drop)
    }

    /// Caller must have confirmed the deletion
    pub fn delete_unit(&self, index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteUnit { index }).map(drop)
    }

    pub fn assign_topic_to_unit(&self, unit_index: usize, topic_index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::AssignTopicToUnit {
            unit_index,
            topic_index,
        })
        .map(drop)
    }

    /// Removing a reference the unit does not have is a no-op
    pub fn remove_topic_from_unit(&self, unit_index: usize, topic_index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveTopicFromUnit {
            unit_index,
            topic_index,
        })
        .map(drop)
    }

    pub fn add_assessment_method(&self) -> Result<(), EditorError> {
        self.apply(Mutation::AddAssessmentMethod).map(drop)
    }

    pub fn update_assessment_method(
        &self,
        index: usize,
        patch: AssessmentMethodPatch,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateAssessmentMethod { index, patch })
            .map(drop)
    }

    /// Caller must have confirmed the deletion
    pub fn delete_assessment_method(&self, index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteAssessmentMethod { index }).map(drop)
    }

    pub fn set_schedule(&self, schedule: Schedule) -> Result<(), EditorError> {
        self.apply(Mutation::SetSchedule { schedule }).map(drop)
    }

    /// Save regardless of dirty state.
    ///
    /// Waits for any save already in flight instead of running beside it.
    pub async fn save_now(&self) -> Result<SaveAck, EditorError> {
        let inner = &self.inner;
        inner.lock_core().ensure_ready()?;

        let _gate = inner.save_gate.lock().await;
        let result = inner.persist(SaveTrigger::Explicit).await;
        inner.drain_pending().await;
        result
    }

    /// Tear the editor down.
    ///
    /// Both timers are stopped first. With unsaved changes the surface is
    /// asked whether to save; the editor ends up `Closed` either way.
    pub async fn close(&self) -> CloseOutcome {
        let inner = &self.inner;
        if inner.lock_core().state == EditorState::Closed {
            return CloseOutcome::Clean;
        }

        inner.stop_timers().await;

        let dirty = {
            let core = inner.lock_core();
            core.state == EditorState::Ready && core.is_dirty()
        };

        let outcome = if !dirty {
            CloseOutcome::Clean
        } else if inner.surface.confirm(UNSAVED_CHANGES_PROMPT) {
            let _gate = inner.save_gate.lock().await;
            match inner.persist(SaveTrigger::Close).await {
                Ok(ack) => CloseOutcome::Saved(ack),
                Err(EditorError::Save(e)) => CloseOutcome::SaveFailed(e),
                Err(other) => CloseOutcome::SaveFailed(SaveError::Rejected(other.to_string())),
            }
        } else {
            CloseOutcome::Discarded
        };

        inner.lock_core().state = EditorState::Closed;
        tracing::info!(document_id = %inner.document_id, ?outcome, "editor closed");
        outcome
    }

    pub fn document_id(&self) -> &str {
        &self.inner.document_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    pub fn state(&self) -> EditorState {
        self.inner.lock_core().state
    }

    /// Unsaved mutations since the last successful save
    pub fn is_dirty(&self) -> bool {
        self.inner.lock_core().is_dirty()
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock_core().revision
    }

    /// Copy of the current document
    pub fn document(&self) -> Document {
        self.inner.lock_core().document.clone()
    }

    /// Read the current document without copying it
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.lock_core().document)
    }

    pub fn progress(&self) -> Progress {
        self.with_document(Progress::of)
    }
}

impl EditorInner {
    fn lock_core(&self) -> MutexGuard<'_, EditorCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_scheduler(&self) -> MutexGuard<'_, Option<AutosaveScheduler>> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        if let Some(scheduler) = self.lock_scheduler().as_ref() {
            scheduler.touch();
        }
    }

    async fn stop_timers(&self) {
        let scheduler = self.lock_scheduler().take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
        }
    }

    /// Snapshot the document and hand it to the backend. Caller holds the
    /// save gate.
    async fn persist(&self, trigger: SaveTrigger) -> Result<SaveAck, EditorError> {
        let (snapshot, revision) = {
            let core = self.lock_core();
            core.ensure_ready()?;
            (core.document.clone(), core.revision)
        };

        tracing::debug!(document_id = %self.document_id, ?trigger, revision, "saving document");

        match self.backend.save(&self.document_id, &snapshot).await {
            Ok(ack) => {
                let still_dirty = {
                    let mut core = self.lock_core();
                    if revision > core.saved_revision {
                        core.saved_revision = revision;
                    }
                    core.is_dirty()
                };
                tracing::info!(
                    document_id = %self.document_id,
                    ?trigger,
                    revision,
                    still_dirty,
                    "document saved"
                );
                if !trigger.is_background() {
                    self.surface
                        .notify("Changes saved successfully!", Severity::Success);
                } else if self.config.notify_on_autosave {
                    self.surface.notify("Auto-saved", Severity::Success);
                }
                Ok(ack)
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %self.document_id,
                    ?trigger,
                    revision,
                    error = %e,
                    "save failed"
                );
                self.surface
                    .notify(&format!("Failed to save changes: {e}"), Severity::Warning);
                Err(e.into())
            }
        }
    }

    /// Run autosaves that were deferred while the gate was held.
    /// Caller holds the save gate.
    async fn drain_pending(&self) {
        loop {
            let due = {
                let mut core = self.lock_core();
                let pending = std::mem::take(&mut core.autosave_pending);
                pending && core.state == EditorState::Ready && core.is_dirty()
            };
            if !due || self.persist(SaveTrigger::Coalesced).await.is_err() {
                break;
            }
        }
    }
}

#[async_trait]
impl AutosaveTarget for EditorInner {
    async fn autosave(&self, trigger: SaveTrigger) {
        let _gate = match self.save_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                self.lock_core().autosave_pending = true;
                // The holder may have released the gate in the meantime
                match self.save_gate.try_lock() {
                    Ok(gate) => gate,
                    Err(_) => {
                        tracing::debug!(?trigger, "save in flight, autosave deferred");
                        return;
                    }
                }
            }
        };

        // Dirty is checked when the timer fires, not when it was scheduled
        let due = {
            let mut core = self.lock_core();
            core.autosave_pending = false;
            core.state == EditorState::Ready && core.is_dirty()
        };
        if due {
            // Failures are already surfaced; the next trigger retries
            let _ = self.persist(trigger).await;
        }
        self.drain_pending().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::render::RecordingSurface;

    async fn ready_editor() -> (DocumentEditor, Arc<MemoryBackend>, Arc<RecordingSurface>) {
        let backend = Arc::new(MemoryBackend::new().with_document("s1", Document::new()));
        let surface = Arc::new(RecordingSurface::new());
        let editor = DocumentEditor::open(
            "s1",
            backend.clone(),
            surface.clone(),
            EditorConfig::default(),
        )
        .await
        .unwrap();
        (editor, backend, surface)
    }

    #[test]
    fn test_new_requires_runtime() {
        let result = DocumentEditor::new(
            "s1",
            Arc::new(MemoryBackend::new()),
            Arc::new(RecordingSurface::new()),
            EditorConfig::default(),
        );

        assert!(matches!(result, Err(EditorError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_mutations_rejected_while_loading() {
        let editor = DocumentEditor::new(
            "s1",
            Arc::new(MemoryBackend::new()),
            Arc::new(RecordingSurface::new()),
            EditorConfig::default(),
        )
        .unwrap();

        assert_eq!(editor.state(), EditorState::Loading);
        assert!(matches!(
            editor.add_unit(),
            Err(EditorError::NotReady(EditorState::Loading))
        ));
    }

    #[tokio::test]
    async fn test_noop_mutation_stays_clean() {
        let (editor, _backend, surface) = ready_editor().await;
        surface.take_events();

        editor.toggle_topic_completion(3).unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(editor.revision(), 0);
        assert!(surface.events().is_empty());
    }

    #[tokio::test]
    async fn test_revision_tracks_changes() {
        let (editor, _backend, _surface) = ready_editor().await;

        editor.add_unit().unwrap();
        editor.add_assessment_method().unwrap();

        assert_eq!(editor.revision(), 2);
        assert!(editor.is_dirty());
    }

    #[tokio::test]
    async fn test_closed_editor_rejects_everything() {
        let (editor, _backend, _surface) = ready_editor().await;

        assert_eq!(editor.close().await, CloseOutcome::Clean);

        assert_eq!(editor.state(), EditorState::Closed);
        assert!(matches!(editor.add_unit(), Err(EditorError::Closed)));
        assert!(matches!(editor.save_now().await, Err(EditorError::Closed)));
        assert!(matches!(editor.load().await, Err(EditorError::Closed)));
        assert_eq!(editor.close().await, CloseOutcome::Clean);
    }
}
