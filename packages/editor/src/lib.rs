//! # Syllabus Editor
//!
//! Editing engine for syllabus content: topics, units, a teaching schedule
//! and an assessment plan, kept in one JSON-shaped document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: CLI, web handler, tests               │
//! └─────────────────────────────────────────────┘
//!          ↓ mutations            ↑ render / notify / confirm
//! ┌─────────────────────────────────────────────┐
//! │ editor: DocumentEditor                      │
//! │  - Load state machine                       │
//! │  - Validate + apply mutations               │
//! │  - Dirty tracking by revision               │
//! │  - Debounce + heartbeat autosave            │
//! │  - One save in flight                       │
//! └─────────────────────────────────────────────┘
//!                     ↓ snapshots
//! ┌─────────────────────────────────────────────┐
//! │ backend: PersistenceBackend                 │
//! │  (memory, JSON files, or host-provided)     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document is the source of truth**: views are re-rendered from it
//! 2. **Mutations are validated before they touch anything**
//! 3. **Topic indices are positions**: always `0..n-1`, renumbered on delete
//!    and reorder
//! 4. **Saving never blocks editing**: saves work on snapshots
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syllabus_editor::{DocumentEditor, EditorConfig, JsonFileBackend, TracingSurface, Difficulty};
//! use std::sync::Arc;
//!
//! let editor = DocumentEditor::open(
//!     "biology-101",
//!     Arc::new(JsonFileBackend::new("syllabi")),
//!     Arc::new(TracingSurface::default()),
//!     EditorConfig::default(),
//! )
//! .await?;
//!
//! editor.add_topic("Cell structure", "Organelles and membranes", 4.0, Difficulty::Easy)?;
//! editor.toggle_topic_completion(0)?;
//!
//! // Autosave would pick this up after 3s; close asks before discarding
//! editor.close().await;
//! ```

mod autosave;
mod backend;
mod config;
mod document;
mod editor;
mod errors;
mod mutations;
mod progress;
mod render;

pub use autosave::SaveTrigger;
pub use backend::{JsonFileBackend, MemoryBackend, PersistenceBackend, SaveAck};
pub use config::EditorConfig;
pub use document::{
    AssessmentMethod, AssessmentPlan, Difficulty, Document, Frequency, MonthlyPlanEntry,
    Schedule, Topic, Unit,
};
pub use editor::{CloseOutcome, DocumentEditor, EditorState};
pub use errors::{EditorError, LoadError, SaveError};
pub use mutations::{
    Applied, AssessmentMethodPatch, Mutation, MutationError, TopicPatch, UnitPatch,
};
pub use progress::{Progress, ProgressStatus};
pub use render::{RecordingSurface, RenderSurface, Severity, SurfaceEvent, TracingSurface, View};
