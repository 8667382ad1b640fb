//! # Render Surface
//!
//! The editor never reads state back from the UI. After each change it pushes
//! a projection of the affected part of the [`Document`] to a
//! [`RenderSurface`], which rebuilds that view from scratch.
//!
//! Surfaces are called while the editor holds its document lock, so an
//! implementation must not call back into the editor.

use crate::document::{AssessmentPlan, Document, Schedule, Topic, Unit};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// A projection of one document section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Topics,
    Units,
    Schedule,
    AssessmentPlan,
}

impl View {
    pub const ALL: [View; 4] = [View::Topics, View::Units, View::Schedule, View::AssessmentPlan];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// UI capable of displaying the document and talking to the user
pub trait RenderSurface: Send + Sync {
    fn render_topics(&self, topics: &[Topic]);

    /// Units need the topics to show names for their references
    fn render_units(&self, units: &[Unit], topics: &[Topic]);

    fn render_schedule(&self, schedule: &Schedule);

    fn render_assessment_plan(&self, plan: &AssessmentPlan);

    /// Autosave indicator and error surfacing
    fn notify(&self, message: &str, severity: Severity);

    /// Ask the user a yes/no question
    fn confirm(&self, prompt: &str) -> bool;
}

pub(crate) fn render_view(surface: &dyn RenderSurface, doc: &Document, view: View) {
    match view {
        View::Topics => surface.render_topics(&doc.topics),
        View::Units => surface.render_units(&doc.units, &doc.topics),
        View::Schedule => surface.render_schedule(&doc.schedule),
        View::AssessmentPlan => surface.render_assessment_plan(&doc.assessment_plan),
    }
}

pub(crate) fn render_all(surface: &dyn RenderSurface, doc: &Document) {
    for view in View::ALL {
        render_view(surface, doc, view);
    }
}

// ============================================================================
// Headless surface
// ============================================================================

/// Surface for hosts without a UI: projections and notifications go to
/// `tracing`, confirmations get a fixed answer.
#[derive(Debug)]
pub struct TracingSurface {
    confirm_answer: bool,
}

impl TracingSurface {
    pub fn new(confirm_answer: bool) -> Self {
        Self { confirm_answer }
    }
}

impl Default for TracingSurface {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RenderSurface for TracingSurface {
    fn render_topics(&self, topics: &[Topic]) {
        let completed = topics.iter().filter(|t| t.completed).count();
        tracing::debug!(count = topics.len(), completed, "render topics");
    }

    fn render_units(&self, units: &[Unit], topics: &[Topic]) {
        let dangling: usize = units.iter().map(|u| u.dangling_refs(topics).len()).sum();
        tracing::debug!(count = units.len(), dangling, "render units");
    }

    fn render_schedule(&self, schedule: &Schedule) {
        tracing::debug!(
            weekly_hours = schedule.weekly_hours_total,
            weeks = schedule.total_weeks,
            months = schedule.monthly_plan.len(),
            "render schedule"
        );
    }

    fn render_assessment_plan(&self, plan: &AssessmentPlan) {
        tracing::debug!(methods = plan.methods.len(), "render assessment plan");
    }

    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!(answer = self.confirm_answer, "confirm: {}", prompt);
        self.confirm_answer
    }
}

// ============================================================================
// Recording surface
// ============================================================================

/// One call made on a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Topics(Vec<Topic>),
    Units { units: Vec<Unit>, topics: Vec<Topic> },
    Schedule(Schedule),
    AssessmentPlan(AssessmentPlan),
    Notify { message: String, severity: Severity },
    Confirm { prompt: String, answer: bool },
}

impl SurfaceEvent {
    /// The view this event renders, if it is a render call
    pub fn view(&self) -> Option<View> {
        match self {
            SurfaceEvent::Topics(_) => Some(View::Topics),
            SurfaceEvent::Units { .. } => Some(View::Units),
            SurfaceEvent::Schedule(_) => Some(View::Schedule),
            SurfaceEvent::AssessmentPlan(_) => Some(View::AssessmentPlan),
            SurfaceEvent::Notify { .. } | SurfaceEvent::Confirm { .. } => None,
        }
    }
}

/// Surface that records every call, with a scripted confirmation answer.
///
/// Useful for hosts that replay projections and for tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(confirm_answer: bool) -> Self {
        let surface = Self::new();
        surface.set_confirm_answer(confirm_answer);
        surface
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().clone()
    }

    /// Drain recorded events
    pub fn take_events(&self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Views rendered so far, in call order
    pub fn rendered_views(&self) -> Vec<View> {
        self.lock().iter().filter_map(SurfaceEvent::view).collect()
    }

    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Notify { message, severity } => Some((message.clone(), *severity)),
                _ => None,
            })
            .collect()
    }

    pub fn confirm_prompts(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Confirm { prompt, .. } => Some(prompt.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SurfaceEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SurfaceEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSurface for RecordingSurface {
    fn render_topics(&self, topics: &[Topic]) {
        self.record(SurfaceEvent::Topics(topics.to_vec()));
    }

    fn render_units(&self, units: &[Unit], topics: &[Topic]) {
        self.record(SurfaceEvent::Units {
            units: units.to_vec(),
            topics: topics.to_vec(),
        });
    }

    fn render_schedule(&self, schedule: &Schedule) {
        self.record(SurfaceEvent::Schedule(schedule.clone()));
    }

    fn render_assessment_plan(&self, plan: &AssessmentPlan) {
        self.record(SurfaceEvent::AssessmentPlan(plan.clone()));
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.record(SurfaceEvent::Notify {
            message: message.to_string(),
            severity,
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        let answer = self.confirm_answer.load(Ordering::SeqCst);
        self.record(SurfaceEvent::Confirm {
            prompt: prompt.to_string(),
            answer,
        });
        answer
    }
}
