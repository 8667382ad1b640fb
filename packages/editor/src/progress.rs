//! Completion summary derived from a [`Document`].
//!
//! Completion is counted per topic; durations do not weight it.

use crate::document::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    NearingCompletion,
    Completed,
}

impl ProgressStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 0.0 {
            ProgressStatus::NotStarted
        } else if percentage < 50.0 {
            ProgressStatus::InProgress
        } else if percentage < 100.0 {
            ProgressStatus::NearingCompletion
        } else {
            ProgressStatus::Completed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not started",
            ProgressStatus::InProgress => "In progress",
            ProgressStatus::NearingCompletion => "Nearing completion",
            ProgressStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub total_topics: usize,
    pub completed_topics: usize,
    pub remaining_topics: usize,
    pub completion_percentage: f64,
    pub planned_hours: f64,
    pub completed_hours: f64,
    pub assessment_weight_total: f64,
    pub status: ProgressStatus,
}

impl Progress {
    pub fn of(doc: &Document) -> Self {
        let total_topics = doc.topics.len();
        let completed_topics = doc.topics.iter().filter(|t| t.completed).count();
        let completion_percentage = if total_topics == 0 {
            0.0
        } else {
            completed_topics as f64 / total_topics as f64 * 100.0
        };
        let completed_hours = doc
            .topics
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.duration_hours)
            .sum();

        Self {
            total_topics,
            completed_topics,
            remaining_topics: total_topics - completed_topics,
            completion_percentage,
            planned_hours: doc.planned_hours(),
            completed_hours,
            assessment_weight_total: doc.total_assessment_weight(),
            status: ProgressStatus::from_percentage(completion_percentage),
        }
    }
}

impl Document {
    pub fn progress(&self) -> Progress {
        Progress::of(self)
    }
}
