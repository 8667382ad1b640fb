//! # Syllabus Document
//!
//! The in-memory aggregate edited by a single [`DocumentEditor`](crate::DocumentEditor).
//!
//! A Document holds four sections:
//! - **Topics**: ordered teaching topics, identified by position
//! - **Units**: groupings of topics, referencing them by index
//! - **Teaching schedule**: weekly hours and a month-by-month plan
//! - **Assessment plan**: weighted assessment methods
//!
//! ## Identity
//!
//! Topics and units carry no stable id. Their `index` field mirrors their
//! position and is recomputed after every structural change, so a unit's
//! `topic_refs` entry can stop resolving after a topic is deleted. Rendering
//! skips such dangling references; they are never removed implicitly.
//!
//! ## Serialized shape
//!
//! Field names on the wire follow the stored syllabus content JSON
//! (`teaching_schedule`, `duration`, `weight`, ...), so documents written by
//! the surrounding application load unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Editable syllabus content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub topics: Vec<Topic>,

    #[serde(default)]
    pub units: Vec<Unit>,

    #[serde(default, rename = "teaching_schedule")]
    pub schedule: Schedule,

    #[serde(default)]
    pub assessment_plan: AssessmentPlan,
}

/// A single teaching topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Position in `Document::topics`
    #[serde(default)]
    pub index: usize,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Planned teaching time in hours
    #[serde(default, rename = "duration")]
    pub duration_hours: f64,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A group of topics taught together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Position in `Document::units`
    #[serde(default)]
    pub index: usize,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Topic indices, kept in assignment order without duplicates
    #[serde(default, rename = "topics")]
    pub topic_refs: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, rename = "weekly_hours")]
    pub weekly_hours_total: f64,

    #[serde(default)]
    pub total_weeks: u32,

    #[serde(default)]
    pub monthly_plan: Vec<MonthlyPlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPlanEntry {
    pub month: String,

    #[serde(default, rename = "topics")]
    pub topic_count: u32,

    #[serde(default)]
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPlan {
    #[serde(default)]
    pub methods: Vec<AssessmentMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentMethod {
    pub name: String,

    /// Share of the final grade, 0 to 100. Weights across methods are not
    /// required to add up to 100.
    #[serde(rename = "weight")]
    pub weight_percent: f64,

    pub frequency: Frequency,
}

impl Default for AssessmentMethod {
    fn default() -> Self {
        Self {
            name: "New Assessment Method".to_string(),
            weight_percent: 10.0,
            frequency: Frequency::Weekly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    #[serde(rename = "Term-end")]
    TermEnd,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {other} (expected easy, medium or hard)")),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::TermEnd => "Term-end",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "term-end" | "termend" => Ok(Frequency::TermEnd),
            other => Err(format!("Unknown frequency: {other}")),
        }
    }
}

impl Topic {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        description: impl Into<String>,
        duration_hours: f64,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            description: description.into(),
            duration_hours,
            difficulty,
            completed: false,
        }
    }
}

impl Unit {
    /// Empty unit at `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// References that point past the end of `topics`
    pub fn dangling_refs(&self, topics: &[Topic]) -> Vec<usize> {
        self.topic_refs
            .iter()
            .copied()
            .filter(|&r| r >= topics.len())
            .collect()
    }

    /// Topics this unit references, skipping dangling references
    pub fn resolve_topics<'a>(&self, topics: &'a [Topic]) -> Vec<&'a Topic> {
        self.topic_refs
            .iter()
            .filter_map(|&r| topics.get(r))
            .collect()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
            && self.units.is_empty()
            && self.schedule == Schedule::default()
            && self.assessment_plan.methods.is_empty()
    }

    /// Set every topic's `index` to its position
    pub fn reindex_topics(&mut self) {
        for (position, topic) in self.topics.iter_mut().enumerate() {
            topic.index = position;
        }
    }

    /// Set every unit's `index` to its position
    pub fn reindex_units(&mut self) {
        for (position, unit) in self.units.iter_mut().enumerate() {
            unit.index = position;
        }
    }

    /// Bring stored indices back in line with positions.
    ///
    /// Content written elsewhere may carry stale or missing `index` values.
    pub(crate) fn normalize(&mut self) {
        self.reindex_topics();
        self.reindex_units();
    }

    /// Total of all assessment weights (not required to be 100)
    pub fn total_assessment_weight(&self) -> f64 {
        self.assessment_plan
            .methods
            .iter()
            .map(|m| m.weight_percent)
            .sum()
    }

    /// Sum of planned topic durations in hours
    pub fn planned_hours(&self) -> f64 {
        self.topics.iter().map(|t| t.duration_hours).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "topics": [
                {"index": 0, "name": "Introduction to Algebra", "description": "Basic algebraic concepts", "duration": 4, "difficulty": "medium", "completed": true},
                {"index": 1, "name": "Linear Equations", "description": "", "duration": 6, "difficulty": "hard", "completed": false}
            ],
            "units": [
                {"index": 0, "title": "Algebraic Fundamentals", "description": "", "topics": [0, 1]}
            ],
            "teaching_schedule": {
                "weekly_hours": 5,
                "total_weeks": 16,
                "monthly_plan": [{"month": "April", "topics": 2, "hours": 20}]
            },
            "assessment_plan": {
                "methods": [{"name": "Project Work", "weight": 10, "frequency": "Term-end"}]
            }
        }"#
    }

    #[test]
    fn test_parse_stored_content() {
        let doc: Document = serde_json::from_str(sample_json()).unwrap();

        assert_eq!(doc.topics.len(), 2);
        assert_eq!(doc.topics[0].duration_hours, 4.0);
        assert!(doc.topics[0].completed);
        assert_eq!(doc.topics[1].difficulty, Difficulty::Hard);
        assert_eq!(doc.units[0].topic_refs, vec![0, 1]);
        assert_eq!(doc.schedule.weekly_hours_total, 5.0);
        assert_eq!(doc.schedule.monthly_plan[0].topic_count, 2);
        assert_eq!(doc.assessment_plan.methods[0].frequency, Frequency::TermEnd);
    }

    #[test]
    fn test_empty_sections_default() {
        // The application seeds new syllabi with empty objects
        let json = r#"{"topics": [], "units": [], "teaching_schedule": {}, "assessment_plan": {}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        assert!(doc.is_empty());
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_term_end_serializes_literally() {
        let json = serde_json::to_string(&Frequency::TermEnd).unwrap();
        assert_eq!(json, "\"Term-end\"");
        assert_eq!("term-end".parse::<Frequency>().unwrap(), Frequency::TermEnd);
    }

    #[test]
    fn test_resolve_topics_skips_dangling() {
        let doc: Document = serde_json::from_str(sample_json()).unwrap();
        let mut unit = doc.units[0].clone();
        unit.topic_refs.push(7);

        let names: Vec<&str> = unit
            .resolve_topics(&doc.topics)
            .iter()
            .map(|t| t.name.as_str())
            .collect();

        assert_eq!(names, vec!["Introduction to Algebra", "Linear Equations"]);
        assert_eq!(unit.dangling_refs(&doc.topics), vec![7]);
    }

    #[test]
    fn test_normalize_fixes_stale_indices() {
        let mut doc: Document = serde_json::from_str(sample_json()).unwrap();
        doc.topics[0].index = 9;
        doc.units[0].index = 4;

        doc.normalize();

        assert_eq!(doc.topics[0].index, 0);
        assert_eq!(doc.topics[1].index, 1);
        assert_eq!(doc.units[0].index, 0);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
