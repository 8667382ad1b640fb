//! # Document Mutations
//!
//! Every change to a [`Document`] goes through a [`Mutation`].
//!
//! ## Design Principles
//!
//! 1. **Validate, then apply**: a mutation that fails leaves the document untouched
//! 2. **Positional identity**: structural changes reindex the affected sequence
//! 3. **Explicit views**: each mutation names the views that must be re-rendered
//!
//! ## Mutation Semantics
//!
//! ### DeleteTopic
//! - Removes the topic and renumbers the rest
//! - Unit references are left as they are; a reference to a removed position
//!   either dangles or now points at the topic that moved into it
//!
//! ### ReorderTopic
//! - Moves one topic, preserving the relative order of all others
//!
//! ### RemoveTopicFromUnit
//! - Idempotent: removing an absent reference changes nothing
//!
//! ### ToggleTopicCompletion
//! - Out-of-range index is a no-op, not an error

use crate::document::{
    AssessmentMethod, Difficulty, Document, Frequency, Schedule, Topic, Unit,
};
use crate::render::View;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic operations on a syllabus document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Append a new, not yet completed topic
    AddTopic {
        name: String,
        description: String,
        duration_hours: f64,
        difficulty: Difficulty,
    },

    /// Edit fields of an existing topic
    UpdateTopic { index: usize, patch: TopicPatch },

    /// Flip a topic between completed and pending
    ToggleTopicCompletion { index: usize },

    /// Remove a topic (caller has already confirmed)
    DeleteTopic { index: usize },

    /// Move a topic from one position to another
    ReorderTopic { from: usize, to: usize },

    /// Append an empty unit
    AddUnit,

    /// Edit title/description of a unit
    UpdateUnit { index: usize, patch: UnitPatch },

    /// Remove a unit (caller has already confirmed)
    DeleteUnit { index: usize },

    /// Reference a topic from a unit
    AssignTopicToUnit { unit_index: usize, topic_index: usize },

    /// Drop a topic reference from a unit
    RemoveTopicFromUnit { unit_index: usize, topic_index: usize },

    /// Append the default assessment method
    AddAssessmentMethod,

    /// Edit an assessment method
    UpdateAssessmentMethod {
        index: usize,
        patch: AssessmentMethodPatch,
    },

    /// Remove an assessment method (caller has already confirmed)
    DeleteAssessmentMethod { index: usize },

    /// Replace the teaching schedule
    SetSchedule { schedule: Schedule },
}

/// Partial update of a topic; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TopicPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssessmentMethodPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No {target} at index {index} (have {len})")]
    IndexOutOfRange {
        target: &'static str,
        index: usize,
        len: usize,
    },
}

/// What a successfully applied mutation produced
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A topic was created
    Topic(Topic),

    /// A unit was created
    Unit(Unit),

    /// The document changed
    Changed,

    /// The mutation was valid but had nothing to do
    Unchanged,
}

impl Applied {
    pub fn is_change(&self) -> bool {
        !matches!(self, Applied::Unchanged)
    }
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<Applied, MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::AddTopic {
                name,
                description,
                duration_hours,
                difficulty,
            } => {
                let topic = Topic::new(
                    doc.topics.len(),
                    name.trim(),
                    description.trim(),
                    *duration_hours,
                    *difficulty,
                );
                doc.topics.push(topic.clone());
                Ok(Applied::Topic(topic))
            }

            Mutation::UpdateTopic { index, patch } => {
                let topic = &mut doc.topics[*index];
                if let Some(name) = &patch.name {
                    topic.name = name.trim().to_string();
                }
                if let Some(description) = &patch.description {
                    topic.description = description.clone();
                }
                if let Some(hours) = patch.duration_hours {
                    topic.duration_hours = hours;
                }
                if let Some(difficulty) = patch.difficulty {
                    topic.difficulty = difficulty;
                }
                Ok(Applied::Changed)
            }

            Mutation::ToggleTopicCompletion { index } => match doc.topics.get_mut(*index) {
                Some(topic) => {
                    topic.completed = !topic.completed;
                    Ok(Applied::Changed)
                }
                None => Ok(Applied::Unchanged),
            },

            Mutation::DeleteTopic { index } => {
                doc.topics.remove(*index);
                doc.reindex_topics();
                Ok(Applied::Changed)
            }

            Mutation::ReorderTopic { from, to } => {
                if from == to {
                    return Ok(Applied::Unchanged);
                }
                let topic = doc.topics.remove(*from);
                doc.topics.insert(*to, topic);
                doc.reindex_topics();
                Ok(Applied::Changed)
            }

            Mutation::AddUnit => {
                let unit = Unit::new(doc.units.len());
                doc.units.push(unit.clone());
                Ok(Applied::Unit(unit))
            }

            Mutation::UpdateUnit { index, patch } => {
                let unit = &mut doc.units[*index];
                if let Some(title) = &patch.title {
                    unit.title = title.clone();
                }
                if let Some(description) = &patch.description {
                    unit.description = description.clone();
                }
                Ok(Applied::Changed)
            }

            Mutation::DeleteUnit { index } => {
                doc.units.remove(*index);
                doc.reindex_units();
                Ok(Applied::Changed)
            }

            Mutation::AssignTopicToUnit {
                unit_index,
                topic_index,
            } => {
                let refs = &mut doc.units[*unit_index].topic_refs;
                if refs.contains(topic_index) {
                    return Ok(Applied::Unchanged);
                }
                refs.push(*topic_index);
                Ok(Applied::Changed)
            }

            Mutation::RemoveTopicFromUnit {
                unit_index,
                topic_index,
            } => {
                let Some(unit) = doc.units.get_mut(*unit_index) else {
                    return Ok(Applied::Unchanged);
                };
                match unit.topic_refs.iter().position(|r| r == topic_index) {
                    Some(pos) => {
                        unit.topic_refs.remove(pos);
                        Ok(Applied::Changed)
                    }
                    None => Ok(Applied::Unchanged),
                }
            }

            Mutation::AddAssessmentMethod => {
                doc.assessment_plan.methods.push(AssessmentMethod::default());
                Ok(Applied::Changed)
            }

            Mutation::UpdateAssessmentMethod { index, patch } => {
                let method = &mut doc.assessment_plan.methods[*index];
                if let Some(name) = &patch.name {
                    method.name = name.clone();
                }
                if let Some(weight) = patch.weight_percent {
                    method.weight_percent = weight;
                }
                if let Some(frequency) = patch.frequency {
                    method.frequency = frequency;
                }
                Ok(Applied::Changed)
            }

            Mutation::DeleteAssessmentMethod { index } => {
                doc.assessment_plan.methods.remove(*index);
                Ok(Applied::Changed)
            }

            Mutation::SetSchedule { schedule } => {
                if doc.schedule == *schedule {
                    return Ok(Applied::Unchanged);
                }
                doc.schedule = schedule.clone();
                Ok(Applied::Changed)
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::AddTopic {
                name,
                duration_hours,
                ..
            } => {
                require_name(name)?;
                require_duration(*duration_hours)
            }

            Mutation::UpdateTopic { index, patch } => {
                check_index("topic", *index, doc.topics.len())?;
                if let Some(name) = &patch.name {
                    require_name(name)?;
                }
                if let Some(hours) = patch.duration_hours {
                    require_duration(hours)?;
                }
                Ok(())
            }

            // Out of range is a no-op
            Mutation::ToggleTopicCompletion { .. } => Ok(()),

            Mutation::DeleteTopic { index } => check_index("topic", *index, doc.topics.len()),

            Mutation::ReorderTopic { from, to } => {
                check_index("topic", *from, doc.topics.len())?;
                check_index("topic", *to, doc.topics.len())
            }

            Mutation::AddUnit | Mutation::AddAssessmentMethod => Ok(()),

            Mutation::UpdateUnit { index, .. } | Mutation::DeleteUnit { index } => {
                check_index("unit", *index, doc.units.len())
            }

            Mutation::AssignTopicToUnit {
                unit_index,
                topic_index,
            } => {
                check_index("unit", *unit_index, doc.units.len())?;
                check_index("topic", *topic_index, doc.topics.len())
            }

            // Idempotent, including for a missing unit
            Mutation::RemoveTopicFromUnit { .. } => Ok(()),

            Mutation::UpdateAssessmentMethod { index, patch } => {
                check_index(
                    "assessment method",
                    *index,
                    doc.assessment_plan.methods.len(),
                )?;
                if let Some(name) = &patch.name {
                    if name.trim().is_empty() {
                        return Err(MutationError::Validation(
                            "Assessment method name cannot be empty".to_string(),
                        ));
                    }
                }
                if let Some(weight) = patch.weight_percent {
                    require_weight(weight)?;
                }
                Ok(())
            }

            Mutation::DeleteAssessmentMethod { index } => check_index(
                "assessment method",
                *index,
                doc.assessment_plan.methods.len(),
            ),

            Mutation::SetSchedule { schedule } => {
                if !schedule.weekly_hours_total.is_finite() || schedule.weekly_hours_total < 0.0 {
                    return Err(MutationError::Validation(
                        "Weekly hours must be zero or more".to_string(),
                    ));
                }
                if schedule.monthly_plan.iter().any(|m| m.month.trim().is_empty()) {
                    return Err(MutationError::Validation(
                        "Every monthly plan entry needs a month".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Views whose projection changes when this mutation is applied
    pub fn affected_views(&self) -> &'static [View] {
        match self {
            Mutation::AddTopic { .. } | Mutation::ToggleTopicCompletion { .. } => &[View::Topics],

            // Units show topic names and resolve refs by position
            Mutation::UpdateTopic { .. }
            | Mutation::DeleteTopic { .. }
            | Mutation::ReorderTopic { .. } => &[View::Topics, View::Units],

            Mutation::AddUnit
            | Mutation::UpdateUnit { .. }
            | Mutation::DeleteUnit { .. }
            | Mutation::AssignTopicToUnit { .. }
            | Mutation::RemoveTopicFromUnit { .. } => &[View::Units],

            Mutation::AddAssessmentMethod
            | Mutation::UpdateAssessmentMethod { .. }
            | Mutation::DeleteAssessmentMethod { .. } => &[View::AssessmentPlan],

            Mutation::SetSchedule { .. } => &[View::Schedule],
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddTopic { .. } => "add_topic",
            Mutation::UpdateTopic { .. } => "update_topic",
            Mutation::ToggleTopicCompletion { .. } => "toggle_topic_completion",
            Mutation::DeleteTopic { .. } => "delete_topic",
            Mutation::ReorderTopic { .. } => "reorder_topic",
            Mutation::AddUnit => "add_unit",
            Mutation::UpdateUnit { .. } => "update_unit",
            Mutation::DeleteUnit { .. } => "delete_unit",
            Mutation::AssignTopicToUnit { .. } => "assign_topic_to_unit",
            Mutation::RemoveTopicFromUnit { .. } => "remove_topic_from_unit",
            Mutation::AddAssessmentMethod => "add_assessment_method",
            Mutation::UpdateAssessmentMethod { .. } => "update_assessment_method",
            Mutation::DeleteAssessmentMethod { .. } => "delete_assessment_method",
            Mutation::SetSchedule { .. } => "set_schedule",
        }
    }
}

fn check_index(target: &'static str, index: usize, len: usize) -> Result<(), MutationError> {
    if index < len {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfRange { target, index, len })
    }
}

fn require_name(name: &str) -> Result<(), MutationError> {
    if name.trim().is_empty() {
        return Err(MutationError::Validation(
            "Please enter a topic name.".to_string(),
        ));
    }
    Ok(())
}

fn require_duration(hours: f64) -> Result<(), MutationError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(MutationError::Validation(format!(
            "Duration must be zero or more hours, got {hours}"
        )));
    }
    Ok(())
}

fn require_weight(weight: f64) -> Result<(), MutationError> {
    if !(0.0..=100.0).contains(&weight) {
        return Err(MutationError::Validation(format!(
            "Weight must be between 0 and 100, got {weight}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_topics(names: &[&str]) -> Document {
        let mut doc = Document::new();
        for name in names {
            Mutation::AddTopic {
                name: name.to_string(),
                description: String::new(),
                duration_hours: 2.0,
                difficulty: Difficulty::Medium,
            }
            .apply(&mut doc)
            .unwrap();
        }
        doc
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.topics.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::ReorderTopic { from: 2, to: 0 };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
        assert!(json.contains("\"type\":\"reorder_topic\""));
    }

    #[test]
    fn test_add_topic_trims_and_appends() {
        let mut doc = doc_with_topics(&["Fractions"]);

        let applied = Mutation::AddTopic {
            name: "  Decimals ".to_string(),
            description: " place value ".to_string(),
            duration_hours: 3.5,
            difficulty: Difficulty::Easy,
        }
        .apply(&mut doc)
        .unwrap();

        let Applied::Topic(topic) = applied else {
            panic!("Expected a topic");
        };
        assert_eq!(topic.index, 1);
        assert_eq!(topic.name, "Decimals");
        assert_eq!(topic.description, "place value");
        assert!(!topic.completed);
        assert_eq!(doc.topics[1], topic);
    }

    #[test]
    fn test_add_topic_rejects_blank_name() {
        let mut doc = doc_with_topics(&["Fractions"]);
        let before = doc.clone();

        let result = Mutation::AddTopic {
            name: "   ".to_string(),
            description: "x".to_string(),
            duration_hours: 1.0,
            difficulty: Difficulty::Hard,
        }
        .apply(&mut doc);

        assert!(matches!(result, Err(MutationError::Validation(_))));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_topic_rejects_negative_duration() {
        let mut doc = Document::new();

        let result = Mutation::AddTopic {
            name: "Ratios".to_string(),
            description: String::new(),
            duration_hours: -1.0,
            difficulty: Difficulty::Medium,
        }
        .apply(&mut doc);

        assert!(matches!(result, Err(MutationError::Validation(_))));
        assert!(doc.topics.is_empty());
    }

    #[test]
    fn test_toggle_out_of_range_is_noop() {
        let mut doc = doc_with_topics(&["A"]);

        let applied = Mutation::ToggleTopicCompletion { index: 5 }
            .apply(&mut doc)
            .unwrap();

        assert_eq!(applied, Applied::Unchanged);
        assert!(!doc.topics[0].completed);

        Mutation::ToggleTopicCompletion { index: 0 }
            .apply(&mut doc)
            .unwrap();
        assert!(doc.topics[0].completed);
    }

    #[test]
    fn test_delete_topic_reindexes() {
        let mut doc = doc_with_topics(&["A", "B", "C"]);

        Mutation::DeleteTopic { index: 0 }.apply(&mut doc).unwrap();

        assert_eq!(names(&doc), vec!["B", "C"]);
        assert_eq!(doc.topics[0].index, 0);
        assert_eq!(doc.topics[1].index, 1);
    }

    #[test]
    fn test_delete_topic_leaves_unit_refs() {
        let mut doc = doc_with_topics(&["A", "B", "C"]);
        Mutation::AddUnit.apply(&mut doc).unwrap();
        for topic_index in [0, 2] {
            Mutation::AssignTopicToUnit {
                unit_index: 0,
                topic_index,
            }
            .apply(&mut doc)
            .unwrap();
        }

        Mutation::DeleteTopic { index: 2 }.apply(&mut doc).unwrap();

        assert_eq!(doc.units[0].topic_refs, vec![0, 2]);
        assert_eq!(doc.units[0].dangling_refs(&doc.topics), vec![2]);
    }

    #[test]
    fn test_delete_topic_out_of_range() {
        let mut doc = doc_with_topics(&["A"]);

        let result = Mutation::DeleteTopic { index: 1 }.apply(&mut doc);

        assert_eq!(
            result,
            Err(MutationError::IndexOutOfRange {
                target: "topic",
                index: 1,
                len: 1
            })
        );
    }

    #[test]
    fn test_reorder_preserves_relative_order() {
        let mut doc = doc_with_topics(&["A", "B", "C", "D"]);

        Mutation::ReorderTopic { from: 0, to: 2 }
            .apply(&mut doc)
            .unwrap();
        assert_eq!(names(&doc), vec!["B", "C", "A", "D"]);

        Mutation::ReorderTopic { from: 3, to: 0 }
            .apply(&mut doc)
            .unwrap();
        assert_eq!(names(&doc), vec!["D", "B", "C", "A"]);

        for (position, topic) in doc.topics.iter().enumerate() {
            assert_eq!(topic.index, position);
        }
    }

    #[test]
    fn test_assign_requires_existing_topic() {
        let mut doc = doc_with_topics(&["A"]);
        Mutation::AddUnit.apply(&mut doc).unwrap();

        let result = Mutation::AssignTopicToUnit {
            unit_index: 0,
            topic_index: 3,
        }
        .apply(&mut doc);

        assert!(matches!(
            result,
            Err(MutationError::IndexOutOfRange { target: "topic", .. })
        ));
        assert!(doc.units[0].topic_refs.is_empty());
    }

    #[test]
    fn test_assign_is_set_like() {
        let mut doc = doc_with_topics(&["A"]);
        Mutation::AddUnit.apply(&mut doc).unwrap();
        let assign = Mutation::AssignTopicToUnit {
            unit_index: 0,
            topic_index: 0,
        };

        assert_eq!(assign.apply(&mut doc).unwrap(), Applied::Changed);
        assert_eq!(assign.apply(&mut doc).unwrap(), Applied::Unchanged);
        assert_eq!(doc.units[0].topic_refs, vec![0]);
    }

    #[test]
    fn test_remove_topic_from_unit_is_idempotent() {
        let mut doc = doc_with_topics(&["A"]);
        Mutation::AddUnit.apply(&mut doc).unwrap();
        Mutation::AssignTopicToUnit {
            unit_index: 0,
            topic_index: 0,
        }
        .apply(&mut doc)
        .unwrap();

        let remove = Mutation::RemoveTopicFromUnit {
            unit_index: 0,
            topic_index: 0,
        };
        assert_eq!(remove.apply(&mut doc).unwrap(), Applied::Changed);
        assert_eq!(remove.apply(&mut doc).unwrap(), Applied::Unchanged);

        let missing_unit = Mutation::RemoveTopicFromUnit {
            unit_index: 9,
            topic_index: 0,
        };
        assert_eq!(missing_unit.apply(&mut doc).unwrap(), Applied::Unchanged);
    }

    #[test]
    fn test_delete_unit_reindexes() {
        let mut doc = Document::new();
        for _ in 0..3 {
            Mutation::AddUnit.apply(&mut doc).unwrap();
        }

        Mutation::DeleteUnit { index: 1 }.apply(&mut doc).unwrap();

        assert_eq!(doc.units.len(), 2);
        assert_eq!(doc.units[1].index, 1);
    }

    #[test]
    fn test_new_unit_is_empty() {
        let mut doc = Document::new();

        let Applied::Unit(unit) = Mutation::AddUnit.apply(&mut doc).unwrap() else {
            panic!("Expected a unit");
        };

        assert_eq!(unit.title, "");
        assert!(unit.topic_refs.is_empty());
    }

    #[test]
    fn test_assessment_method_defaults() {
        let mut doc = Document::new();

        Mutation::AddAssessmentMethod.apply(&mut doc).unwrap();

        let method = &doc.assessment_plan.methods[0];
        assert_eq!(method.name, "New Assessment Method");
        assert_eq!(method.weight_percent, 10.0);
        assert_eq!(method.frequency, Frequency::Weekly);
    }

    #[test]
    fn test_update_assessment_weight_bounds() {
        let mut doc = Document::new();
        Mutation::AddAssessmentMethod.apply(&mut doc).unwrap();

        let too_heavy = Mutation::UpdateAssessmentMethod {
            index: 0,
            patch: AssessmentMethodPatch {
                weight_percent: Some(120.0),
                ..Default::default()
            },
        };
        assert!(matches!(
            too_heavy.apply(&mut doc),
            Err(MutationError::Validation(_))
        ));

        let ok = Mutation::UpdateAssessmentMethod {
            index: 0,
            patch: AssessmentMethodPatch {
                weight_percent: Some(40.0),
                frequency: Some(Frequency::Monthly),
                ..Default::default()
            },
        };
        ok.apply(&mut doc).unwrap();
        assert_eq!(doc.assessment_plan.methods[0].weight_percent, 40.0);
        assert_eq!(doc.assessment_plan.methods[0].frequency, Frequency::Monthly);
    }

    #[test]
    fn test_weights_need_not_sum_to_100() {
        let mut doc = Document::new();
        for _ in 0..3 {
            Mutation::AddAssessmentMethod.apply(&mut doc).unwrap();
        }

        assert_eq!(doc.total_assessment_weight(), 30.0);
    }

    #[test]
    fn test_update_topic_partial() {
        let mut doc = doc_with_topics(&["A"]);

        Mutation::UpdateTopic {
            index: 0,
            patch: TopicPatch {
                difficulty: Some(Difficulty::Hard),
                ..Default::default()
            },
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(doc.topics[0].name, "A");
        assert_eq!(doc.topics[0].difficulty, Difficulty::Hard);

        let blank = Mutation::UpdateTopic {
            index: 0,
            patch: TopicPatch {
                name: Some(" ".to_string()),
                ..Default::default()
            },
        };
        assert!(blank.apply(&mut doc).is_err());
        assert_eq!(doc.topics[0].name, "A");
    }

    #[test]
    fn test_affected_views() {
        assert_eq!(
            Mutation::DeleteTopic { index: 0 }.affected_views(),
            &[View::Topics, View::Units]
        );
        assert_eq!(Mutation::AddUnit.affected_views(), &[View::Units]);
        assert_eq!(
            Mutation::AddAssessmentMethod.affected_views(),
            &[View::AssessmentPlan]
        );
    }
}
