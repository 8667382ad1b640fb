//! Tests for long mutation sequences
//!
//! This tests:
//! - Add + reorder + delete chains keep topic indices equal to positions
//! - Unit references survive reorders unchanged
//! - Rejected mutations in the middle of a sequence change nothing

use syllabus_editor::{Applied, Difficulty, Document, Mutation, MutationError, UnitPatch};

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn add_topic(name: &str) -> Mutation {
    Mutation::AddTopic {
        name: name.to_string(),
        description: String::new(),
        duration_hours: 2.0,
        difficulty: Difficulty::Medium,
    }
}

fn assert_indices_match_positions(doc: &Document) {
    for (position, topic) in doc.topics.iter().enumerate() {
        assert_eq!(topic.index, position, "topic {:?} out of place", topic.name);
    }
    for (position, unit) in doc.units.iter().enumerate() {
        assert_eq!(unit.index, position);
    }
}

#[test]
fn test_random_add_delete_reorder_sequence() {
    for seed in [1, 7, 42, 2024] {
        let mut rng = Lcg(seed);
        let mut doc = Document::new();
        let mut expected_names: Vec<String> = Vec::new();

        for step in 0..300 {
            let len = doc.topics.len();
            let mutation = match rng.below(3) {
                _ if len == 0 => add_topic(&format!("t{step}")),
                0 => add_topic(&format!("t{step}")),
                1 => Mutation::DeleteTopic {
                    index: rng.below(len),
                },
                _ => Mutation::ReorderTopic {
                    from: rng.below(len),
                    to: rng.below(len),
                },
            };

            match &mutation {
                Mutation::AddTopic { name, .. } => expected_names.push(name.clone()),
                Mutation::DeleteTopic { index } => {
                    expected_names.remove(*index);
                }
                Mutation::ReorderTopic { from, to } => {
                    let name = expected_names.remove(*from);
                    expected_names.insert(*to, name);
                }
                _ => unreachable!(),
            }

            mutation.apply(&mut doc).unwrap();
            assert_indices_match_positions(&doc);
        }

        let names: Vec<String> = doc.topics.iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, expected_names, "seed {seed}");
    }
}

#[test]
fn test_reorder_then_delete_sequence() -> anyhow::Result<()> {
    let mut doc = Document::new();
    for name in ["Cells", "Genetics", "Evolution", "Ecology"] {
        add_topic(name).apply(&mut doc)?;
    }

    Mutation::ReorderTopic { from: 3, to: 0 }.apply(&mut doc)?;
    Mutation::DeleteTopic { index: 2 }.apply(&mut doc)?;
    Mutation::ReorderTopic { from: 0, to: 2 }.apply(&mut doc)?;

    let names: Vec<&str> = doc.topics.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Cells", "Evolution", "Ecology"]);
    assert_indices_match_positions(&doc);
    Ok(())
}

#[test]
fn test_unit_refs_are_not_rewritten_by_reorder() {
    let mut doc = Document::new();
    for name in ["Cells", "Genetics", "Evolution"] {
        add_topic(name).apply(&mut doc).unwrap();
    }
    Mutation::AddUnit.apply(&mut doc).unwrap();
    Mutation::AssignTopicToUnit {
        unit_index: 0,
        topic_index: 2,
    }
    .apply(&mut doc)
    .unwrap();

    Mutation::ReorderTopic { from: 2, to: 0 }
        .apply(&mut doc)
        .unwrap();

    // References are positional: the unit now points at whatever sits at 2
    assert_eq!(doc.units[0].topic_refs, vec![2]);
    assert_eq!(doc.units[0].resolve_topics(&doc.topics)[0].name, "Genetics");
}

#[test]
fn test_units_and_assessments_chain() {
    let mut doc = Document::new();

    for _ in 0..3 {
        assert!(matches!(
            Mutation::AddUnit.apply(&mut doc).unwrap(),
            Applied::Unit(_)
        ));
    }
    Mutation::UpdateUnit {
        index: 2,
        patch: UnitPatch {
            title: Some("Ecosystems".to_string()),
            description: None,
        },
    }
    .apply(&mut doc)
    .unwrap();
    Mutation::DeleteUnit { index: 0 }.apply(&mut doc).unwrap();

    assert_eq!(doc.units.len(), 2);
    assert_eq!(doc.units[1].title, "Ecosystems");
    assert_indices_match_positions(&doc);

    Mutation::AddAssessmentMethod.apply(&mut doc).unwrap();
    Mutation::AddAssessmentMethod.apply(&mut doc).unwrap();
    Mutation::DeleteAssessmentMethod { index: 0 }
        .apply(&mut doc)
        .unwrap();
    assert_eq!(doc.assessment_plan.methods.len(), 1);
    assert_eq!(doc.total_assessment_weight(), 10.0);
}

#[test]
fn test_rejected_mutation_mid_sequence_changes_nothing() {
    let mut doc = Document::new();
    add_topic("Cells").apply(&mut doc).unwrap();
    add_topic("Genetics").apply(&mut doc).unwrap();
    let before = doc.clone();

    let err = Mutation::ReorderTopic { from: 0, to: 5 }
        .apply(&mut doc)
        .unwrap_err();

    assert_eq!(
        err,
        MutationError::IndexOutOfRange {
            target: "topic",
            index: 5,
            len: 2
        }
    );
    assert_eq!(doc, before);

    add_topic("Evolution").apply(&mut doc).unwrap();
    assert_eq!(doc.topics.len(), 3);
    assert_indices_match_positions(&doc);
}
