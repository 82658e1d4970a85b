//! Trivia questions attached to route markers.

use serde::{Deserialize, Serialize};

use crate::{QuestionId, RouteMarkerId};

/// Default points awarded for a correct answer.
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

/// The input domain of a question.
///
/// Options are part of the variant rather than a loose JSON blob; the storage
/// boundary validates the payload before it reaches the core. Grading does not
/// depend on the kind - the UI constrains the input domain, the grader only
/// compares normalized strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    TrueFalse,
    TextInput,
}

/// A single trivia question at a marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    route_marker_id: RouteMarkerId,
    /// Sequence within the marker.
    order_index: u32,
    kind: QuestionKind,
    prompt: String,
    /// Canonical answer; compared after trim + lowercase normalization.
    correct_answer: String,
    points: u32,
}

impl Question {
    pub fn new(
        route_marker_id: RouteMarkerId,
        order_index: u32,
        kind: QuestionKind,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: QuestionId::new(),
            route_marker_id,
            order_index,
            kind,
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            points: DEFAULT_QUESTION_POINTS,
        }
    }

    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn route_marker_id(&self) -> RouteMarkerId {
        self.route_marker_id
    }

    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn points(&self) -> u32 {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The storage boundary and HTTP clients rely on this exact tagging.
    #[test]
    fn test_question_kind_wire_format() {
        let kind = QuestionKind::MultipleChoice {
            options: vec!["1964".into(), "1972".into()],
        };
        let json = serde_json::to_value(&kind).expect("kind serializes");
        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["options"][1], "1972");

        let tf: QuestionKind =
            serde_json::from_value(serde_json::json!({ "type": "true_false" }))
                .expect("tag round-trips");
        assert_eq!(tf, QuestionKind::TrueFalse);
    }

    #[test]
    fn test_question_fields_are_camel_case() {
        let q = Question::new(
            RouteMarkerId::new(),
            2,
            QuestionKind::TextInput,
            "prompt",
            "answer",
        );
        let json = serde_json::to_value(&q).expect("question serializes");
        assert_eq!(json["orderIndex"], 2);
        assert_eq!(json["correctAnswer"], "answer");
        assert_eq!(json["points"], DEFAULT_QUESTION_POINTS);
    }
}
