//! Answer grading.
//!
//! Normalized exact string equality: no partial credit, no fuzzy matching.
//! Multiple-choice and true/false grade identically to text input; the UI
//! constrains the input domain, not the grader.

use serde::{Deserialize, Serialize};

use crate::entities::Question;

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub is_correct: bool,
    pub points_earned: u32,
}

/// Grade a raw submission against the question's canonical answer.
pub fn grade(question: &Question, raw_answer: &str) -> GradedAnswer {
    let is_correct = normalize(raw_answer) == normalize(question.correct_answer());
    GradedAnswer {
        is_correct,
        points_earned: if is_correct { question.points() } else { 0 },
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::QuestionKind;
    use crate::RouteMarkerId;

    fn question(answer: &str) -> Question {
        Question::new(
            RouteMarkerId::new(),
            0,
            QuestionKind::TextInput,
            "prompt",
            answer,
        )
    }

    #[test]
    fn test_whitespace_and_case_are_normalized() {
        let q = question("Singapore");
        let graded = grade(&q, "  singapore  ");
        assert!(graded.is_correct);
        assert_eq!(graded.points_earned, 10);
    }

    #[test]
    fn test_true_false_grades_by_string_equality() {
        let q = Question::new(
            RouteMarkerId::new(),
            0,
            QuestionKind::TrueFalse,
            "prompt",
            "true",
        );
        assert!(grade(&q, "True").is_correct);
        assert!(!grade(&q, "false").is_correct);
    }

    #[test]
    fn test_wrong_answer_earns_nothing() {
        let q = question("A");
        let graded = grade(&q, "B");
        assert!(!graded.is_correct);
        assert_eq!(graded.points_earned, 0);
    }

    #[test]
    fn test_no_partial_credit() {
        let q = question("Raffles Hotel");
        assert!(!grade(&q, "Raffles").is_correct);
    }

    #[test]
    fn test_custom_points_are_awarded() {
        let q = question("yes").with_points(25);
        assert_eq!(grade(&q, "YES ").points_earned, 25);
    }
}
