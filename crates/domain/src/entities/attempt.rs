//! Question attempts - append-only grading history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AttemptId, ProgressId, QuestionId, UserId};

/// One graded submission for a question.
///
/// Attempts are append-only and never mutated; a user may attempt the same
/// question any number of times. How repeat correct attempts score is the
/// scoring policy's decision, not this record's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    id: AttemptId,
    user_id: UserId,
    question_id: QuestionId,
    progress_id: ProgressId,
    /// Raw submission, preserved unnormalized.
    user_answer: String,
    is_correct: bool,
    points_earned: u32,
    attempted_at: DateTime<Utc>,
}

impl QuestionAttempt {
    pub fn new(
        user_id: UserId,
        question_id: QuestionId,
        progress_id: ProgressId,
        user_answer: impl Into<String>,
        is_correct: bool,
        points_earned: u32,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            user_id,
            question_id,
            progress_id,
            user_answer: user_answer.into(),
            is_correct,
            points_earned,
            attempted_at,
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    pub fn progress_id(&self) -> ProgressId {
        self.progress_id
    }

    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    pub fn attempted_at(&self) -> DateTime<Utc> {
        self.attempted_at
    }
}
