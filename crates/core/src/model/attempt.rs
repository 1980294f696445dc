use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::percentage;
use crate::model::catalog::{Question, QuizDefinition};
use crate::model::ids::QuizId;
use crate::time::{Clock, QuizTimer};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("option {option} is out of range (question has {len} options)")]
    OptionOutOfRange { option: usize, len: usize },

    #[error("question {index} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("question {index} has not been answered")]
    Unanswered { index: usize },
}

//
// ─── SCORE BAND ────────────────────────────────────────────────────────────────
//

/// Coarse feedback shown with a quiz result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    GoodJob,
    KeepLearning,
}

impl ScoreBand {
    #[must_use]
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Self::Excellent,
            60..=79 => Self::GoodJob,
            _ => Self::KeepLearning,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent!",
            Self::GoodJob => "Good Job!",
            Self::KeepLearning => "Keep Learning!",
        }
    }
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// How one question was answered, for the post-quiz review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReview {
    pub index: usize,
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Result of a finished attempt, before it is recorded anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub quiz_id: QuizId,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub band: ScoreBand,
    pub review: Vec<AnswerReview>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// What happened after moving past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Finished,
}

/// One pass through a quiz: the learner picks an option per question, then finishes.
///
/// The attempt owns a copy of the questions so it stays valid on its own.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz_id: QuizId,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    current: usize,
    timer: QuizTimer,
}

impl QuizAttempt {
    /// Starts the quiz's countdown on `clock`.
    #[must_use]
    pub fn new(quiz: &QuizDefinition, clock: &Clock) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            questions: quiz.questions.clone(),
            answers: vec![None; quiz.questions.len()],
            current: 0,
            timer: clock.start_timer(quiz.time_limit()),
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn timer(&self) -> &QuizTimer {
        &self.timer
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Selects an option for the current question, replacing any earlier pick.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::OptionOutOfRange` if the question has no such option,
    /// or `AttemptError::QuestionOutOfRange` if the quiz has no questions.
    pub fn select_answer(&mut self, option: usize) -> Result<(), AttemptError> {
        let Some(question) = self.questions.get(self.current) else {
            return Err(AttemptError::QuestionOutOfRange {
                index: self.current,
                len: self.questions.len(),
            });
        };
        let len = question.options.len();
        if option >= len {
            return Err(AttemptError::OptionOutOfRange { option, len });
        }
        self.answers[self.current] = Some(option);
        Ok(())
    }

    /// Moves to the next question once the current one is answered.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Unanswered` if no option is selected yet.
    pub fn advance(&mut self) -> Result<Advance, AttemptError> {
        if self.questions.is_empty() {
            return Ok(Advance::Finished);
        }
        if self.answers[self.current].is_none() {
            return Err(AttemptError::Unanswered {
                index: self.current,
            });
        }
        if self.is_last_question() {
            return Ok(Advance::Finished);
        }
        self.current += 1;
        Ok(Advance::Next(self.current))
    }

    /// Jumps to a question, e.g. to change an earlier answer.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::QuestionOutOfRange` for an invalid index.
    pub fn go_to(&mut self, index: usize) -> Result<(), AttemptError> {
        if index >= self.questions.len() {
            return Err(AttemptError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Number of selected answers that match the key.
    #[must_use]
    pub fn score(&self) -> u32 {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some_and(|picked| q.is_correct(picked)))
            .count();
        u32::try_from(correct).unwrap_or(u32::MAX)
    }

    /// Scores the attempt. Unanswered questions count as wrong.
    #[must_use]
    pub fn finish(self, finished_at: DateTime<Utc>) -> QuizOutcome {
        let score = self.score();
        let total_questions = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let percentage = percentage(score, total_questions);

        let review = self
            .questions
            .into_iter()
            .zip(self.answers)
            .enumerate()
            .map(|(index, (question, selected))| AnswerReview {
                index,
                selected,
                correct_option: question.correct_option,
                is_correct: selected.is_some_and(|picked| question.is_correct(picked)),
                explanation: question.explanation,
            })
            .collect();

        QuizOutcome {
            quiz_id: self.quiz_id,
            score,
            total_questions,
            percentage,
            band: ScoreBand::for_percentage(percentage),
            review,
            started_at: self.timer.started_at(),
            finished_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
