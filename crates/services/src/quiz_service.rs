use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use prep_core::Clock;
use prep_core::model::{Catalog, Difficulty, QuizAttempt, QuizId, QuizOutcome, QuizResult};

use crate::error::ServiceError;
use crate::progress_store::ProgressStore;

/// A quiz as the quiz list shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizCard {
    pub id: QuizId,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub time_limit_minutes: u32,
    pub last_percentage: Option<u32>,
}

/// Header numbers for the quiz list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizStats {
    pub completed: usize,
    pub total: usize,
    pub average_score: u32,
}

/// Quiz-taking flow. Attempts are scored locally and recorded once on submit.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    catalog: Arc<Catalog>,
    store: Arc<ProgressStore>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, store: Arc<ProgressStore>) -> Self {
        Self {
            clock,
            catalog,
            store,
        }
    }

    /// Every catalog quiz with its latest result, in catalog order.
    #[must_use]
    pub fn list(&self) -> Vec<QuizCard> {
        self.catalog
            .quizzes()
            .iter()
            .map(|quiz| QuizCard {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                category: quiz.category.clone(),
                difficulty: quiz.difficulty,
                question_count: quiz.question_count(),
                time_limit_minutes: quiz.time_limit_minutes,
                last_percentage: self.store.quiz_result(&quiz.id).map(|r| r.percentage),
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> QuizStats {
        QuizStats {
            completed: self.store.completed_quiz_count(),
            total: self.catalog.quiz_count(),
            average_score: self.store.average_quiz_score(),
        }
    }

    /// Starts a fresh attempt; the clock starts now.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownQuiz` if the catalog has no such quiz.
    pub fn start(&self, quiz_id: &QuizId) -> Result<QuizAttempt, ServiceError> {
        let quiz = self
            .catalog
            .quiz(quiz_id)
            .ok_or_else(|| ServiceError::UnknownQuiz(quiz_id.clone()))?;
        Ok(QuizAttempt::new(quiz, &self.clock))
    }

    /// Scores a finished attempt and records it, replacing any earlier result.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownQuiz` if the quiz left the catalog.
    pub fn submit(&self, attempt: QuizAttempt) -> Result<QuizOutcome, ServiceError> {
        if self.catalog.quiz(attempt.quiz_id()).is_none() {
            return Err(ServiceError::UnknownQuiz(attempt.quiz_id().clone()));
        }
        let now = self.clock.now();
        let expired = attempt.timer().is_expired(now);
        let outcome = attempt.finish(now);
        self.store.record_quiz_result(
            outcome.quiz_id.clone(),
            outcome.score,
            outcome.total_questions,
        );
        info!(
            quiz_id = %outcome.quiz_id,
            score = outcome.score,
            total = outcome.total_questions,
            expired,
            "quiz submitted"
        );
        Ok(outcome)
    }

    /// Records a result scored elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownQuiz` if the catalog has no such quiz.
    pub fn record(
        &self,
        quiz_id: &QuizId,
        score: u32,
        total_questions: u32,
    ) -> Result<QuizResult, ServiceError> {
        let quiz = self
            .catalog
            .quiz(quiz_id)
            .ok_or_else(|| ServiceError::UnknownQuiz(quiz_id.clone()))?;
        Ok(self
            .store
            .record_quiz_result(quiz.id.clone(), score, total_questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use prep_core::ScoringPolicy;
    use prep_core::model::ScoreBand;
    use prep_core::time::test_clock;

    fn service(clock: Clock) -> (QuizService, Arc<ProgressStore>) {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let store = Arc::new(ProgressStore::new(ScoringPolicy::for_catalog(&catalog)));
        (QuizService::new(clock, catalog, Arc::clone(&store)), store)
    }

    #[test]
    fn submit_records_outcome_once() {
        let (quizzes, store) = service(test_clock());
        let mut attempt = quizzes.start(&QuizId::new("flood")).unwrap();
        // Key is B, C, B.
        for pick in [1, 2, 0] {
            attempt.select_answer(pick).unwrap();
            attempt.advance().unwrap();
        }

        let outcome = quizzes.submit(attempt).unwrap();
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.percentage, 67);
        assert_eq!(outcome.band, ScoreBand::GoodJob);
        assert_eq!(store.revision(), 1);
        assert_eq!(store.quiz_result(&QuizId::new("flood")).unwrap().percentage, 67);
    }

    #[test]
    fn expired_attempt_still_counts() {
        let mut clock = test_clock();
        let (quizzes, _) = service(clock);
        let attempt = quizzes.start(&QuizId::new("fire")).unwrap();

        clock.advance(Duration::minutes(7));
        let late = QuizService::new(clock, Arc::clone(&quizzes.catalog), Arc::clone(&quizzes.store));
        assert!(attempt.timer().is_expired(clock.now()));
        let outcome = late.submit(attempt).unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(late.stats().completed, 1);
    }

    #[test]
    fn list_reflects_latest_result() {
        let (quizzes, _) = service(test_clock());
        quizzes.record(&QuizId::new("avalanche"), 3, 4).unwrap();

        let cards = quizzes.list();
        assert_eq!(cards.len(), 8);
        let avalanche = cards.iter().find(|c| c.id.as_str() == "avalanche").unwrap();
        assert_eq!(avalanche.last_percentage, Some(75));
        assert_eq!(avalanche.difficulty, Difficulty::Hard);
        assert!(cards.iter().filter(|c| c.last_percentage.is_none()).count() == 7);
    }

    #[test]
    fn stats_average_completed_quizzes() {
        let (quizzes, _) = service(test_clock());
        quizzes.record(&QuizId::new("earthquake"), 4, 5).unwrap();
        quizzes.record(&QuizId::new("fire"), 2, 2).unwrap();

        let stats = quizzes.stats();
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.average_score, 90);
    }

    #[test]
    fn unknown_quiz_is_rejected() {
        let (quizzes, store) = service(test_clock());
        assert!(matches!(
            quizzes.start(&QuizId::new("volcano")),
            Err(ServiceError::UnknownQuiz(_))
        ));
        assert!(quizzes.record(&QuizId::new("volcano"), 1, 1).is_err());
        assert!(store.quiz_results().is_empty());
    }
}
