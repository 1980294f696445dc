use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::debug;

use prep_core::model::{
    AchievementStatus, ModuleId, ModuleProgress, ModuleState, ProgressState, QuizId, QuizResult,
    evaluate_achievements,
};
use prep_core::{ProgressMetrics, ScoringPolicy};

/// Everything a read-only view needs, captured under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub revision: u64,
    pub quiz_results: HashMap<QuizId, QuizResult>,
    pub module_progress: HashMap<ModuleId, ModuleProgress>,
    pub metrics: ProgressMetrics,
    pub achievements: Vec<AchievementStatus>,
}

/// Session-lifetime owner of quiz results and module progress.
///
/// Build one per app and share it as `Arc<ProgressStore>`; every view sees a
/// mutation on its very next read. Derived numbers are recomputed on each call.
/// No operation can fail: a poisoned lock is recovered as-is.
#[derive(Debug, Default)]
pub struct ProgressStore {
    policy: ScoringPolicy,
    state: RwLock<ProgressState>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(ProgressState::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProgressState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgressState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    //
    // ─── MUTATIONS ─────────────────────────────────────────────────────────────
    //

    /// Stores the latest result for `quiz_id`, replacing any earlier attempt.
    ///
    /// `score` is clamped to `total_questions`; `total_questions == 0` records 0%.
    pub fn record_quiz_result(&self, quiz_id: QuizId, score: u32, total_questions: u32) -> QuizResult {
        let result = self
            .write()
            .record_quiz_result(quiz_id, score, total_questions);
        debug!(
            quiz_id = %result.quiz_id,
            score = result.score,
            total_questions,
            percentage = result.percentage,
            "quiz result recorded"
        );
        result
    }

    pub fn mark_module_viewed(&self, module_id: ModuleId) -> ModuleState {
        let id = module_id.to_string();
        let state = self.write().mark_module_viewed(module_id);
        debug!(module_id = %id, ?state, "module viewed");
        state
    }

    pub fn mark_module_completed(&self, module_id: ModuleId) -> ModuleState {
        let id = module_id.to_string();
        let state = self.write().mark_module_completed(module_id);
        debug!(module_id = %id, ?state, "module completed");
        state
    }

    //
    // ─── DERIVED METRICS ───────────────────────────────────────────────────────
    //

    /// All derived numbers from one consistent read.
    #[must_use]
    pub fn metrics(&self) -> ProgressMetrics {
        ProgressMetrics::compute(&self.read(), &self.policy)
    }

    #[must_use]
    pub fn module_completion_rate(&self) -> u32 {
        self.metrics().module_completion_rate
    }

    #[must_use]
    pub fn quiz_completion_rate(&self) -> u32 {
        self.metrics().quiz_completion_rate
    }

    /// Rounded mean percentage over completed quizzes; `0` when there are none.
    #[must_use]
    pub fn average_quiz_score(&self) -> u32 {
        self.metrics().average_quiz_score
    }

    /// Weighted preparedness score, never above 100.
    #[must_use]
    pub fn overall_preparedness(&self) -> u32 {
        self.metrics().overall_preparedness
    }

    #[must_use]
    pub fn achievements(&self) -> Vec<AchievementStatus> {
        let state = self.read();
        let metrics = ProgressMetrics::compute(&state, &self.policy);
        evaluate_achievements(&state, metrics.overall_preparedness, &self.policy)
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn quiz_results(&self) -> HashMap<QuizId, QuizResult> {
        self.read().quiz_results().clone()
    }

    #[must_use]
    pub fn module_progress(&self) -> HashMap<ModuleId, ModuleProgress> {
        self.read().module_progress().clone()
    }

    #[must_use]
    pub fn completed_quiz_count(&self) -> usize {
        self.read().completed_quiz_count()
    }

    #[must_use]
    pub fn quiz_result(&self, quiz_id: &QuizId) -> Option<QuizResult> {
        self.read().quiz_result(quiz_id).cloned()
    }

    #[must_use]
    pub fn module_state(&self, module_id: &ModuleId) -> ModuleState {
        self.read().module_state(module_id)
    }

    /// Changes on every mutation; cheap way for a view to know it is stale.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.read().revision()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.read();
        let metrics = ProgressMetrics::compute(&state, &self.policy);
        ProgressSnapshot {
            revision: state.revision(),
            quiz_results: state.quiz_results().clone(),
            module_progress: state.module_progress().clone(),
            metrics,
            achievements: evaluate_achievements(&state, metrics.overall_preparedness, &self.policy),
        }
    }
}
