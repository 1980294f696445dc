use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::metrics::percentage;
use crate::model::ids::{ModuleId, QuizId};

//
// ─── QUIZ RESULT ───────────────────────────────────────────────────────────────
//

/// Latest recorded outcome of a quiz. Only finished attempts are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: QuizId,
    pub score: u32,
    pub percentage: u32,
    pub completed: bool,
}

impl QuizResult {
    /// Builds a finished result.
    ///
    /// `score` is clamped to `total_questions`; an empty quiz scores zero.
    #[must_use]
    pub fn finished(quiz_id: QuizId, score: u32, total_questions: u32) -> Self {
        let score = score.min(total_questions);
        Self {
            quiz_id,
            score,
            percentage: percentage(score, total_questions),
            completed: true,
        }
    }
}

//
// ─── MODULE PROGRESS ───────────────────────────────────────────────────────────
//

/// Where a module sits in the unseen → viewed → completed lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Unseen,
    Viewed,
    Completed,
}

/// Per-module record. `completed` implies `viewed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub viewed: bool,
    pub completed: bool,
}

impl ModuleProgress {
    #[must_use]
    pub fn state(&self) -> ModuleState {
        if self.completed {
            ModuleState::Completed
        } else if self.viewed {
            ModuleState::Viewed
        } else {
            ModuleState::Unseen
        }
    }
}

//
// ─── PROGRESS STATE ────────────────────────────────────────────────────────────
//

/// Quiz results and module progress for one session.
///
/// Both maps are last-write-wins per id. `revision` increases on every
/// mutation so readers can tell whether anything changed since their last look.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    quiz_results: HashMap<QuizId, QuizResult>,
    module_progress: HashMap<ModuleId, ModuleProgress>,
    revision: u64,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier result for `quiz_id` and returns the stored one.
    pub fn record_quiz_result(
        &mut self,
        quiz_id: QuizId,
        score: u32,
        total_questions: u32,
    ) -> QuizResult {
        let result = QuizResult::finished(quiz_id.clone(), score, total_questions);
        self.quiz_results.insert(quiz_id, result.clone());
        self.bump();
        result
    }

    /// Sets `viewed`, keeping whatever `completed` was.
    pub fn mark_module_viewed(&mut self, module_id: ModuleId) -> ModuleState {
        let entry = self
            .module_progress
            .entry(module_id.clone())
            .or_insert_with(|| ModuleProgress {
                module_id,
                viewed: false,
                completed: false,
            });
        entry.viewed = true;
        let state = entry.state();
        self.bump();
        state
    }

    /// Sets both `viewed` and `completed`, whatever the prior state.
    pub fn mark_module_completed(&mut self, module_id: ModuleId) -> ModuleState {
        self.module_progress.insert(
            module_id.clone(),
            ModuleProgress {
                module_id,
                viewed: true,
                completed: true,
            },
        );
        self.bump();
        ModuleState::Completed
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn quiz_results(&self) -> &HashMap<QuizId, QuizResult> {
        &self.quiz_results
    }

    #[must_use]
    pub fn module_progress(&self) -> &HashMap<ModuleId, ModuleProgress> {
        &self.module_progress
    }

    #[must_use]
    pub fn quiz_result(&self, quiz_id: &QuizId) -> Option<&QuizResult> {
        self.quiz_results.get(quiz_id)
    }

    #[must_use]
    pub fn module_state(&self, module_id: &ModuleId) -> ModuleState {
        self.module_progress
            .get(module_id)
            .map_or(ModuleState::Unseen, ModuleProgress::state)
    }

    #[must_use]
    pub fn completed_module_count(&self) -> usize {
        self.module_progress.values().filter(|m| m.completed).count()
    }

    #[must_use]
    pub fn completed_quiz_count(&self) -> usize {
        self.quiz_results.values().filter(|q| q.completed).count()
    }

    /// Percentages of every completed quiz, in no particular order.
    #[must_use]
    pub fn quiz_percentages(&self) -> Vec<u32> {
        self.quiz_results
            .values()
            .filter(|q| q.completed)
            .map(|q| q.percentage)
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
