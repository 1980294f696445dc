use std::sync::Arc;

use serde::Serialize;

use prep_core::metrics::completion_rate;
use prep_core::model::AchievementStatus;

use crate::progress_store::ProgressStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ModuleCompletion,
    QuizPerformance,
    QuizCompletion,
    OverallReadiness,
}

impl Category {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ModuleCompletion => "Module Completion",
            Self::QuizPerformance => "Quiz Performance",
            Self::QuizCompletion => "Quiz Completion",
            Self::OverallReadiness => "Overall Readiness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u32,
}

/// Presentation-agnostic profile numbers. No formatting happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub revision: u64,
    pub overall_preparedness: u32,
    pub categories: Vec<CategoryScore>,
    pub achievements: Vec<AchievementStatus>,
    pub earned_achievements: usize,
    /// Earned share of all achievements, as a percentage.
    pub achievement_progress: u32,
}

/// Read-only facade for the profile screen.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<ProgressStore>,
}

impl DashboardService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn profile(&self) -> ProfileSummary {
        let snapshot = self.store.snapshot();
        let metrics = snapshot.metrics;
        let earned = snapshot.achievements.iter().filter(|a| a.earned).count();
        let total = u32::try_from(snapshot.achievements.len()).unwrap_or(u32::MAX);

        ProfileSummary {
            revision: snapshot.revision,
            overall_preparedness: metrics.overall_preparedness,
            categories: vec![
                CategoryScore {
                    category: Category::ModuleCompletion,
                    score: metrics.module_completion_rate,
                },
                CategoryScore {
                    category: Category::QuizPerformance,
                    score: metrics.average_quiz_score,
                },
                CategoryScore {
                    category: Category::QuizCompletion,
                    score: metrics.quiz_completion_rate,
                },
                CategoryScore {
                    category: Category::OverallReadiness,
                    score: metrics.overall_preparedness,
                },
            ],
            achievement_progress: completion_rate(earned, total),
            earned_achievements: earned,
            achievements: snapshot.achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{ModuleId, QuizId};

    #[test]
    fn fresh_profile_is_all_zero() {
        let dashboard = DashboardService::new(Arc::new(ProgressStore::default()));
        let profile = dashboard.profile();

        assert_eq!(profile.overall_preparedness, 0);
        assert!(profile.categories.iter().all(|c| c.score == 0));
        assert_eq!(profile.earned_achievements, 0);
        assert_eq!(profile.achievement_progress, 0);
    }

    #[test]
    fn profile_tracks_store() {
        let store = Arc::new(ProgressStore::default());
        let dashboard = DashboardService::new(Arc::clone(&store));

        store.record_quiz_result(QuizId::new("earthquake"), 4, 5);
        store.mark_module_completed(ModuleId::new("earthquake"));

        let profile = dashboard.profile();
        let scores: Vec<u32> = profile.categories.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![13, 80, 13, 33]);
        assert_eq!(profile.overall_preparedness, 33);
        // Quick Learner only.
        assert_eq!(profile.earned_achievements, 1);
        assert_eq!(profile.achievement_progress, 17);
    }
}
