use serde::{Deserialize, Serialize};

use crate::metrics::ScoringPolicy;
use crate::model::progress::ProgressState;

/// Milestones shown on the profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    QuickLearner,
    PreparednessPro,
    QuizMaster,
    HighAchiever,
    KnowledgeExpert,
    PerfectScore,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::QuickLearner,
        Achievement::PreparednessPro,
        Achievement::QuizMaster,
        Achievement::HighAchiever,
        Achievement::KnowledgeExpert,
        Achievement::PerfectScore,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::QuickLearner => "Quick Learner",
            Self::PreparednessPro => "Preparedness Pro",
            Self::QuizMaster => "Quiz Master",
            Self::HighAchiever => "High Achiever",
            Self::KnowledgeExpert => "Knowledge Expert",
            Self::PerfectScore => "Perfect Score",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::QuickLearner => "Completed your first disaster module",
            Self::PreparednessPro => "Achieved 80%+ readiness score",
            Self::QuizMaster => "Completed 5+ disaster quizzes",
            Self::HighAchiever => "Scored 90%+ on any quiz",
            Self::KnowledgeExpert => "Completed all disaster modules",
            Self::PerfectScore => "Achieved 100% on any quiz",
        }
    }

    fn is_earned(self, state: &ProgressState, overall: u32, policy: &ScoringPolicy) -> bool {
        let completed_modules = state.completed_module_count();
        let mut percentages = state.quiz_results().values().map(|q| q.percentage);
        match self {
            Self::QuickLearner => completed_modules > 0,
            Self::PreparednessPro => overall >= 80,
            Self::QuizMaster => state.quiz_results().len() >= 5,
            Self::HighAchiever => percentages.any(|p| p >= 90),
            Self::KnowledgeExpert => {
                policy.total_modules > 0
                    && u64::try_from(completed_modules).unwrap_or(u64::MAX)
                        >= u64::from(policy.total_modules)
            }
            Self::PerfectScore => percentages.any(|p| p == 100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub achievement: Achievement,
    pub earned: bool,
}

/// Evaluates every achievement, in display order.
///
/// `overall` is the preparedness score already derived from `state`.
#[must_use]
pub fn evaluate_achievements(
    state: &ProgressState,
    overall: u32,
    policy: &ScoringPolicy,
) -> Vec<AchievementStatus> {
    Achievement::ALL
        .into_iter()
        .map(|achievement| AchievementStatus {
            achievement,
            earned: achievement.is_earned(state, overall, policy),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleId, QuizId};

    fn earned(statuses: &[AchievementStatus]) -> Vec<Achievement> {
        statuses
            .iter()
            .filter(|s| s.earned)
            .map(|s| s.achievement)
            .collect()
    }

    #[test]
    fn nothing_is_earned_at_start() {
        let state = ProgressState::new();
        let statuses = evaluate_achievements(&state, 0, &ScoringPolicy::default());
        assert_eq!(statuses.len(), 6);
        assert!(earned(&statuses).is_empty());
    }

    #[test]
    fn first_module_and_high_score() {
        let mut state = ProgressState::new();
        state.mark_module_completed(ModuleId::new("fire"));
        state.record_quiz_result(QuizId::new("fire"), 2, 2);

        let statuses = evaluate_achievements(&state, 30, &ScoringPolicy::default());
        assert_eq!(
            earned(&statuses),
            vec![
                Achievement::QuickLearner,
                Achievement::HighAchiever,
                Achievement::PerfectScore
            ]
        );
    }

    #[test]
    fn quiz_master_needs_five_results() {
        let mut state = ProgressState::new();
        for id in ["a", "b", "c", "d"] {
            state.record_quiz_result(QuizId::new(id), 1, 2);
        }
        let policy = ScoringPolicy::default();
        assert!(!earned(&evaluate_achievements(&state, 0, &policy)).contains(&Achievement::QuizMaster));

        state.record_quiz_result(QuizId::new("e"), 1, 2);
        assert!(earned(&evaluate_achievements(&state, 0, &policy)).contains(&Achievement::QuizMaster));
    }

    #[test]
    fn knowledge_expert_follows_policy_total() {
        let mut state = ProgressState::new();
        state.mark_module_completed(ModuleId::new("flood"));
        state.mark_module_completed(ModuleId::new("fire"));

        let mut policy = ScoringPolicy::default();
        policy.total_modules = 2;
        assert!(earned(&evaluate_achievements(&state, 0, &policy)).contains(&Achievement::KnowledgeExpert));

        policy.total_modules = 0;
        assert!(!earned(&evaluate_achievements(&state, 0, &policy)).contains(&Achievement::KnowledgeExpert));
    }

    #[test]
    fn preparedness_pro_at_eighty() {
        let state = ProgressState::new();
        let policy = ScoringPolicy::default();
        assert!(earned(&evaluate_achievements(&state, 80, &policy)).contains(&Achievement::PreparednessPro));
        assert!(!earned(&evaluate_achievements(&state, 79, &policy)).contains(&Achievement::PreparednessPro));
    }
}
