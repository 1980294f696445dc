mod achievement;
mod attempt;
mod catalog;
mod ids;
mod progress;

pub use achievement::{Achievement, AchievementStatus, evaluate_achievements};
pub use attempt::{Advance, AnswerReview, AttemptError, QuizAttempt, QuizOutcome, ScoreBand};
pub use catalog::{Catalog, CatalogError, Difficulty, ModuleInfo, Question, QuizDefinition};
pub use ids::{ModuleId, ParseIdError, QuizId};
pub use progress::{ModuleProgress, ModuleState, ProgressState, QuizResult};
