use std::collections::HashSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ModuleId, QuizId};

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("catalog contains an empty {kind} id")]
    EmptyId { kind: &'static str },

    #[error("duplicate module id: {0}")]
    DuplicateModule(ModuleId),

    #[error("duplicate quiz id: {0}")]
    DuplicateQuiz(QuizId),

    #[error("quiz {quiz} question {index} needs at least two options")]
    TooFewOptions { quiz: QuizId, index: usize },

    #[error("quiz {quiz} question {index} marks option {option} correct but has {len} options")]
    CorrectOptionOutOfRange {
        quiz: QuizId,
        index: usize,
        option: usize,
        len: usize,
    },
}

//
// ─── ENTRIES ───────────────────────────────────────────────────────────────────
//

/// One educational module about a disaster type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: String,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        self.correct_option == option
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub id: QuizId,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub time_limit_minutes: u32,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    #[must_use]
    pub fn question_count(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.time_limit_minutes))
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The modules and quizzes a learner can work through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    modules: Vec<ModuleInfo>,
    quizzes: Vec<QuizDefinition>,
}

impl Catalog {
    /// Builds a catalog from already-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if ids are blank or repeated, or if a question
    /// has fewer than two options or an out-of-range correct option.
    pub fn new(modules: Vec<ModuleInfo>, quizzes: Vec<QuizDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { modules, quizzes };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses and validates a JSON catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` for invalid JSON and the other
    /// variants for entries that fail validation.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The eight disaster modules and quizzes shipped with the app.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded asset is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut module_ids = HashSet::new();
        for module in &self.modules {
            if module.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId { kind: "module" });
            }
            if !module_ids.insert(&module.id) {
                return Err(CatalogError::DuplicateModule(module.id.clone()));
            }
        }

        let mut quiz_ids = HashSet::new();
        for quiz in &self.quizzes {
            if quiz.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId { kind: "quiz" });
            }
            if !quiz_ids.insert(&quiz.id) {
                return Err(CatalogError::DuplicateQuiz(quiz.id.clone()));
            }
            for (index, question) in quiz.questions.iter().enumerate() {
                let len = question.options.len();
                if len < 2 {
                    return Err(CatalogError::TooFewOptions {
                        quiz: quiz.id.clone(),
                        index,
                    });
                }
                if question.correct_option >= len {
                    return Err(CatalogError::CorrectOptionOutOfRange {
                        quiz: quiz.id.clone(),
                        index,
                        option: question.correct_option,
                        len,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    #[must_use]
    pub fn quizzes(&self) -> &[QuizDefinition] {
        &self.quizzes
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| &m.id == id)
    }

    #[must_use]
    pub fn quiz(&self, id: &QuizId) -> Option<&QuizDefinition> {
        self.quizzes.iter().find(|q| &q.id == id)
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_eight_of_each() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.module_count(), 8);
        assert_eq!(catalog.quiz_count(), 8);

        let quake = catalog.quiz(&QuizId::new("earthquake")).unwrap();
        assert_eq!(quake.question_count(), 5);
        assert_eq!(quake.difficulty, Difficulty::Medium);
        assert_eq!(quake.time_limit(), Duration::minutes(10));
    }

    #[test]
    fn every_builtin_module_has_a_quiz() {
        let catalog = Catalog::builtin().unwrap();
        for module in catalog.modules() {
            assert!(
                catalog.quiz(&QuizId::for_module(&module.id)).is_some(),
                "no quiz for {}",
                module.id
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::builtin().unwrap();
        let flood = catalog.module(&ModuleId::new("flood")).unwrap();
        assert_eq!(flood.title, "Flood");
        assert!(catalog.module(&ModuleId::new("volcano")).is_none());
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let raw = r#"{
            "modules": [
                {"id": "flood", "title": "Flood", "description": ""},
                {"id": "flood", "title": "Flood again", "description": ""}
            ],
            "quizzes": []
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateModule(id) if id.as_str() == "flood"));
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let raw = r#"{
            "modules": [],
            "quizzes": [{
                "id": "fire", "title": "Fire", "category": "Emergency Response",
                "difficulty": "easy", "time_limit_minutes": 6,
                "questions": [{
                    "prompt": "?", "options": ["a", "b"],
                    "correct_option": 2, "explanation": ""
                }]
            }]
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CorrectOptionOutOfRange { option: 2, len: 2, .. }
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn quiz_without_questions_is_allowed() {
        let quiz = QuizDefinition {
            id: QuizId::new("drill"),
            title: "Drill".into(),
            category: "Practice".into(),
            difficulty: Difficulty::Easy,
            time_limit_minutes: 1,
            questions: Vec::new(),
        };
        let catalog = Catalog::new(Vec::new(), vec![quiz]).unwrap();
        assert_eq!(catalog.quizzes()[0].question_count(), 0);
    }
}
