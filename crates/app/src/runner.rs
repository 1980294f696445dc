use std::fmt;

use serde::Serialize;

use prep_core::model::{Advance, QuizId, QuizOutcome, QuizResult};
use services::{AppServices, ModuleCard, ProfileSummary, QuizCard, QuizStats, ServiceError};

use crate::script::Command;

#[derive(Debug)]
pub enum RunError {
    Service(ServiceError),
    TooManyAnswers { given: usize, questions: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Service(err) => write!(f, "{err}"),
            RunError::TooManyAnswers { given, questions } => {
                write!(f, "{given} answers given but the quiz has {questions} questions")
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Service(err) => Some(err),
            RunError::TooManyAnswers { .. } => None,
        }
    }
}

impl From<ServiceError> for RunError {
    fn from(err: ServiceError) -> Self {
        RunError::Service(err)
    }
}

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Modules { modules: Vec<ModuleCard> },
    Module { module: ModuleCard },
    Quizzes { stats: QuizStats, quizzes: Vec<QuizCard> },
    Outcome { outcome: QuizOutcome },
    Recorded { result: QuizResult },
    Status { profile: ProfileSummary },
}

/// Drives the services the way the app's screens would.
pub struct Runner {
    services: AppServices,
}

impl Runner {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns `RunError` for unknown ids, bad answers or too many answers.
    pub fn execute(&self, command: Command) -> Result<Report, RunError> {
        let report = match command {
            Command::Modules => Report::Modules {
                modules: self.services.modules().list(),
            },
            Command::Open(id) => Report::Module {
                module: self.services.modules().open(&id)?,
            },
            Command::Complete(id) => Report::Module {
                module: self.services.modules().complete(&id)?,
            },
            Command::Quizzes => {
                let quizzes = self.services.quizzes();
                Report::Quizzes {
                    stats: quizzes.stats(),
                    quizzes: quizzes.list(),
                }
            }
            Command::Take { quiz, answers } => Report::Outcome {
                outcome: self.take(&quiz, &answers)?,
            },
            Command::Record { quiz, score, total } => Report::Recorded {
                result: self.services.quizzes().record(&quiz, score, total)?,
            },
            Command::Status => Report::Status {
                profile: self.services.dashboard().profile(),
            },
        };
        Ok(report)
    }

    /// Answers questions in order; any left over stay unanswered.
    fn take(&self, quiz: &QuizId, answers: &[usize]) -> Result<QuizOutcome, RunError> {
        let quizzes = self.services.quizzes();
        let mut attempt = quizzes.start(quiz)?;
        if answers.len() > attempt.question_count() {
            return Err(RunError::TooManyAnswers {
                given: answers.len(),
                questions: attempt.question_count(),
            });
        }

        for &answer in answers {
            attempt.select_answer(answer).map_err(ServiceError::from)?;
            if attempt.advance().map_err(ServiceError::from)? == Advance::Finished {
                break;
            }
        }
        Ok(quizzes.submit(attempt)?)
    }
}

fn percent_or_dash(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_owned(), |p| format!("{p}%"))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Modules { modules } => {
                for card in modules {
                    writeln!(
                        f,
                        "{:<10} {:<10} quiz {:>4}  {}",
                        card.info.id,
                        format!("{:?}", card.state).to_lowercase(),
                        percent_or_dash(card.quiz_percentage),
                        card.info.description
                    )?;
                }
                Ok(())
            }
            Report::Module { module } => writeln!(
                f,
                "{}: {}",
                module.info.title,
                format!("{:?}", module.state).to_lowercase()
            ),
            Report::Quizzes { stats, quizzes } => {
                writeln!(
                    f,
                    "{}/{} quizzes taken, average {}%",
                    stats.completed, stats.total, stats.average_score
                )?;
                for quiz in quizzes {
                    writeln!(
                        f,
                        "{:<10} {:<8} {} questions, {} min, last {}",
                        quiz.id,
                        format!("{:?}", quiz.difficulty).to_lowercase(),
                        quiz.question_count,
                        quiz.time_limit_minutes,
                        percent_or_dash(quiz.last_percentage)
                    )?;
                }
                Ok(())
            }
            Report::Outcome { outcome } => {
                writeln!(
                    f,
                    "{}: {}/{} ({}%) {}",
                    outcome.quiz_id,
                    outcome.score,
                    outcome.total_questions,
                    outcome.percentage,
                    outcome.band.label()
                )?;
                for review in outcome.review.iter().filter(|r| !r.is_correct) {
                    writeln!(f, "  Q{}: {}", review.index + 1, review.explanation)?;
                }
                Ok(())
            }
            Report::Recorded { result } => writeln!(
                f,
                "{}: recorded {}%",
                result.quiz_id, result.percentage
            ),
            Report::Status { profile } => {
                writeln!(f, "Preparedness: {}%", profile.overall_preparedness)?;
                for category in &profile.categories {
                    writeln!(f, "  {:<18} {:>3}%", category.category.label(), category.score)?;
                }
                writeln!(
                    f,
                    "Achievements: {}/{}",
                    profile.earned_achievements,
                    profile.achievements.len()
                )?;
                for status in profile.achievements.iter().filter(|a| a.earned) {
                    writeln!(f, "  * {}", status.achievement.title())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_line;
    use prep_core::time::test_clock;

    fn run(runner: &Runner, line: &str) -> Result<Report, RunError> {
        runner.execute(parse_line(line).unwrap().unwrap())
    }

    #[test]
    fn scripted_session_matches_dashboard() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        run(&runner, "take earthquake B B B A A").unwrap();
        run(&runner, "complete earthquake").unwrap();
        run(&runner, "open flood").unwrap();

        let Report::Status { profile } = run(&runner, "status").unwrap() else {
            panic!("expected status report");
        };
        assert_eq!(profile.overall_preparedness, 33);
    }

    #[test]
    fn outcome_text_lists_misses() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        let report = run(&runner, "take earthquake B B B A A").unwrap();
        let text = report.to_string();
        assert!(text.starts_with("earthquake: 4/5 (80%) Excellent!"));
        assert!(text.contains("  Q5: "));
    }

    #[test]
    fn partial_answers_leave_the_rest_wrong() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        let Report::Outcome { outcome } = run(&runner, "take fire A").unwrap() else {
            panic!("expected outcome");
        };
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.percentage, 50);
    }

    #[test]
    fn too_many_answers_is_an_error() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        assert!(matches!(
            run(&runner, "take fire A A A").unwrap_err(),
            RunError::TooManyAnswers {
                given: 3,
                questions: 2
            }
        ));
    }

    #[test]
    fn unknown_module_surfaces_service_error() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        let err = run(&runner, "open volcano").unwrap_err();
        assert_eq!(err.to_string(), "unknown module: volcano");
        assert!(matches!(
            err,
            RunError::Service(ServiceError::UnknownModule(ref id)) if id.as_str() == "volcano"
        ));
    }

    #[test]
    fn service_error_stays_reachable_as_source() {
        use std::error::Error as _;

        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        let err = run(&runner, "take volcano A").unwrap_err();
        let source = err.source().and_then(|e| e.downcast_ref::<ServiceError>());
        assert!(matches!(source, Some(ServiceError::UnknownQuiz(_))));
    }

    #[test]
    fn reports_serialize_with_kind_tag() {
        let runner = Runner::new(AppServices::builtin(test_clock()).unwrap());
        let report = run(&runner, "record fire 1 2").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "recorded");
        assert_eq!(json["result"]["percentage"], 50);
    }
}
