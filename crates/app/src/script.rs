use std::fmt;

use prep_core::model::{ModuleId, ParseIdError, QuizId};

/// One line of a learner script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Modules,
    Quizzes,
    Status,
    Open(ModuleId),
    Complete(ModuleId),
    Take { quiz: QuizId, answers: Vec<usize> },
    Record { quiz: QuizId, score: u32, total: u32 },
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScriptError {
    UnknownCommand(String),
    MissingArgument { command: &'static str, what: &'static str },
    TrailingArguments { command: &'static str },
    InvalidId(ParseIdError),
    InvalidAnswer(String),
    InvalidNumber(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ScriptError::MissingArgument { command, what } => {
                write!(f, "{command} needs a {what}")
            }
            ScriptError::TrailingArguments { command } => {
                write!(f, "{command} takes no further arguments")
            }
            ScriptError::InvalidId(err) => write!(f, "{err}"),
            ScriptError::InvalidAnswer(raw) => {
                write!(f, "invalid answer {raw:?} (use a letter A-Z or a 1-based number)")
            }
            ScriptError::InvalidNumber(raw) => write!(f, "invalid number: {raw}"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<ParseIdError> for ScriptError {
    fn from(err: ParseIdError) -> Self {
        ScriptError::InvalidId(err)
    }
}

/// `A`/`a` is the first option; `1` is also the first option.
fn parse_answer(raw: &str) -> Result<usize, ScriptError> {
    let invalid = || ScriptError::InvalidAnswer(raw.to_owned());
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
        }
        _ => match raw.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(invalid()),
        },
    }
}

fn parse_number(raw: &str) -> Result<u32, ScriptError> {
    raw.parse()
        .map_err(|_| ScriptError::InvalidNumber(raw.to_owned()))
}

fn next_arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, ScriptError> {
    words
        .next()
        .ok_or(ScriptError::MissingArgument { command, what })
}

fn no_more<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<(), ScriptError> {
    match words.next() {
        Some(_) => Err(ScriptError::TrailingArguments { command }),
        None => Ok(()),
    }
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns `ScriptError` describing the first problem on the line.
pub fn parse_line(line: &str) -> Result<Option<Command>, ScriptError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "modules" => {
            no_more(&mut words, "modules")?;
            Command::Modules
        }
        "quizzes" => {
            no_more(&mut words, "quizzes")?;
            Command::Quizzes
        }
        "status" => {
            no_more(&mut words, "status")?;
            Command::Status
        }
        "open" => {
            let id = next_arg(&mut words, "open", "module id")?.parse()?;
            no_more(&mut words, "open")?;
            Command::Open(id)
        }
        "complete" => {
            let id = next_arg(&mut words, "complete", "module id")?.parse()?;
            no_more(&mut words, "complete")?;
            Command::Complete(id)
        }
        "take" => {
            let quiz = next_arg(&mut words, "take", "quiz id")?.parse()?;
            let answers = words.map(parse_answer).collect::<Result<Vec<_>, _>>()?;
            Command::Take { quiz, answers }
        }
        "record" => {
            let quiz = next_arg(&mut words, "record", "quiz id")?.parse()?;
            let score = parse_number(next_arg(&mut words, "record", "score")?)?;
            let total = parse_number(next_arg(&mut words, "record", "question total")?)?;
            no_more(&mut words, "record")?;
            Command::Record { quiz, score, total }
        }
        _ => return Err(ScriptError::UnknownCommand(head.to_owned())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   # just a note").unwrap(), None);
    }

    #[test]
    fn module_commands() {
        assert_eq!(
            parse_line("open flood").unwrap(),
            Some(Command::Open(ModuleId::new("flood")))
        );
        assert_eq!(
            parse_line("COMPLETE earthquake  # done").unwrap(),
            Some(Command::Complete(ModuleId::new("earthquake")))
        );
    }

    #[test]
    fn take_accepts_letters_and_numbers() {
        let cmd = parse_line("take earthquake B b 2 A c").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Take {
                quiz: QuizId::new("earthquake"),
                answers: vec![1, 1, 1, 0, 2],
            }
        );
    }

    #[test]
    fn record_parses_numbers() {
        assert_eq!(
            parse_line("record fire 1 2").unwrap(),
            Some(Command::Record {
                quiz: QuizId::new("fire"),
                score: 1,
                total: 2,
            })
        );
        assert_eq!(
            parse_line("record fire one 2").unwrap_err(),
            ScriptError::InvalidNumber("one".into())
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(
            parse_line("open").unwrap_err(),
            ScriptError::MissingArgument { command: "open", .. }
        ));
        assert_eq!(
            parse_line("status now").unwrap_err(),
            ScriptError::TrailingArguments { command: "status" }
        );
        assert_eq!(
            parse_line("take fire 0").unwrap_err(),
            ScriptError::InvalidAnswer("0".into())
        );
        assert_eq!(
            parse_line("dance").unwrap_err(),
            ScriptError::UnknownCommand("dance".into())
        );
    }
}
