use std::fmt;
use std::path::PathBuf;

use prep_core::model::Catalog;
use prep_core::metrics::WeightsError;
use prep_core::{PreparednessWeights, ScoringPolicy};

pub const ENV_CATALOG: &str = "PREP_CATALOG";
pub const ENV_TOTAL_MODULES: &str = "PREP_TOTAL_MODULES";
pub const ENV_TOTAL_QUIZZES: &str = "PREP_TOTAL_QUIZZES";
pub const ENV_WEIGHTS: &str = "PREP_WEIGHTS";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { source: &'static str, raw: String },
    InvalidWeights { source: &'static str, err: prep_core::Error },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { source, raw } => {
                write!(f, "invalid {source} value: {raw}")
            }
            ArgsError::InvalidWeights { source, err } => write!(f, "invalid {source}: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runtime settings: defaults, then environment, then flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub catalog_path: Option<PathBuf>,
    pub total_modules: Option<u32>,
    pub total_quizzes: Option<u32>,
    pub weights: Option<PreparednessWeights>,
    pub format: OutputFormat,
    pub script_path: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Config),
    Help,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_count(source: &'static str, raw: &str) -> Result<u32, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidCount {
        source,
        raw: raw.to_owned(),
    })
}

fn parse_weights(source: &'static str, raw: &str) -> Result<PreparednessWeights, ArgsError> {
    raw.parse().map_err(|err: WeightsError| ArgsError::InvalidWeights {
        source,
        err: err.into(),
    })
}

impl Config {
    /// Resolves settings from an environment lookup and the argument list (without argv[0]).
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags, missing values, non-numeric counts
    /// or weights that do not add up to 100.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Parsed, ArgsError> {
        let mut config = Config {
            catalog_path: env(ENV_CATALOG)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            total_modules: env(ENV_TOTAL_MODULES)
                .map(|raw| parse_count(ENV_TOTAL_MODULES, &raw))
                .transpose()?,
            total_quizzes: env(ENV_TOTAL_QUIZZES)
                .map(|raw| parse_count(ENV_TOTAL_QUIZZES, &raw))
                .transpose()?,
            weights: env(ENV_WEIGHTS)
                .map(|raw| parse_weights(ENV_WEIGHTS, &raw))
                .transpose()?,
            ..Config::default()
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => {
                    config.catalog_path = Some(PathBuf::from(require_value(&mut args, "--catalog")?));
                }
                "--total-modules" => {
                    let raw = require_value(&mut args, "--total-modules")?;
                    config.total_modules = Some(parse_count("--total-modules", &raw)?);
                }
                "--total-quizzes" => {
                    let raw = require_value(&mut args, "--total-quizzes")?;
                    config.total_quizzes = Some(parse_count("--total-quizzes", &raw)?);
                }
                "--weights" => {
                    let raw = require_value(&mut args, "--weights")?;
                    config.weights = Some(parse_weights("--weights", &raw)?);
                }
                "--script" => {
                    config.script_path = Some(PathBuf::from(require_value(&mut args, "--script")?));
                }
                "--json" => config.format = OutputFormat::Json,
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(config))
    }

    /// Loads the configured catalog, or the embedded one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or the catalog error if it is invalid.
    pub fn load_catalog(&self) -> Result<Catalog, Box<dyn std::error::Error>> {
        match &self.catalog_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(Catalog::from_json(&raw).map_err(prep_core::Error::from)?)
            }
            None => Ok(Catalog::builtin().map_err(prep_core::Error::from)?),
        }
    }

    /// Catalog-derived denominators and the default 40/30/30 weights, unless overridden.
    #[must_use]
    pub fn policy(&self, catalog: &Catalog) -> ScoringPolicy {
        let derived = ScoringPolicy::for_catalog(catalog);
        ScoringPolicy::new(
            self.total_modules.unwrap_or(derived.total_modules),
            self.total_quizzes.unwrap_or(derived.total_quizzes),
            self.weights.unwrap_or_default(),
        )
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  prep [--script <path>] [--catalog <path>] [--total-modules <n>] [--total-quizzes <n>] [--weights <m,q,s>] [--json]");
    eprintln!();
    eprintln!("Reads commands from --script or stdin, one per line:");
    eprintln!("  modules | quizzes | status");
    eprintln!("  open <module> | complete <module>");
    eprintln!("  take <quiz> <A|B|C|D ...> | record <quiz> <score> <total>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {ENV_CATALOG}, {ENV_TOTAL_MODULES}, {ENV_TOTAL_QUIZZES}, {ENV_WEIGHTS}, RUST_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_input() {
        let parsed = Config::resolve(no_env, Vec::new()).unwrap();
        assert_eq!(parsed, Parsed::Run(Config::default()));
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            ENV_TOTAL_MODULES => Some("10".to_owned()),
            ENV_TOTAL_QUIZZES => Some("6".to_owned()),
            _ => None,
        };
        let Parsed::Run(config) =
            Config::resolve(env, args(&["--total-modules", "12", "--json"])).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(config.total_modules, Some(12));
        assert_eq!(config.total_quizzes, Some(6));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = Config::resolve(no_env, args(&["--total-quizzes", "many"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid --total-quizzes value: many");

        let err = Config::resolve(no_env, args(&["--catalog"])).unwrap_err();
        assert_eq!(err.to_string(), "--catalog requires a value");

        assert!(matches!(
            Config::resolve(no_env, args(&["--verbose"])),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(
            Config::resolve(no_env, args(&["--help", "--bogus"])).unwrap(),
            Parsed::Help
        );
    }

    #[test]
    fn policy_uses_catalog_unless_overridden() {
        let catalog = Catalog::builtin().unwrap();
        let config = Config {
            total_quizzes: Some(10),
            ..Config::default()
        };
        let policy = config.policy(&catalog);
        assert_eq!(policy.total_modules, 8);
        assert_eq!(policy.total_quizzes, 10);
    }

    #[test]
    fn weights_come_from_env_then_flag() {
        let env = |key: &str| (key == ENV_WEIGHTS).then(|| "50,25,25".to_owned());
        let Parsed::Run(config) = Config::resolve(env, Vec::new()).unwrap() else {
            panic!("expected run");
        };
        let policy = config.policy(&Catalog::builtin().unwrap());
        assert_eq!(policy.weights.modules(), 50);
        assert_eq!(policy.weights.quiz_score(), 25);

        let Parsed::Run(config) = Config::resolve(env, args(&["--weights", "20,40,40"])).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(config.weights.map(|w| w.quiz_completion()), Some(40));
    }

    #[test]
    fn default_weights_without_override() {
        let policy = Config::default().policy(&Catalog::builtin().unwrap());
        assert_eq!(policy.weights, PreparednessWeights::default());
    }

    #[test]
    fn weights_that_miss_one_hundred_are_rejected() {
        let err = Config::resolve(no_env, args(&["--weights", "50,50,10"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid --weights: preparedness weights must sum to 100, got 110"
        );

        let env = |key: &str| (key == ENV_WEIGHTS).then(|| "40;30;30".to_owned());
        assert!(matches!(
            Config::resolve(env, Vec::new()),
            Err(ArgsError::InvalidWeights {
                source: ENV_WEIGHTS,
                ..
            })
        ));
    }
}
