use std::io::{self, BufRead, BufReader, Write};

use services::{AppServices, Clock};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod runner;
mod script;

use config::{Config, OutputFormat, Parsed, print_usage};
use runner::Runner;
use script::parse_line;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout stays parseable in --json mode.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_script(config: &Config) -> io::Result<Box<dyn BufRead>> {
    match &config.script_path {
        Some(path) => Ok(Box::new(BufReader::new(std::fs::File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::resolve(|key| std::env::var(key).ok(), std::env::args().skip(1))
        .inspect_err(|_| print_usage())?
    {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(config) => config,
    };

    let catalog = config.load_catalog()?;
    let policy = config.policy(&catalog);
    info!(
        modules = catalog.module_count(),
        quizzes = catalog.quiz_count(),
        total_modules = policy.total_modules,
        total_quizzes = policy.total_quizzes,
        module_weight = policy.weights.modules(),
        quiz_completion_weight = policy.weights.quiz_completion(),
        quiz_score_weight = policy.weights.quiz_score(),
        "catalog loaded"
    );

    let runner = Runner::new(AppServices::new(catalog, policy, Clock::system()));
    let input = open_script(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let Some(command) = parse_line(&line).map_err(|e| format!("line {line_no}: {e}"))? else {
            continue;
        };
        debug!(line = line_no, ?command, "executing");
        let report = runner
            .execute(command)
            .map_err(|e| format!("line {line_no}: {e}"))?;

        match config.format {
            OutputFormat::Text => write!(out, "{report}")?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&report)?)?,
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
