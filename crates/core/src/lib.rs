#![forbid(unsafe_code)]

pub mod error;
pub mod metrics;
pub mod model;
pub mod time;

pub use error::Error;
pub use metrics::{PreparednessWeights, ProgressMetrics, ScoringPolicy};
pub use time::{Clock, QuizTimer};
