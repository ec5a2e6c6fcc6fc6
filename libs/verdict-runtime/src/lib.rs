pub mod config;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod runner;
pub mod sink;

pub use config::{LanguageConfigManager, RuntimeConfig};
pub use engine::{ExecutionBackend, ExecutionError, ExecutionResult, ExecutionStatus, SandboxClient};
pub use evaluator::{score_submission, ScoreError};
pub use executor::{GradeError, GradeOutcome, Grader};
pub use runner::{RunError, RunOptions, TestRunner};
pub use sink::{HttpScoreSink, ScoreSink, ScoreSubmission};
