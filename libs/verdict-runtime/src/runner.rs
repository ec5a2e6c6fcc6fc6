/// Test Runner - One Submission, Every Test Case
///
/// **Core Responsibility:**
/// Build a harness per test case, run them through an execution backend and
/// return one `TestCaseResult` per test case, in authored order.
///
/// **Guarantees:**
/// - Hidden test cases are always run
/// - All harnesses are generated before anything is submitted, so a
///   generation failure never leaves executions in flight
/// - At most `max_concurrency` executions are outstanding at once
/// - Results come back in test-case order regardless of completion order
/// - Per-test transport failures become results; they do not abort siblings
/// - The whole run is bounded by `grading_timeout`
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};
use verdict_common::types::{Language, TestCase, TestCaseResult, TestStatus};
use verdict_harness::generator::{GenerateError, Harness, HarnessGenerator};
use verdict_harness::marshal::{self, MarshalError};

use crate::config::{LanguageConfigManager, RuntimeConfig};
use crate::engine::{ExecutionBackend, ExecutionError};
use crate::evaluator;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("invalid test case: {0}")]
    InvalidTestCase(#[from] MarshalError),
    #[error("no execution service language id configured for {0}")]
    UnknownLanguage(Language),
    #[error("grading timed out after {0:?}")]
    GradingTimedOut(Duration),
    #[error("runner returned {actual} results for {expected} test cases")]
    IncompleteResults { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub max_concurrency: usize,
    pub max_poll_attempts: u32,
    pub grading_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

impl RunOptions {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            max_poll_attempts: config.max_poll_attempts,
            grading_timeout: config.grading_timeout,
        }
    }
}

#[derive(Clone)]
pub struct TestRunner {
    backend: Arc<dyn ExecutionBackend>,
    generator: Arc<HarnessGenerator>,
    languages: LanguageConfigManager,
    options: RunOptions,
}

impl TestRunner {
    pub fn new(
        backend: Arc<dyn ExecutionBackend>,
        generator: Arc<HarnessGenerator>,
        languages: LanguageConfigManager,
        options: RunOptions,
    ) -> Self {
        Self {
            backend,
            generator,
            languages,
            options,
        }
    }

    pub fn generator(&self) -> &HarnessGenerator {
        &self.generator
    }

    /// Run every test case, visible and hidden, for one submission.
    #[tracing::instrument(skip(self, code, test_cases), fields(language = %language, tests = test_cases.len()))]
    pub async fn run_test_cases(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
        function_name: Option<&str>,
    ) -> Result<Vec<TestCaseResult>, RunError> {
        let language_id = self
            .languages
            .language_id(language)
            .ok_or(RunError::UnknownLanguage(language))?;
        let signature = self.generator.resolve_signature(code, function_name)?;

        let harnesses = test_cases
            .iter()
            .map(|tc| -> Result<Harness, RunError> {
                marshal::validate_test_case(tc)?;
                Ok(self.generator.build_harness(language, &signature, code, tc)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Built before streaming, each owning its test case, so the run
        // future stays Send for spawned tasks and axum handlers.
        let runs: Vec<_> = test_cases
            .iter()
            .cloned()
            .zip(harnesses)
            .map(|(tc, harness)| self.run_one(tc, harness, language_id))
            .collect();

        let start = Instant::now();
        let run = stream::iter(runs)
            .buffered(self.options.max_concurrency.max(1))
            .collect::<Vec<_>>();

        let results = tokio::time::timeout(self.options.grading_timeout, run)
            .await
            .map_err(|_| {
                warn!(timeout_ms = self.options.grading_timeout.as_millis() as u64, "Grading timed out");
                RunError::GradingTimedOut(self.options.grading_timeout)
            })?;

        ensure_complete(test_cases, &results)?;

        let passed = results.iter().filter(|r| r.passed).count();
        info!(
            function = %signature.name,
            passed,
            total = results.len(),
            execution_ms = start.elapsed().as_millis() as u64,
            "Test cases finished"
        );
        Ok(results)
    }

    async fn run_one(&self, tc: TestCase, harness: Harness, language_id: u32) -> TestCaseResult {
        let outcome = self
            .backend
            .await_result(
                &harness.source,
                language_id,
                Some(harness.stdin.as_str()),
                self.options.max_poll_attempts,
            )
            .await;

        match outcome {
            Ok(result) => {
                let evaluated = evaluator::evaluate_test(&result, &tc);
                info!(
                    test_id = %tc.id,
                    token = %result.token,
                    status = ?evaluated.status,
                    execution_ms = result.time_ms,
                    "Test case evaluated"
                );
                evaluated
            }
            Err(e) => {
                let status = match e {
                    ExecutionError::PollTimeout { .. } => TestStatus::PollTimeout,
                    ExecutionError::PayloadTooLarge { .. } => TestStatus::InternalError,
                    _ => TestStatus::TransportError,
                };
                warn!(test_id = %tc.id, status = ?status, error = %e, "Test case did not run");
                evaluator::failed_result(&tc, status, e.to_string())
            }
        }
    }
}

/// One result per test case, attributed to the test case in the same position.
fn ensure_complete(test_cases: &[TestCase], results: &[TestCaseResult]) -> Result<(), RunError> {
    let aligned = results.len() == test_cases.len()
        && test_cases
            .iter()
            .zip(results)
            .all(|(tc, r)| tc.id == r.test_case_id);
    if aligned {
        Ok(())
    } else {
        Err(RunError::IncompleteResults {
            expected: test_cases.len(),
            actual: results.len(),
        })
    }
}
