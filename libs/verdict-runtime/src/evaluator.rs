/// Test Evaluator and Scorer
///
/// **Core Responsibility:**
/// Turn a decoded execution result into a `TestCaseResult`, and turn a full
/// result set into a `ScoreResult`.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP or the execution service protocol
/// - Knows nothing about language runtimes or harnesses
/// - Pure functions: (results, counts, points) → score
///
/// **Normalization Rules (Applied to All Languages):**
/// - Trim leading and trailing whitespace: YES
/// - Ignore newline differences (\n vs \r\n) at the ends: YES (via trim)
/// - Case sensitivity: YES (exact match required)
/// - Partial credit or fuzzy matching: NO
///
/// **Scoring Rules:**
/// - score = round(points * passed / total)
/// - percentage = round(100 * passed / total)
/// - Halves round up
/// - total == 0 is an error, never a score
use thiserror::Error;
use verdict_common::types::{ScoreRequest, ScoreResult, TestCase, TestCaseResult, TestStatus};
use verdict_harness::marshal;

use crate::engine::{ExecutionResult, ExecutionStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("question {0} has no test cases, nothing can be scored")]
    NoTestCases(String),
    #[error("expected {expected} test case results, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },
}

/// Normalize output string for comparison
fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Evaluate a single finished execution against its test case
///
/// Execution-reported failures (compile, runtime, time limit) are results,
/// not errors; the diagnostic is carried in `error`.
pub fn evaluate_test(result: &ExecutionResult, test_case: &TestCase) -> TestCaseResult {
    let (status, error) = match result.status {
        ExecutionStatus::Accepted | ExecutionStatus::WrongAnswer => {
            let actual = result.stdout.as_deref().map(normalize_output);
            let expected = marshal::expected_output(test_case);
            if actual == Some(expected.as_str()) {
                (TestStatus::Passed, None)
            } else {
                (TestStatus::WrongAnswer, result.stderr.clone().filter(|s| !s.trim().is_empty()))
            }
        }
        ExecutionStatus::TimeLimitExceeded => (
            TestStatus::TimeLimitExceeded,
            Some(result.description.clone()),
        ),
        ExecutionStatus::CompilationError => (
            TestStatus::CompilationError,
            result.compile_output.clone().or_else(|| result.message.clone()),
        ),
        ExecutionStatus::RuntimeError => (
            TestStatus::RuntimeError,
            result
                .stderr
                .clone()
                .filter(|s| !s.trim().is_empty())
                .or_else(|| result.message.clone())
                .or_else(|| Some(result.description.clone())),
        ),
        ExecutionStatus::InternalError
        | ExecutionStatus::ExecFormatError
        | ExecutionStatus::Queued
        | ExecutionStatus::Processing => (
            TestStatus::InternalError,
            result
                .message
                .clone()
                .or_else(|| Some(result.description.clone())),
        ),
    };

    TestCaseResult {
        test_case_id: test_case.id.clone(),
        passed: status == TestStatus::Passed,
        status,
        is_hidden: test_case.is_hidden,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: result.stdout.as_deref().map(|s| normalize_output(s).to_string()),
        execution_time_ms: result.time_ms,
        memory_kb: result.memory_kb,
        error,
    }
}

/// Result for a test case that never produced an execution result.
pub fn failed_result(test_case: &TestCase, status: TestStatus, error: String) -> TestCaseResult {
    TestCaseResult {
        test_case_id: test_case.id.clone(),
        passed: false,
        status,
        is_hidden: test_case.is_hidden,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: None,
        execution_time_ms: None,
        memory_kb: None,
        error: Some(error),
    }
}

// round(scale * passed / total), halves up, in integer arithmetic
fn rounded_share(scale: u32, passed: usize, total: usize) -> u32 {
    let scale = scale as u64;
    let passed = passed as u64;
    let total = total as u64;
    ((2 * scale * passed + total) / (2 * total)) as u32
}

/// Score a complete result set
///
/// `total_test_cases` counts hidden cases too, and must equal the number of
/// results supplied.
pub fn score_submission(request: &ScoreRequest) -> Result<ScoreResult, ScoreError> {
    let total = request.total_test_cases;
    if total == 0 {
        return Err(ScoreError::NoTestCases(request.question_id.clone()));
    }
    if request.results.len() != total {
        return Err(ScoreError::ResultCountMismatch {
            expected: total,
            actual: request.results.len(),
        });
    }

    let passed = request.results.iter().filter(|r| r.passed).count();

    Ok(ScoreResult {
        question_id: request.question_id.clone(),
        score: rounded_share(request.points, passed, total),
        max_score: request.points,
        percentage: rounded_share(100, passed, total),
        passed_count: passed,
        total_count: total,
    })
}
