// Grading orchestration: validate, run every test case, score, persist.
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use verdict_common::question::{CodingQuestion, QuestionError};
use verdict_common::types::{
    visible_results, ScoreRequest, ScoreResult, Submission, TestCaseResult,
};
use verdict_harness::marshal;

use crate::evaluator::{score_submission, ScoreError};
use crate::runner::{RunError, TestRunner};
use crate::sink::{ScoreSink, ScoreSubmission};

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("submission is for question {submitted}, not {question}")]
    QuestionMismatch { question: String, submitted: String },
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeOutcome {
    pub submission_id: Uuid,
    pub score: ScoreResult,
    /// Every result, hidden ones included.
    #[serde(skip)]
    pub results: Vec<TestCaseResult>,
}

impl GradeOutcome {
    pub fn visible_results(&self) -> Vec<TestCaseResult> {
        visible_results(&self.results)
    }
}

pub struct Grader {
    runner: TestRunner,
    sink: Option<Arc<dyn ScoreSink>>,
}

impl Grader {
    pub fn new(runner: TestRunner, sink: Option<Arc<dyn ScoreSink>>) -> Self {
        Self { runner, sink }
    }

    pub fn runner(&self) -> &TestRunner {
        &self.runner
    }

    #[tracing::instrument(skip(self, question, submission), fields(question_id = %question.id, language = %submission.language))]
    pub async fn grade(
        &self,
        question: &CodingQuestion,
        submission: &Submission,
    ) -> Result<GradeOutcome, GradeError> {
        if submission.question_id != question.id {
            return Err(GradeError::QuestionMismatch {
                question: question.id.clone(),
                submitted: submission.question_id.clone(),
            });
        }
        question.validate()?;
        marshal::validate_question(question).map_err(RunError::from)?;
        question.ensure_language_allowed(submission.language)?;

        // The authored or statement signature names the entry point when known.
        let function_name = self
            .runner
            .generator()
            .question_signature(question)
            .ok()
            .map(|sig| sig.name);

        let results = self
            .runner
            .run_test_cases(
                &submission.code,
                submission.language,
                &question.test_cases,
                function_name.as_deref(),
            )
            .await?;

        let score = score_submission(&ScoreRequest {
            question_id: question.id.clone(),
            code: submission.code.clone(),
            language: submission.language,
            total_test_cases: question.test_cases.len(),
            points: question.points,
            results: results.clone(),
        })?;

        let submission_id = Uuid::new_v4();
        info!(
            submission_id = %submission_id,
            score = score.score,
            max_score = score.max_score,
            passed = score.passed_count,
            total = score.total_count,
            "Submission graded"
        );

        if let Some(sink) = &self.sink {
            let record = ScoreSubmission::new(submission_id, submission.language, &score);
            if let Err(e) = sink.persist(&record).await {
                warn!(submission_id = %submission_id, error = %e, "Failed to persist score");
            }
        }

        Ok(GradeOutcome {
            submission_id,
            score,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageConfigManager;
    use crate::engine::{ExecutionBackend, ExecutionError, ExecutionResult, ExecutionStatus};
    use crate::runner::RunOptions;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::Mutex;
    use std::time::Duration;
    use verdict_common::types::{DataStructureType, Language, TestCase};
    use verdict_harness::generator::HarnessGenerator;

    /// Echoes a canned stdout per stdin, immediately terminal.
    struct CannedBackend {
        outputs: HashMap<String, String>,
        jobs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExecutionBackend for CannedBackend {
        async fn submit(
            &self,
            _source_code: &str,
            _language_id: u32,
            stdin: Option<&str>,
        ) -> Result<String, ExecutionError> {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(stdin.unwrap_or_default().to_string());
            Ok((jobs.len() - 1).to_string())
        }

        async fn poll(&self, token: &str) -> Result<ExecutionResult, ExecutionError> {
            let index: usize = token.parse().unwrap();
            let stdin = self.jobs.lock().unwrap()[index].clone();
            Ok(ExecutionResult {
                token: token.to_string(),
                status: ExecutionStatus::Accepted,
                description: "Accepted".to_string(),
                stdout: self.outputs.get(&stdin).cloned(),
                stderr: None,
                compile_output: None,
                message: None,
                time_ms: Some(3),
                memory_kb: None,
            })
        }

        fn poll_interval(&self) -> Duration {
            Duration::from_millis(1)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<ScoreSubmission>>,
        fail: bool,
    }

    #[async_trait]
    impl ScoreSink for MemorySink {
        async fn persist(&self, record: &ScoreSubmission) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("sink offline");
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn make_test_case(id: &str, input: &str, expected: &str, hidden: bool) -> TestCase {
        TestCase {
            id: id.to_string(),
            input: input.to_string(),
            expected_output: expected.to_string(),
            is_hidden: hidden,
            input_type: None,
            output_type: None,
        }
    }

    fn make_question() -> CodingQuestion {
        CodingQuestion {
            id: "sum".to_string(),
            title: Some("Array Sum".to_string()),
            problem_statement: "Write a function named sumArray(nums) returning the total.".to_string(),
            points: 10,
            starter_code: BTreeMap::from([(
                Language::Python,
                "def sumArray(nums):\n    pass\n".to_string(),
            )]),
            test_cases: vec![
                make_test_case("t1", "[1, 2, 3, 4, 5]", "15", false),
                make_test_case("t2", "[10]", "10", false),
                make_test_case("t3", "[-1, 1]", "0", true),
            ],
            allowed_languages: BTreeSet::from([Language::Python]),
            primary_language: Some(Language::Python),
            function_signature: None,
        }
    }

    fn make_grader(outputs: &[(&str, &str)], sink: Option<Arc<dyn ScoreSink>>) -> Grader {
        let backend = CannedBackend {
            outputs: outputs
                .iter()
                .map(|(i, o)| (i.to_string(), o.to_string()))
                .collect(),
            jobs: Mutex::new(Vec::new()),
        };
        let runner = TestRunner::new(
            Arc::new(backend),
            Arc::new(HarnessGenerator::new()),
            LanguageConfigManager::builtin(),
            RunOptions {
                max_concurrency: 2,
                max_poll_attempts: 2,
                grading_timeout: Duration::from_secs(5),
            },
        );
        Grader::new(runner, sink)
    }

    fn make_submission(question_id: &str, language: Language) -> Submission {
        Submission {
            question_id: question_id.to_string(),
            code: "def sumArray(nums):\n    return sum(nums)\n".to_string(),
            language,
        }
    }

    #[tokio::test]
    async fn test_hidden_failure_scores_below_full_and_stays_hidden() {
        let sink = Arc::new(MemorySink::default());
        let grader = make_grader(
            &[("[1, 2, 3, 4, 5]", "15"), ("[10]", "10"), ("[-1, 1]", "1")],
            Some(sink.clone() as Arc<dyn ScoreSink>),
        );

        let outcome = grader
            .grade(&make_question(), &make_submission("sum", Language::Python))
            .await
            .unwrap();

        assert_eq!(outcome.score.passed_count, 2);
        assert_eq!(outcome.score.total_count, 3);
        assert_eq!(outcome.score.score, 7);
        assert!(outcome.score.percentage < 100);

        let visible = outcome.visible_results();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|r| r.passed));
        assert_eq!(outcome.results.len(), 3);

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].submission_id, outcome.submission_id);
        assert_eq!(records[0].score, 7);
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_score() {
        let sink = Arc::new(MemorySink {
            fail: true,
            ..MemorySink::default()
        });
        let grader = make_grader(
            &[("[1, 2, 3, 4, 5]", "15"), ("[10]", "10"), ("[-1, 1]", "0")],
            Some(sink as Arc<dyn ScoreSink>),
        );
        let outcome = grader
            .grade(&make_question(), &make_submission("sum", Language::Python))
            .await
            .unwrap();
        assert_eq!(outcome.score.score, 10);
        assert_eq!(outcome.score.percentage, 100);
    }

    #[tokio::test]
    async fn test_language_not_allowed() {
        let grader = make_grader(&[], None);
        let err = grader
            .grade(&make_question(), &make_submission("sum", Language::Java))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GradeError::Question(QuestionError::LanguageNotAllowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_structural_case_rejected_before_running() {
        let mut question = make_question();
        question.test_cases.push(TestCase {
            input_type: Some(DataStructureType::BinaryTree),
            ..make_test_case("t4", "[1,null,null,2]", "2", false)
        });
        let grader = make_grader(&[], None);
        // Java is not allowed either; the test case is checked first
        let err = grader
            .grade(&question, &make_submission("sum", Language::Java))
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Run(RunError::InvalidTestCase(_))));
    }

    #[tokio::test]
    async fn test_question_mismatch() {
        let grader = make_grader(&[], None);
        let err = grader
            .grade(&make_question(), &make_submission("other", Language::Python))
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::QuestionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_question_without_test_cases_cannot_be_scored() {
        let mut question = make_question();
        question.test_cases.clear();
        let grader = make_grader(&[], None);
        let err = grader
            .grade(&question, &make_submission("sum", Language::Python))
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Score(ScoreError::NoTestCases(_))));
    }
}
