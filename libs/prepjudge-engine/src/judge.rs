/// Judge - public entry points of the judging engine
///
/// **Responsibility:**
/// Validate a submission, choose the test cases and policy for the path
/// being taken, drive the runner and hand its outcomes to the evaluator.
///
/// **Paths:**
/// - `run_test_cases`: visible test cases only, continues through timeouts
/// - `submit_code`: every test case, stops at the first fatal or timeout
/// - `run_custom_input`: one execution with caller-supplied stdin
///
/// Only malformed requests and cancellation escape as errors; execution
/// failures are folded into the returned verdict.
use crate::backend::ExecutionBackend;
use crate::error::{BackendError, JudgeError};
use crate::evaluator;
use crate::fallback::LocalExecutor;
use crate::judge0::Judge0Client;
use crate::runner::{RunPolicy, TestRunner};
use prepjudge_common::config::JudgeConfig;
use prepjudge_common::types::{ExecutionRequest, ExecutionResult, RunResult, TestCase, Verdict};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use uuid::Uuid;

/// Safety limits to keep pathological inputs away from the backend
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_TEST_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Clone)]
pub struct Judge {
    runner: TestRunner,
}

impl Judge {
    pub fn new(backend: Option<Arc<dyn ExecutionBackend>>, fallback: LocalExecutor) -> Self {
        Self {
            runner: TestRunner::new(backend, fallback),
        }
    }

    /// Build a judge from configuration.
    ///
    /// Without credentials no remote calls are attempted at all.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, BackendError> {
        let backend: Option<Arc<dyn ExecutionBackend>> = if config.remote_enabled() {
            Some(Arc::new(Judge0Client::from_config(config)?))
        } else {
            None
        };

        info!(
            remote = backend.is_some(),
            fallback_mode = ?config.fallback_mode,
            "Judge configured"
        );

        Ok(Self::new(backend, LocalExecutor::from_config(config)))
    }

    pub fn has_remote_backend(&self) -> bool {
        self.runner.has_remote_backend()
    }

    /// Developer-facing run over the visible test cases.
    #[instrument(skip(self, source_code, test_cases, cancel), fields(run_id = %Uuid::new_v4()))]
    pub async fn run_test_cases(
        &self,
        source_code: &str,
        language: &str,
        test_cases: &[TestCase],
        cancel: &CancellationToken,
    ) -> Result<RunResult, JudgeError> {
        validate(source_code, test_cases)?;

        let visible: Vec<TestCase> = test_cases
            .iter()
            .filter(|tc| !tc.is_hidden)
            .cloned()
            .collect();
        if visible.is_empty() {
            return Err(JudgeError::NoVisibleTestCases);
        }

        let output = self
            .runner
            .run(source_code, language, &visible, RunPolicy::Run, cancel)
            .await?;
        let result = evaluator::aggregate_run(output.outcomes, visible.len());

        info!(
            status = %result.overall_status,
            passed = result.passed,
            total = result.total,
            time_ms = result.total_execution_time_ms,
            "Run completed"
        );
        Ok(result)
    }

    /// Grading submission over every test case, hidden ones included.
    #[instrument(skip(self, source_code, test_cases, cancel), fields(submission_id = %Uuid::new_v4()))]
    pub async fn submit_code(
        &self,
        source_code: &str,
        language: &str,
        test_cases: &[TestCase],
        cancel: &CancellationToken,
    ) -> Result<Verdict, JudgeError> {
        validate(source_code, test_cases)?;

        let output = self
            .runner
            .run(source_code, language, test_cases, RunPolicy::Submit, cancel)
            .await?;
        let verdict = evaluator::aggregate_verdict(output.outcomes, test_cases.len());

        info!(
            status = %verdict.overall_status,
            score = verdict.score,
            passed = verdict.passed_count,
            total = verdict.total_count,
            executed = verdict.outcomes.len(),
            max_memory_kb = verdict.max_memory_kb,
            "Submission judged"
        );
        Ok(verdict)
    }

    /// Execute once with custom stdin; no comparison is made.
    #[instrument(skip(self, source_code, stdin, cancel))]
    pub async fn run_custom_input(
        &self,
        source_code: &str,
        language: &str,
        stdin: &str,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, JudgeError> {
        validate_source(source_code)?;
        validate_input(stdin)?;

        let request = ExecutionRequest {
            source_code: source_code.to_string(),
            language: language.to_string(),
            stdin: stdin.to_string(),
        };
        self.runner.execute(&request, cancel).await
    }
}

fn validate_source(source_code: &str) -> Result<(), JudgeError> {
    if source_code.len() > MAX_SOURCE_CODE_BYTES {
        return Err(JudgeError::SourceTooLarge {
            actual: source_code.len(),
            max: MAX_SOURCE_CODE_BYTES,
        });
    }
    Ok(())
}

fn validate_input(input: &str) -> Result<(), JudgeError> {
    if input.len() > MAX_TEST_INPUT_BYTES {
        return Err(JudgeError::InputTooLarge {
            actual: input.len(),
            max: MAX_TEST_INPUT_BYTES,
        });
    }
    Ok(())
}

fn validate(source_code: &str, test_cases: &[TestCase]) -> Result<(), JudgeError> {
    if test_cases.is_empty() {
        return Err(JudgeError::NoTestCases);
    }
    validate_source(source_code)?;
    test_cases
        .iter()
        .try_for_each(|tc| validate_input(&tc.input))
}
