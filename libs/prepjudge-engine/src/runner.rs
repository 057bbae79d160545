/// Test-Case Runner - ordered execution of one submission
///
/// **Core Responsibility:**
/// Execute a submission against its test cases one at a time, strictly in
/// order, and collect one outcome per executed case.
///
/// **Execution Tiers:**
/// - Remote backend when one is configured
/// - Local fallback executor when the backend is absent or fails
///   (transport failure after retries, poll timeout, undecodable response)
///
/// **Stopping Rules:**
/// - Compilation or runtime error: stop under both policies
/// - Time limit exceeded: `Run` continues, `Submit` stops
///
/// Cancellation is checked before every test case and propagated into the
/// backend's poll loop.
use crate::backend::ExecutionBackend;
use crate::error::{BackendError, JudgeError};
use crate::evaluator;
use crate::fallback::LocalExecutor;
use prepjudge_common::types::{
    ExecutionRequest, ExecutionResult, ExecutionStatus, TestCase, TestCaseOutcome,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Policy difference between the developer-facing and grading paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPolicy {
    /// Diagnostic: keep going after a timeout to show as much as possible.
    Run,
    /// Grading: a single timeout ends the submission.
    Submit,
}

impl RunPolicy {
    pub fn stops_after(&self, status: ExecutionStatus) -> bool {
        match status {
            ExecutionStatus::CompilationError | ExecutionStatus::RuntimeError => true,
            ExecutionStatus::TimeLimitExceeded => *self == RunPolicy::Submit,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerOutput {
    pub outcomes: Vec<TestCaseOutcome>,
    pub total_execution_time_ms: f64,
    pub max_memory_kb: u64,
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    backend: Option<Arc<dyn ExecutionBackend>>,
    fallback: LocalExecutor,
}

impl TestRunner {
    pub fn new(backend: Option<Arc<dyn ExecutionBackend>>, fallback: LocalExecutor) -> Self {
        Self { backend, fallback }
    }

    pub fn has_remote_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Execute one request on the best available tier.
    ///
    /// Only cancellation is reported as an error; every other failure ends in
    /// the local fallback executor.
    pub async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, JudgeError> {
        if let Some(backend) = &self.backend {
            match backend.execute(request, cancel).await {
                Ok(result) => return Ok(result),
                Err(BackendError::Cancelled) => return Err(JudgeError::Cancelled),
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        error = %e,
                        fallback_mode = ?self.fallback.mode(),
                        "Remote execution unavailable, falling back to local executor"
                    );
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(JudgeError::Cancelled);
        }

        Ok(self
            .fallback
            .execute_locally(&request.source_code, &request.language, &request.stdin)
            .await)
    }

    /// Run a submission against `test_cases` in order.
    pub async fn run(
        &self,
        source_code: &str,
        language: &str,
        test_cases: &[TestCase],
        policy: RunPolicy,
        cancel: &CancellationToken,
    ) -> Result<RunnerOutput, JudgeError> {
        let mut outcomes = Vec::with_capacity(test_cases.len());
        let mut total_execution_time_ms = 0.0_f64;
        let mut max_memory_kb = 0_u64;

        debug!(
            test_cases = test_cases.len(),
            language,
            policy = ?policy,
            "Executing test cases"
        );

        for (idx, test_case) in test_cases.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    completed = outcomes.len(),
                    total = test_cases.len(),
                    "Judging cancelled, stopping execution"
                );
                return Err(JudgeError::Cancelled);
            }

            let request = ExecutionRequest {
                source_code: source_code.to_string(),
                language: language.to_string(),
                stdin: test_case.input.clone(),
            };

            let result = self.execute(&request, cancel).await?;
            let outcome = evaluator::evaluate_test(&result, test_case);

            total_execution_time_ms += outcome.execution_time_ms;
            max_memory_kb = max_memory_kb.max(outcome.memory_kb);

            debug!(
                test_num = idx + 1,
                hidden = test_case.is_hidden,
                status = %outcome.status,
                passed = outcome.passed,
                time_ms = outcome.execution_time_ms,
                source = ?result.source,
                "Test case executed"
            );

            let stop = policy.stops_after(outcome.status);
            outcomes.push(outcome);

            if stop {
                info!(
                    test_num = idx + 1,
                    status = %result.status,
                    skipped = test_cases.len() - idx - 1,
                    "Stopping early"
                );
                break;
            }
        }

        Ok(RunnerOutput {
            outcomes,
            total_execution_time_ms,
            max_memory_kb,
        })
    }
}
