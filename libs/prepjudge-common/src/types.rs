use serde::{Deserialize, Serialize};
use std::fmt;

/// One input/expected-output pair for a coding problem.
///
/// Hidden test cases take part in grading, but their input, expected output
/// and actual output are never surfaced to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

impl TestCase {
    pub fn visible(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            is_hidden: false,
        }
    }

    pub fn hidden(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            is_hidden: true,
        }
    }
}

/// A single (source, language, stdin) unit handed to an execution tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language: String,
    #[serde(default)]
    pub stdin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Processing)
    }

    /// Compile and runtime failures are deterministic across inputs.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::CompilationError | ExecutionStatus::RuntimeError
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Processing => "Processing",
            ExecutionStatus::Accepted => "Accepted",
            ExecutionStatus::WrongAnswer => "Wrong Answer",
            ExecutionStatus::TimeLimitExceeded => "Time Limit Exceeded",
            ExecutionStatus::CompilationError => "Compilation Error",
            ExecutionStatus::RuntimeError => "Runtime Error",
        };
        write!(f, "{}", s)
    }
}

/// Which tier produced an execution result.
///
/// Everything other than `Remote` is an approximation and must be reported
/// as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionSource {
    Remote,
    LocalInterpreter,
    Synthetic,
    Fixture,
}

impl ExecutionSource {
    pub fn is_approximate(&self) -> bool {
        !matches!(self, ExecutionSource::Remote)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    pub time_ms: f64,
    pub memory_kb: u64,
    pub source: ExecutionSource,
}

impl ExecutionResult {
    /// Shape used whenever an execution tier fails internally.
    pub fn compilation_error(message: impl Into<String>, source: ExecutionSource) -> Self {
        Self {
            status: ExecutionStatus::CompilationError,
            stdout: String::new(),
            stderr: String::new(),
            compile_output: message.into(),
            time_ms: 0.0,
            memory_kb: 0,
            source,
        }
    }

    /// The most useful diagnostic text for a failed execution.
    pub fn error_message(&self) -> Option<String> {
        match self.status {
            ExecutionStatus::CompilationError => Some(first_non_empty(&[
                &self.compile_output,
                &self.stderr,
            ])),
            ExecutionStatus::RuntimeError => {
                Some(first_non_empty(&[&self.stderr, &self.compile_output]))
            }
            ExecutionStatus::TimeLimitExceeded => Some("Time limit exceeded".to_string()),
            _ => None,
        }
    }
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseOutcome {
    pub test_case: TestCase,
    pub actual_output: String,
    pub passed: bool,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub execution_time_ms: f64,
    pub memory_kb: u64,
    pub source: ExecutionSource,
}

impl TestCaseOutcome {
    /// Projection that is safe to show to the submitter.
    pub fn to_public(&self) -> PublicOutcome {
        let hidden = self.test_case.is_hidden;
        let reveal = |s: &str| if hidden { None } else { Some(s.to_string()) };

        PublicOutcome {
            is_hidden: hidden,
            input: reveal(&self.test_case.input),
            expected_output: reveal(&self.test_case.expected_output),
            actual_output: reveal(&self.actual_output),
            passed: self.passed,
            status: self.status,
            error: if hidden { None } else { self.error.clone() },
            execution_time_ms: self.execution_time_ms,
            memory_kb: self.memory_kb,
            source: self.source,
        }
    }
}

/// Externally-facing view of a test case outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicOutcome {
    pub is_hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<String>,
    pub passed: bool,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: f64,
    pub memory_kb: u64,
    pub source: ExecutionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Accepted,
    WrongAnswer,
    TimeLimit,
    RuntimeError,
    CompilationError,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Accepted => "accepted",
            OverallStatus::WrongAnswer => "wrong_answer",
            OverallStatus::TimeLimit => "time_limit",
            OverallStatus::RuntimeError => "runtime_error",
            OverallStatus::CompilationError => "compilation_error",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of judging one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub overall_status: OverallStatus,
    pub score: f64,
    pub passed_count: usize,
    pub total_count: usize,
    pub total_execution_time_ms: f64,
    pub max_memory_kb: u64,
    pub outcomes: Vec<TestCaseOutcome>,
    pub feedback: String,
}

impl Verdict {
    /// True when any outcome came from an approximate execution tier.
    pub fn used_fallback(&self) -> bool {
        self.outcomes.iter().any(|o| o.source.is_approximate())
    }

    pub fn public_outcomes(&self) -> Vec<PublicOutcome> {
        self.outcomes.iter().map(TestCaseOutcome::to_public).collect()
    }

    pub fn to_public(&self) -> PublicVerdict {
        PublicVerdict {
            overall_status: self.overall_status,
            score: self.score,
            passed_count: self.passed_count,
            total_count: self.total_count,
            total_execution_time_ms: self.total_execution_time_ms,
            max_memory_kb: self.max_memory_kb,
            outcomes: self.public_outcomes(),
            feedback: self.feedback.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicVerdict {
    pub overall_status: OverallStatus,
    pub score: f64,
    pub passed_count: usize,
    pub total_count: usize,
    pub total_execution_time_ms: f64,
    pub max_memory_kb: u64,
    pub outcomes: Vec<PublicOutcome>,
    pub feedback: String,
}

/// Developer-facing result of the run path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub passed: usize,
    pub total: usize,
    pub results: Vec<TestCaseOutcome>,
    pub overall_status: OverallStatus,
    pub total_execution_time_ms: f64,
    pub max_memory_kb: u64,
}

impl RunResult {
    pub fn used_fallback(&self) -> bool {
        self.results.iter().any(|o| o.source.is_approximate())
    }

    pub fn public_results(&self) -> Vec<PublicOutcome> {
        self.results.iter().map(TestCaseOutcome::to_public).collect()
    }

    pub fn to_public(&self) -> PublicRunResult {
        PublicRunResult {
            passed: self.passed,
            total: self.total,
            results: self.public_results(),
            overall_status: self.overall_status,
            total_execution_time_ms: self.total_execution_time_ms,
            max_memory_kb: self.max_memory_kb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRunResult {
    pub passed: usize,
    pub total: usize,
    pub results: Vec<PublicOutcome>,
    pub overall_status: OverallStatus,
    pub total_execution_time_ms: f64,
    pub max_memory_kb: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(test_case: TestCase, actual: &str, passed: bool) -> TestCaseOutcome {
        TestCaseOutcome {
            test_case,
            actual_output: actual.to_string(),
            passed,
            status: if passed {
                ExecutionStatus::Accepted
            } else {
                ExecutionStatus::WrongAnswer
            },
            error: None,
            execution_time_ms: 12.5,
            memory_kb: 2048,
            source: ExecutionSource::Remote,
        }
    }

    #[test]
    fn test_overall_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OverallStatus::TimeLimit).unwrap(),
            "\"time_limit\""
        );
        assert_eq!(
            serde_json::to_string(&OverallStatus::CompilationError).unwrap(),
            "\"compilation_error\""
        );
        assert_eq!(OverallStatus::WrongAnswer.to_string(), "wrong_answer");
    }

    #[test]
    fn test_test_case_hidden_defaults_to_false() {
        let tc: TestCase =
            serde_json::from_str(r#"{"input":"1","expected_output":"2"}"#).unwrap();
        assert!(!tc.is_hidden);
    }

    #[test]
    fn test_public_outcome_redacts_hidden_case() {
        let public = outcome(TestCase::hidden("secret in", "secret out"), "my answer", false)
            .to_public();

        assert!(public.is_hidden);
        assert!(!public.passed);
        assert_eq!(public.input, None);
        assert_eq!(public.expected_output, None);
        assert_eq!(public.actual_output, None);

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("my answer"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_public_outcome_keeps_visible_case() {
        let public = outcome(TestCase::visible("1 2", "3"), "3", true).to_public();

        assert_eq!(public.input.as_deref(), Some("1 2"));
        assert_eq!(public.expected_output.as_deref(), Some("3"));
        assert_eq!(public.actual_output.as_deref(), Some("3"));
        assert!(public.passed);
    }

    #[test]
    fn test_error_message_prefers_compile_output() {
        let mut result =
            ExecutionResult::compilation_error("main.cpp:3: error", ExecutionSource::Remote);
        result.stderr = "ignored".to_string();
        assert_eq!(result.error_message().as_deref(), Some("main.cpp:3: error"));

        result.status = ExecutionStatus::Accepted;
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn test_run_result_reports_fallback() {
        let mut approximate = outcome(TestCase::visible("1", "1"), "1", true);
        approximate.source = ExecutionSource::Synthetic;

        let run = RunResult {
            passed: 2,
            total: 2,
            results: vec![outcome(TestCase::visible("1", "1"), "1", true), approximate],
            overall_status: OverallStatus::Accepted,
            total_execution_time_ms: 25.0,
            max_memory_kb: 2048,
        };
        assert!(run.used_fallback());
        assert_eq!(run.to_public().results[1].source, ExecutionSource::Synthetic);
    }

    #[test]
    fn test_fatal_statuses() {
        assert!(ExecutionStatus::CompilationError.is_fatal());
        assert!(ExecutionStatus::RuntimeError.is_fatal());
        assert!(!ExecutionStatus::TimeLimitExceeded.is_fatal());
        assert!(!ExecutionStatus::Processing.is_terminal());
    }
}
