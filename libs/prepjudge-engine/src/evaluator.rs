/// Test Evaluator - Language-Agnostic Scoring Logic
///
/// **Core Responsibility:**
/// Compare execution results against expected outputs and reduce the
/// per-test outcomes to one verdict.
///
/// **Critical Properties:**
/// - Knows nothing about Judge0 or local execution
/// - Knows nothing about language runtimes
/// - Pure functions: (execution results, test cases) → outcomes → verdict
///
/// **Comparison Rules:**
/// - Trim leading and trailing whitespace: YES
/// - Internal whitespace normalization: NO
/// - Case sensitivity: YES (exact match required)
/// - Floating-point tolerance: NO
/// - Execution must have been accepted for a test to pass
///
/// **Verdict Priority (first match wins):**
/// time limit → compilation error → runtime error → all passed → wrong answer
use prepjudge_common::types::{
    ExecutionResult, ExecutionSource, ExecutionStatus, OverallStatus, RunResult, TestCase,
    TestCaseOutcome, Verdict,
};

/// Normalize output string for comparison
fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Evaluate a single execution result against its test case.
///
/// An accepted execution whose output does not match becomes `WrongAnswer`.
pub fn evaluate_test(result: &ExecutionResult, test_case: &TestCase) -> TestCaseOutcome {
    let matches = normalize_output(&result.stdout) == normalize_output(&test_case.expected_output);
    let passed = result.status == ExecutionStatus::Accepted && matches;

    let status = match result.status {
        ExecutionStatus::Accepted if !matches => ExecutionStatus::WrongAnswer,
        other => other,
    };

    TestCaseOutcome {
        test_case: test_case.clone(),
        actual_output: result.stdout.clone(),
        passed,
        status,
        error: result.error_message(),
        execution_time_ms: result.time_ms,
        memory_kb: result.memory_kb,
        source: result.source,
    }
}

/// Classify a set of outcomes into one overall status.
pub fn overall_status(outcomes: &[TestCaseOutcome], total_count: usize) -> OverallStatus {
    let any = |status: ExecutionStatus| outcomes.iter().any(|o| o.status == status);
    let passed = outcomes.iter().filter(|o| o.passed).count();

    if any(ExecutionStatus::TimeLimitExceeded) {
        OverallStatus::TimeLimit
    } else if any(ExecutionStatus::CompilationError) {
        OverallStatus::CompilationError
    } else if any(ExecutionStatus::RuntimeError) {
        OverallStatus::RuntimeError
    } else if total_count > 0 && passed == total_count {
        OverallStatus::Accepted
    } else {
        OverallStatus::WrongAnswer
    }
}

pub fn score(passed_count: usize, total_count: usize) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    (passed_count as f64 / total_count as f64) * 100.0
}

fn totals(outcomes: &[TestCaseOutcome]) -> (f64, u64) {
    let time = outcomes.iter().map(|o| o.execution_time_ms).sum();
    let memory = outcomes.iter().map(|o| o.memory_kb).max().unwrap_or(0);
    (time, memory)
}

/// Reduce outcomes into a verdict.
///
/// `total_count` is the number of test cases judged, which may exceed
/// `outcomes.len()` when execution stopped early.
pub fn aggregate_verdict(outcomes: Vec<TestCaseOutcome>, total_count: usize) -> Verdict {
    let passed_count = outcomes.iter().filter(|o| o.passed).count();
    let overall_status = overall_status(&outcomes, total_count);
    let (total_execution_time_ms, max_memory_kb) = totals(&outcomes);
    let feedback = feedback(overall_status, &outcomes, passed_count, total_count, total_execution_time_ms);

    Verdict {
        overall_status,
        score: score(passed_count, total_count),
        passed_count,
        total_count,
        total_execution_time_ms,
        max_memory_kb,
        outcomes,
        feedback,
    }
}

/// Build the developer-facing run result.
pub fn aggregate_run(outcomes: Vec<TestCaseOutcome>, total_count: usize) -> RunResult {
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let overall_status = overall_status(&outcomes, total_count);
    let (total_execution_time_ms, max_memory_kb) = totals(&outcomes);

    RunResult {
        passed,
        total: total_count,
        results: outcomes,
        overall_status,
        total_execution_time_ms,
        max_memory_kb,
    }
}

/// Deterministic feedback message for a verdict.
///
/// Never includes the input, expected output, actual output or stderr of a
/// hidden test case.
pub fn feedback(
    status: OverallStatus,
    outcomes: &[TestCaseOutcome],
    passed_count: usize,
    total_count: usize,
    total_time_ms: f64,
) -> String {
    match status {
        OverallStatus::Accepted => format!(
            "Accepted! All {} test cases passed in {:.0}ms. Great job!",
            total_count, total_time_ms
        ),
        OverallStatus::WrongAnswer => {
            let mut message = format!(
                "Wrong answer: {}/{} test cases passed. Review your logic and edge cases.",
                passed_count, total_count
            );
            let failures = outcomes.iter().filter(|o| !o.passed);
            let hidden_failures = failures.clone().filter(|o| o.test_case.is_hidden).count();

            if let Some(visible) = failures.clone().find(|o| !o.test_case.is_hidden) {
                message.push_str(&format!(
                    "\nExpected: {}\nGot:      {}",
                    normalize_output(&visible.test_case.expected_output),
                    normalize_output(&visible.actual_output)
                ));
            }
            if hidden_failures > 0 {
                message.push_str(&format!("\n{} hidden test case(s) failed.", hidden_failures));
            }
            message
        }
        OverallStatus::TimeLimit => {
            let position = first_position(outcomes, ExecutionStatus::TimeLimitExceeded);
            format!(
                "Time limit exceeded on test case {}. Consider a more efficient algorithm or data structure.",
                position
            )
        }
        OverallStatus::CompilationError => {
            let failing = outcomes
                .iter()
                .find(|o| o.status == ExecutionStatus::CompilationError);
            // Local interpreters report through stderr, which the program controls
            match failing {
                Some(o) if !o.test_case.is_hidden || o.source == ExecutionSource::Remote => format!(
                    "Compilation error. Fix the following before resubmitting:\n{}",
                    o.error.clone().unwrap_or_default()
                ),
                _ => "Compilation error on a hidden test case. Check your code for syntax errors."
                    .to_string(),
            }
        }
        OverallStatus::RuntimeError => {
            let failing = outcomes
                .iter()
                .find(|o| o.status == ExecutionStatus::RuntimeError);
            match failing {
                Some(o) if !o.test_case.is_hidden => format!(
                    "Runtime error on test case {}:\n{}",
                    first_position(outcomes, ExecutionStatus::RuntimeError),
                    o.error.clone().unwrap_or_default()
                ),
                _ => "Runtime error on a hidden test case. Check for out-of-bounds access, \
                      null references and division by zero."
                    .to_string(),
            }
        }
    }
}

fn first_position(outcomes: &[TestCaseOutcome], status: ExecutionStatus) -> usize {
    outcomes
        .iter()
        .position(|o| o.status == status)
        .map(|idx| idx + 1)
        .unwrap_or(0)
}
