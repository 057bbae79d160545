/// Local Fallback Executor - degraded execution without the remote judge
///
/// **Core Responsibility:**
/// Keep the judging pipeline producing verdicts when the remote backend is
/// unreachable or not configured.
///
/// **Approximation:**
/// Results from this module are never equivalent to sandboxed judging. Every
/// result carries an `ExecutionSource` other than `Remote` so callers can
/// label it.
///
/// **Modes:**
/// - Synthetic: placeholder output with plausible metrics
/// - Interpreter: child-process interpreter for languages that have one
/// - Fixture: canned answers for a few well-known problems (test fixture)
///
/// Never fails: internal problems become compilation-error results.
use crate::language::{self, Interpreter};
use prepjudge_common::config::{FallbackMode, JudgeConfig};
use prepjudge_common::types::{ExecutionResult, ExecutionSource, ExecutionStatus};
use rand::Rng;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

pub const SYNTHETIC_OUTPUT: &str = "Code executed successfully";

/// Markers that an interpreter rejected the program before running it.
///
/// Approximate: the same names can be raised at run time (`eval`, `compile`).
/// A failure only counts as a compile error when the program printed nothing
/// and stderr carries no runtime traceback header.
const SYNTAX_ERROR_MARKERS: &[&str] = &["SyntaxError", "IndentationError", "TabError"];

/// Python prints this header only once the program is executing.
const RUNTIME_TRACEBACK: &str = "Traceback (most recent call last)";

/// Well-known practice problems recognised in fixture mode.
const FIXTURES: &[(&[&str], &str)] = &[
    (&["twoSum", "two_sum"], "[0,1]"),
    (&["isValid", "is_valid"], "true"),
    (&["maxProfit", "max_profit"], "5"),
];

#[derive(Debug, Clone)]
pub struct LocalExecutor {
    mode: FallbackMode,
    timeout: Duration,
}

impl LocalExecutor {
    pub fn new(mode: FallbackMode, timeout: Duration) -> Self {
        Self { mode, timeout }
    }

    pub fn from_config(config: &JudgeConfig) -> Self {
        Self::new(config.fallback_mode, config.local_timeout)
    }

    pub fn mode(&self) -> FallbackMode {
        self.mode
    }

    pub async fn execute_locally(
        &self,
        source_code: &str,
        language: &str,
        stdin: &str,
    ) -> ExecutionResult {
        let spec = language::resolve_spec(language);

        match self.mode {
            FallbackMode::Synthetic => synthetic_result(SYNTHETIC_OUTPUT, ExecutionSource::Synthetic),
            FallbackMode::Fixture => match fixture_answer(source_code) {
                Some(answer) => {
                    warn!(
                        language = spec.id,
                        answer, "Fixture mode returned a canned answer; this is not real judging"
                    );
                    synthetic_result(answer, ExecutionSource::Fixture)
                }
                None => synthetic_result(SYNTHETIC_OUTPUT, ExecutionSource::Synthetic),
            },
            FallbackMode::Interpreter => match spec.interpreter {
                Some(interpreter) => self.interpret(interpreter, source_code, stdin).await,
                None => {
                    debug!(language = spec.id, "No local interpreter, using synthetic result");
                    synthetic_result(SYNTHETIC_OUTPUT, ExecutionSource::Synthetic)
                }
            },
        }
    }

    async fn interpret(&self, interpreter: Interpreter, source_code: &str, stdin: &str) -> ExecutionResult {
        match self.spawn_interpreter(interpreter, source_code, stdin).await {
            Ok(result) => result,
            Err(e) => {
                warn!(program = interpreter.program, error = %e, "Local interpreter failed");
                ExecutionResult::compilation_error(
                    format!("Local execution failed: {}", e),
                    ExecutionSource::LocalInterpreter,
                )
            }
        }
    }

    /// Run the program in a child process inside a scratch directory.
    ///
    /// The child inherits only PATH and is killed when the timeout elapses.
    async fn spawn_interpreter(
        &self,
        interpreter: Interpreter,
        source_code: &str,
        stdin: &str,
    ) -> std::io::Result<ExecutionResult> {
        let workdir = tempfile::tempdir()?;
        let source_path = workdir.path().join(interpreter.file_name);
        tokio::fs::write(&source_path, source_code).await?;

        let mut command = Command::new(interpreter.program);
        command
            .arg(&source_path)
            .current_dir(workdir.path())
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }

        let start = Instant::now();
        let mut child = command.spawn()?;

        if let Some(mut child_stdin) = child.stdin.take() {
            let input = stdin.as_bytes().to_vec();
            // The program may exit without draining stdin
            tokio::spawn(async move {
                let _ = child_stdin.write_all(&input).await;
            });
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Ok(ExecutionResult {
                    status: ExecutionStatus::TimeLimitExceeded,
                    stdout: String::new(),
                    stderr: "[Execution timed out]".to_string(),
                    compile_output: String::new(),
                    time_ms: self.timeout.as_secs_f64() * 1000.0,
                    memory_kb: 0,
                    source: ExecutionSource::LocalInterpreter,
                });
            }
        };
        let time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let (status, compile_output, stderr) = if output.status.success() {
            (ExecutionStatus::Accepted, String::new(), stderr)
        } else if is_rejected_before_running(&stdout, &stderr) {
            (ExecutionStatus::CompilationError, stderr, String::new())
        } else {
            (ExecutionStatus::RuntimeError, String::new(), stderr)
        };

        Ok(ExecutionResult {
            status,
            stdout,
            stderr,
            compile_output,
            time_ms,
            // not measured locally
            memory_kb: 0,
            source: ExecutionSource::LocalInterpreter,
        })
    }
}

fn is_rejected_before_running(stdout: &str, stderr: &str) -> bool {
    stdout.trim().is_empty()
        && !stderr.contains(RUNTIME_TRACEBACK)
        && SYNTAX_ERROR_MARKERS.iter().any(|m| stderr.contains(m))
}

fn fixture_answer(source_code: &str) -> Option<&'static str> {
    FIXTURES
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| source_code.contains(m)))
        .map(|(_, answer)| *answer)
}

fn synthetic_result(stdout: &str, source: ExecutionSource) -> ExecutionResult {
    let mut rng = rand::thread_rng();
    ExecutionResult {
        status: ExecutionStatus::Accepted,
        stdout: stdout.to_string(),
        stderr: String::new(),
        compile_output: String::new(),
        time_ms: rng.gen_range(10.0..110.0),
        memory_kb: rng.gen_range(1024..3072),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(mode: FallbackMode) -> LocalExecutor {
        LocalExecutor::new(mode, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_synthetic_result_is_accepted_placeholder() {
        let result = executor(FallbackMode::Synthetic)
            .execute_locally("int main() {}", "cpp", "")
            .await;

        assert_eq!(result.status, ExecutionStatus::Accepted);
        assert_eq!(result.stdout, SYNTHETIC_OUTPUT);
        assert_eq!(result.source, ExecutionSource::Synthetic);
        assert!(result.source.is_approximate());
        assert!((10.0..110.0).contains(&result.time_ms));
        assert!((1024..3072).contains(&result.memory_kb));
    }

    #[tokio::test]
    async fn test_fixture_mode_recognises_known_problems() {
        let exec = executor(FallbackMode::Fixture);

        let two_sum = exec
            .execute_locally("function twoSum(nums, target) {}", "javascript", "")
            .await;
        assert_eq!(two_sum.stdout, "[0,1]");
        assert_eq!(two_sum.source, ExecutionSource::Fixture);

        let parens = exec.execute_locally("def is_valid(s): pass", "python", "").await;
        assert_eq!(parens.stdout, "true");

        let profit = exec.execute_locally("int maxProfit(int[] p)", "java", "").await;
        assert_eq!(profit.stdout, "5");

        let other = exec.execute_locally("print(42)", "python", "").await;
        assert_eq!(other.stdout, SYNTHETIC_OUTPUT);
        assert_eq!(other.source, ExecutionSource::Synthetic);
    }

    #[tokio::test]
    async fn test_interpreter_mode_without_interpreter_is_synthetic() {
        let result = executor(FallbackMode::Interpreter)
            .execute_locally("class Main {}", "java", "")
            .await;
        assert_eq!(result.source, ExecutionSource::Synthetic);
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH
    async fn test_interpreter_runs_python() {
        let result = executor(FallbackMode::Interpreter)
            .execute_locally("n = int(input())\nprint(n * 2)", "python", "21\n")
            .await;

        assert_eq!(result.status, ExecutionStatus::Accepted);
        assert_eq!(result.stdout.trim(), "42");
        assert_eq!(result.source, ExecutionSource::LocalInterpreter);
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH
    async fn test_interpreter_classifies_python_errors() {
        let exec = executor(FallbackMode::Interpreter);

        let syntax = exec.execute_locally("print(", "python", "").await;
        assert_eq!(syntax.status, ExecutionStatus::CompilationError);
        assert!(syntax.compile_output.contains("SyntaxError"));

        let crash = exec.execute_locally("print(1 // 0)", "python", "").await;
        assert_eq!(crash.status, ExecutionStatus::RuntimeError);
        assert!(crash.stderr.contains("ZeroDivisionError"));
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH
    async fn test_interpreter_enforces_timeout() {
        let result = LocalExecutor::new(FallbackMode::Interpreter, Duration::from_millis(200))
            .execute_locally("while True:\n    pass", "python", "")
            .await;
        assert_eq!(result.status, ExecutionStatus::TimeLimitExceeded);
    }

    #[test]
    fn test_syntax_error_at_run_time_is_not_a_compile_error() {
        let parse_failure = "  File \"main.py\", line 1\n    print(\n         ^\nSyntaxError: '(' was never closed\n";
        assert!(is_rejected_before_running("", parse_failure));

        let raised = "leak=SECRET\nTraceback (most recent call last):\n  File \"main.py\", line 3, in <module>\nSyntaxError: nope\n";
        assert!(!is_rejected_before_running("", raised));
        assert!(!is_rejected_before_running("partial output\n", parse_failure));
        assert!(!is_rejected_before_running("", "ZeroDivisionError: division by zero"));
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH
    async fn test_interpreter_raised_syntax_error_is_runtime_error() {
        let result = executor(FallbackMode::Interpreter)
            .execute_locally("import sys\nsys.stderr.write(input())\nraise SyntaxError('x')", "python", "SECRET\n")
            .await;
        assert_eq!(result.status, ExecutionStatus::RuntimeError);
        assert!(result.compile_output.is_empty());
    }

    #[test]
    fn test_fixture_answer_lookup() {
        assert_eq!(fixture_answer("var twoSum = function() {}"), Some("[0,1]"));
        assert_eq!(fixture_answer("fn solve() {}"), None);
    }
}
