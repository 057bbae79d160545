// CLI commands for judging solutions from the terminal
use anyhow::{Context, Result};
use prepjudge_common::types::{OverallStatus, TestCase};
use prepjudge_engine::language;
use prepjudge_engine::{CancellationToken, Judge};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Accepted layouts of a test case file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TestCaseFile {
    List(Vec<TestCase>),
    Wrapped { test_cases: Vec<TestCase> },
}

pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases from {}", path.display()))?;

    let file: TestCaseFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse test cases in {}", path.display()))?;

    Ok(match file {
        TestCaseFile::List(cases) => cases,
        TestCaseFile::Wrapped { test_cases } => test_cases,
    })
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run against visible test cases; succeeds when all of them pass.
pub async fn run_tests(
    judge: &Judge,
    file: &Path,
    language: &str,
    tests: &Path,
    cancel: &CancellationToken,
) -> Result<bool> {
    let source = read_source(file)?;
    let test_cases = load_test_cases(tests)?;

    let result = judge
        .run_test_cases(&source, language, &test_cases, cancel)
        .await?;

    if result.used_fallback() {
        eprintln!("⚠️  Remote judge unavailable, results are approximate");
    }
    print_json(&result.to_public())?;
    Ok(result.overall_status == OverallStatus::Accepted)
}

/// Grade against every test case; succeeds only on an accepted verdict.
pub async fn submit(
    judge: &Judge,
    file: &Path,
    language: &str,
    tests: &Path,
    cancel: &CancellationToken,
) -> Result<bool> {
    let source = read_source(file)?;
    let test_cases = load_test_cases(tests)?;

    let verdict = judge
        .submit_code(&source, language, &test_cases, cancel)
        .await?;

    if verdict.used_fallback() {
        eprintln!("⚠️  Remote judge unavailable, results are approximate");
    }
    print_json(&verdict.to_public())?;
    Ok(verdict.overall_status == OverallStatus::Accepted)
}

pub async fn execute(
    judge: &Judge,
    file: &Path,
    language: &str,
    stdin: &str,
    cancel: &CancellationToken,
) -> Result<bool> {
    let source = read_source(file)?;

    let result = judge
        .run_custom_input(&source, language, stdin, cancel)
        .await?;

    print_json(&result)?;
    Ok(result.error_message().is_none())
}

pub fn list_languages() -> Result<()> {
    print_json(&language::supported_languages())
}
