/// Judge0 Backend Client
///
/// **Responsibility:**
/// Run one (source, language, stdin) unit on a remote Judge0-compatible
/// judge and return a terminal `ExecutionResult`.
///
/// **Protocol:**
/// 1. POST `/submissions?base64_encoded=true&wait=false` returns a token
/// 2. GET `/submissions/{token}` until the status id leaves the processing
///    range (ids 1 and 2), at a fixed interval with a hard attempt cap
/// 3. Outputs arrive base64-encoded and are decoded before return
///
/// **Failure Handling:**
/// - Transport failures (network, non-2xx) retry the whole submission with
///   exponential backoff
/// - Poll exhaustion is reported immediately, never retried
/// - Every wait races the caller's cancellation token
use crate::backend::ExecutionBackend;
use crate::clock::{Clock, TokioClock};
use crate::error::BackendError;
use crate::language;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use prepjudge_common::config::JudgeConfig;
use prepjudge_common::types::{ExecutionRequest, ExecutionResult, ExecutionSource, ExecutionStatus};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const STATUS_FIELDS: &str = "status,stdout,stderr,compile_output,message,time,memory";

/// Highest status id that still means "in queue" or "processing".
const LAST_PROCESSING_STATUS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Judge0Settings {
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub http_timeout: Duration,
    pub cpu_time_limit_s: f64,
    pub memory_limit_kb: u64,
}

impl Judge0Settings {
    pub fn from_config(config: &JudgeConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts.max(1),
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
            http_timeout: config.http_timeout,
            cpu_time_limit_s: config.cpu_time_limit_s,
            memory_limit_kb: config.memory_limit_kb,
        }
    }
}

impl Default for Judge0Settings {
    fn default() -> Self {
        Self::from_config(&JudgeConfig::default())
    }
}

/// Opaque handle returned by the backend for a queued submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionToken(pub String);

#[derive(Debug, Serialize)]
struct SubmissionBody {
    source_code: String,
    language_id: u32,
    stdin: String,
    cpu_time_limit: f64,
    memory_limit: u64,
}

#[derive(Debug, Deserialize)]
struct SubmissionCreated {
    token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StatusBody {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SubmissionStatusResponse {
    #[serde(default)]
    pub status: Option<StatusBody>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time: Option<serde_json::Value>,
    #[serde(default)]
    pub memory: Option<u64>,
}

/// Map a Judge0 status id onto an execution status.
///
/// 1-2 in queue / processing, 3 accepted, 4 wrong answer, 5 time limit,
/// 6 compilation error, 7-12 runtime error variants, 13 internal error,
/// 14 exec format error. Anything past 6 is reported as a runtime error.
pub fn map_status(id: u32) -> ExecutionStatus {
    match id {
        0..=LAST_PROCESSING_STATUS => ExecutionStatus::Processing,
        3 => ExecutionStatus::Accepted,
        4 => ExecutionStatus::WrongAnswer,
        5 => ExecutionStatus::TimeLimitExceeded,
        6 => ExecutionStatus::CompilationError,
        _ => ExecutionStatus::RuntimeError,
    }
}

fn decode_field(name: &str, field: Option<String>) -> Result<String, BackendError> {
    let Some(raw) = field else {
        return Ok(String::new());
    };
    // Judge0 wraps base64 output at 76 columns
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| BackendError::Decode(format!("{} is not valid base64: {}", name, e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `time` is reported in seconds, usually as a string.
fn parse_time_ms(time: Option<&serde_json::Value>) -> f64 {
    let seconds = match time {
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    };
    seconds * 1000.0
}

fn into_result(response: SubmissionStatusResponse) -> Result<ExecutionResult, BackendError> {
    let status_body = response
        .status
        .ok_or_else(|| BackendError::Decode("status missing from response".to_string()))?;
    let status = map_status(status_body.id);

    let mut stderr = decode_field("stderr", response.stderr)?;
    let message = decode_field("message", response.message)?;

    if status == ExecutionStatus::RuntimeError {
        if stderr.trim().is_empty() && !message.trim().is_empty() {
            stderr = message;
        }
        if status_body.id > 12 {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&format!("[{}]", status_body.description));
        }
    }

    Ok(ExecutionResult {
        status,
        stdout: decode_field("stdout", response.stdout)?,
        stderr,
        compile_output: decode_field("compile_output", response.compile_output)?,
        time_ms: parse_time_ms(response.time.as_ref()),
        memory_kb: response.memory.unwrap_or(0),
        source: ExecutionSource::Remote,
    })
}

fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(1u32.checked_shl(retry).unwrap_or(u32::MAX))
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BackendError::Cancelled),
        result = fut => result,
    }
}

#[derive(Debug)]
pub struct Judge0Client {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_host: String,
    settings: Judge0Settings,
    clock: Arc<dyn Clock>,
}

impl Judge0Client {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        api_host: impl Into<String>,
        settings: Judge0Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            api_host: api_host.into(),
            settings,
            clock,
        })
    }

    pub fn from_config(config: &JudgeConfig) -> Result<Self, BackendError> {
        let base_url = config
            .api_url
            .clone()
            .ok_or_else(|| BackendError::Configuration("JUDGE0_API_URL is not set".to_string()))?;

        Self::new(
            base_url,
            config.api_key.clone(),
            config.api_host.clone(),
            Judge0Settings::from_config(config),
            Arc::new(TokioClock),
        )
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder
                .header("X-RapidAPI-Key", key)
                .header("X-RapidAPI-Host", &self.api_host),
            None => builder,
        }
    }

    /// Queue a submission and return its token.
    pub async fn submit(&self, request: &ExecutionRequest) -> Result<SubmissionToken, BackendError> {
        let language_id = language::resolve_language(&request.language);
        let body = SubmissionBody {
            source_code: general_purpose::STANDARD.encode(&request.source_code),
            language_id: language_id.0,
            stdin: general_purpose::STANDARD.encode(&request.stdin),
            cpu_time_limit: self.settings.cpu_time_limit_s,
            memory_limit: self.settings.memory_limit_kb,
        };

        let url = format!("{}/submissions?base64_encoded=true&wait=false", self.base_url);
        let resp = self
            .authorize(self.http.post(url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Transport(format!(
                "submit failed: HTTP {} {}",
                status,
                text.trim()
            )));
        }

        let created: SubmissionCreated = resp.json().await?;
        debug!(token = %created.token, language_id = %language_id, "Submission queued");
        Ok(SubmissionToken(created.token))
    }

    async fn fetch_status(
        &self,
        token: &SubmissionToken,
    ) -> Result<SubmissionStatusResponse, BackendError> {
        let url = format!(
            "{}/submissions/{}?base64_encoded=true&fields={}",
            self.base_url, token.0, STATUS_FIELDS
        );
        let resp = self.authorize(self.http.get(url)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Transport(format!(
                "status check failed: HTTP {} {}",
                status,
                text.trim()
            )));
        }

        Ok(resp.json().await?)
    }

    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<(), BackendError> {
        cancellable(cancel, async {
            self.clock.sleep(duration).await;
            Ok(())
        })
        .await
    }

    /// Poll until the submission reaches a terminal status.
    ///
    /// Bounded by `max_poll_attempts`; the interval is fixed.
    pub async fn poll(
        &self,
        token: &SubmissionToken,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, BackendError> {
        let attempts = self.settings.max_poll_attempts;

        for attempt in 1..=attempts {
            let response = cancellable(cancel, self.fetch_status(token)).await?;
            let status_id = response.status.as_ref().map(|s| s.id).unwrap_or(1);

            if map_status(status_id).is_terminal() {
                debug!(token = %token.0, attempt, status_id, "Submission finished");
                return into_result(response);
            }

            debug!(token = %token.0, attempt, status_id, "Submission still processing");
            if attempt < attempts {
                self.pause(self.settings.poll_interval, cancel).await?;
            }
        }

        Err(BackendError::PollTimeout {
            token: token.0.clone(),
            attempts,
        })
    }

    async fn submit_and_poll(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, BackendError> {
        let token = cancellable(cancel, self.submit(request)).await?;
        self.poll(&token, cancel).await
    }
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    #[instrument(skip(self, request, cancel), fields(language = %request.language))]
    async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, BackendError> {
        let mut retries = 0u32;

        loop {
            match self.submit_and_poll(request, cancel).await {
                Ok(result) => {
                    info!(
                        status = %result.status,
                        time_ms = result.time_ms,
                        memory_kb = result.memory_kb,
                        retries,
                        "Remote execution completed"
                    );
                    return Ok(result);
                }
                Err(err) if err.is_retryable() && retries < self.settings.max_retries => {
                    let delay = backoff_delay(self.settings.backoff_base, retries);
                    warn!(
                        error = %err,
                        retry = retries + 1,
                        max_retries = self.settings.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transport failure, resubmitting"
                    );
                    self.pause(delay, cancel).await?;
                    retries += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &'static str {
        "judge0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::RecordingClock;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn b64(s: &str) -> String {
        general_purpose::STANDARD.encode(s)
    }

    /// In-process stand-in for a Judge0 deployment.
    #[derive(Default)]
    struct FakeJudge0 {
        submit_failures: AtomicU32,
        polls_before_done: AtomicU32,
        never_finish: bool,
        final_response: SubmissionStatusResponse,
        submits: AtomicU32,
        polls: AtomicU32,
        bodies: Mutex<Vec<serde_json::Value>>,
        api_keys: Mutex<Vec<String>>,
    }

    async fn create_submission(
        State(fake): State<Arc<FakeJudge0>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        fake.submits.fetch_add(1, Ordering::SeqCst);
        if let Some(key) = headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok()) {
            fake.api_keys.lock().unwrap().push(key.to_string());
        }
        fake.bodies.lock().unwrap().push(body);

        let failures_left = fake.submit_failures.load(Ordering::SeqCst);
        if failures_left > 0 {
            fake.submit_failures.store(failures_left - 1, Ordering::SeqCst);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": "overloaded" })),
            );
        }
        (
            StatusCode::CREATED,
            Json(serde_json::json!({ "token": "tok-123" })),
        )
    }

    async fn submission_status(
        State(fake): State<Arc<FakeJudge0>>,
    ) -> Json<SubmissionStatusResponse> {
        fake.polls.fetch_add(1, Ordering::SeqCst);
        let remaining = fake.polls_before_done.load(Ordering::SeqCst);
        if fake.never_finish || remaining > 0 {
            fake.polls_before_done
                .store(remaining.saturating_sub(1), Ordering::SeqCst);
            return Json(SubmissionStatusResponse {
                status: Some(StatusBody {
                    id: 2,
                    description: "Processing".to_string(),
                }),
                ..Default::default()
            });
        }
        Json(fake.final_response.clone())
    }

    async fn spawn_fake(fake: Arc<FakeJudge0>) -> String {
        let app = Router::new()
            .route("/submissions", post(create_submission))
            .route("/submissions/:token", get(submission_status))
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn settings() -> Judge0Settings {
        Judge0Settings {
            poll_interval: Duration::from_millis(50),
            max_poll_attempts: 5,
            max_retries: 3,
            backoff_base: Duration::from_millis(100),
            http_timeout: Duration::from_secs(5),
            cpu_time_limit_s: 2.0,
            memory_limit_kb: 128_000,
        }
    }

    fn client(base_url: &str, settings: Judge0Settings, clock: Arc<RecordingClock>) -> Judge0Client {
        Judge0Client::new(
            base_url,
            Some("test-key".to_string()),
            "judge0.test",
            settings,
            clock,
        )
        .unwrap()
    }

    fn request() -> ExecutionRequest {
        ExecutionRequest {
            source_code: "print(input())".to_string(),
            language: "python".to_string(),
            stdin: "[2,7,11,15]\n9".to_string(),
        }
    }

    fn finished(id: u32, stdout: &str) -> SubmissionStatusResponse {
        SubmissionStatusResponse {
            status: Some(StatusBody {
                id,
                description: "done".to_string(),
            }),
            stdout: Some(b64(stdout)),
            time: Some(serde_json::json!("0.015")),
            memory: Some(3200),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(1), ExecutionStatus::Processing);
        assert_eq!(map_status(2), ExecutionStatus::Processing);
        assert_eq!(map_status(3), ExecutionStatus::Accepted);
        assert_eq!(map_status(4), ExecutionStatus::WrongAnswer);
        assert_eq!(map_status(5), ExecutionStatus::TimeLimitExceeded);
        assert_eq!(map_status(6), ExecutionStatus::CompilationError);
        assert_eq!(map_status(11), ExecutionStatus::RuntimeError);
        assert_eq!(map_status(12), ExecutionStatus::RuntimeError);
        assert_eq!(map_status(7), ExecutionStatus::RuntimeError);
        assert_eq!(map_status(13), ExecutionStatus::RuntimeError);
    }

    #[test]
    fn test_decode_field_tolerates_line_wrapping() {
        let encoded = b64("hello world, this output is long enough to wrap");
        let wrapped = format!("{}\n{}\n", &encoded[..20], &encoded[20..]);
        assert_eq!(
            decode_field("stdout", Some(wrapped)).unwrap(),
            "hello world, this output is long enough to wrap"
        );
        assert_eq!(decode_field("stdout", None).unwrap(), "");
        assert!(matches!(
            decode_field("stdout", Some("%%%".to_string())),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn test_time_is_converted_to_millis() {
        assert_eq!(parse_time_ms(Some(&serde_json::json!("0.25"))), 250.0);
        assert_eq!(parse_time_ms(Some(&serde_json::json!(0.5))), 500.0);
        assert_eq!(parse_time_ms(None), 0.0);
    }

    #[test]
    fn test_internal_error_description_is_appended() {
        let response = SubmissionStatusResponse {
            status: Some(StatusBody {
                id: 13,
                description: "Internal Error".to_string(),
            }),
            ..Default::default()
        };
        let result = into_result(response).unwrap();
        assert_eq!(result.status, ExecutionStatus::RuntimeError);
        assert_eq!(result.stderr, "[Internal Error]");
    }

    #[test]
    fn test_backoff_is_exponential() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
    }

    #[tokio::test]
    async fn test_execute_accepted_after_polling() {
        let fake = Arc::new(FakeJudge0 {
            polls_before_done: AtomicU32::new(2),
            final_response: finished(3, "[0,1]\n"),
            ..Default::default()
        });
        let base_url = spawn_fake(fake.clone()).await;
        let clock = Arc::new(RecordingClock::default());
        let judge0 = client(&base_url, settings(), clock.clone());

        let result = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Accepted);
        assert_eq!(result.stdout, "[0,1]\n");
        assert_eq!(result.time_ms, 15.0);
        assert_eq!(result.memory_kb, 3200);
        assert_eq!(result.source, ExecutionSource::Remote);

        assert_eq!(fake.submits.load(Ordering::SeqCst), 1);
        assert_eq!(fake.polls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(50); 2]);

        let bodies = fake.bodies.lock().unwrap();
        assert_eq!(bodies[0]["language_id"], 71);
        assert_eq!(bodies[0]["source_code"], b64("print(input())"));
        assert_eq!(bodies[0]["stdin"], b64("[2,7,11,15]\n9"));
        assert_eq!(fake.api_keys.lock().unwrap().as_slice(), ["test-key"]);
    }

    #[tokio::test]
    async fn test_compilation_error_output_is_decoded() {
        let mut response = finished(6, "");
        response.compile_output = Some(b64("main.cpp:1:1: error: expected ';'"));
        let fake = Arc::new(FakeJudge0 {
            final_response: response,
            ..Default::default()
        });
        let base_url = spawn_fake(fake).await;
        let judge0 = client(&base_url, settings(), Arc::new(RecordingClock::default()));

        let result = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::CompilationError);
        assert_eq!(result.compile_output, "main.cpp:1:1: error: expected ';'");
    }

    #[tokio::test]
    async fn test_transport_failures_retry_with_backoff() {
        let fake = Arc::new(FakeJudge0 {
            submit_failures: AtomicU32::new(2),
            final_response: finished(3, "ok"),
            ..Default::default()
        });
        let base_url = spawn_fake(fake.clone()).await;
        let clock = Arc::new(RecordingClock::default());
        let judge0 = client(&base_url, settings(), clock.clone());

        let result = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.stdout, "ok");
        assert_eq!(fake.submits.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let fake = Arc::new(FakeJudge0 {
            submit_failures: AtomicU32::new(u32::MAX),
            ..Default::default()
        });
        let base_url = spawn_fake(fake.clone()).await;
        let clock = Arc::new(RecordingClock::default());
        let judge0 = client(
            &base_url,
            Judge0Settings {
                max_retries: 2,
                ..settings()
            },
            clock.clone(),
        );

        let err = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Transport(_)));
        assert_eq!(fake.submits.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_poll_timeout_is_not_retried() {
        let fake = Arc::new(FakeJudge0 {
            never_finish: true,
            ..Default::default()
        });
        let base_url = spawn_fake(fake.clone()).await;
        let clock = Arc::new(RecordingClock::default());
        let judge0 = client(
            &base_url,
            Judge0Settings {
                max_poll_attempts: 3,
                ..settings()
            },
            clock.clone(),
        );

        let err = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BackendError::PollTimeout {
                token: "tok-123".to_string(),
                attempts: 3
            }
        );
        assert_eq!(fake.submits.load(Ordering::SeqCst), 1);
        assert_eq!(fake.polls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(50); 2]);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_submitting() {
        let fake = Arc::new(FakeJudge0::default());
        let base_url = spawn_fake(fake.clone()).await;
        let judge0 = client(&base_url, settings(), Arc::new(RecordingClock::default()));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = judge0.execute(&request(), &cancel).await.unwrap_err();

        assert_eq!(err, BackendError::Cancelled);
        assert_eq!(fake.submits.load(Ordering::SeqCst), 0);
    }

    /// Cancels the token on the first pause and then never wakes up.
    #[derive(Debug)]
    struct CancelOnSleep(CancellationToken);

    #[async_trait]
    impl Clock for CancelOnSleep {
        async fn sleep(&self, _duration: Duration) {
            self.0.cancel();
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_polling() {
        let fake = Arc::new(FakeJudge0 {
            never_finish: true,
            ..Default::default()
        });
        let base_url = spawn_fake(fake.clone()).await;
        let cancel = CancellationToken::new();
        let judge0 = Judge0Client::new(
            base_url,
            Some("test-key".to_string()),
            "judge0.test",
            Judge0Settings {
                max_poll_attempts: 1000,
                ..settings()
            },
            Arc::new(CancelOnSleep(cancel.clone())),
        )
        .unwrap();

        let err = judge0.execute(&request(), &cancel).await.unwrap_err();

        assert_eq!(err, BackendError::Cancelled);
        assert_eq!(fake.submits.load(Ordering::SeqCst), 1);
        assert_eq!(fake.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let clock = Arc::new(RecordingClock::default());
        let judge0 = client(
            "http://127.0.0.1:1",
            Judge0Settings {
                max_retries: 1,
                ..settings()
            },
            clock.clone(),
        );

        let err = judge0
            .execute(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Transport(_)));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);
    }
}
