/// Failures talking to an execution backend.
///
/// None of these reach the caller of the judge: `Transport`, `PollTimeout`
/// and `Decode` trigger local fallback, `Cancelled` becomes
/// [`JudgeError::Cancelled`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// Network or HTTP failure. Retried with backoff.
    #[error("transport error: {0}")]
    Transport(String),

    /// Submission accepted but never reached a terminal status.
    #[error("submission {token} still processing after {attempts} polls")]
    PollTimeout { token: String, attempts: u32 },

    /// Backend answered with something we could not interpret.
    #[error("invalid backend response: {0}")]
    Decode(String),

    /// Backend client could not be constructed.
    #[error("backend configuration error: {0}")]
    Configuration(String),

    #[error("execution cancelled")]
    Cancelled,
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// Errors that escape the judge's public entry points.
///
/// Everything execution-related is folded into the verdict; only malformed
/// requests and caller-initiated cancellation surface here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JudgeError {
    #[error("no test cases provided")]
    NoTestCases,

    #[error("no visible test cases to run")]
    NoVisibleTestCases,

    #[error("source code exceeds maximum size of {max} bytes ({actual} bytes)")]
    SourceTooLarge { actual: usize, max: usize },

    #[error("test input exceeds maximum size of {max} bytes ({actual} bytes)")]
    InputTooLarge { actual: usize, max: usize },

    #[error("judging cancelled")]
    Cancelled,
}
