/// Execution Backend - seam between the judge and a remote execution tier
///
/// A backend runs one (source, language, stdin) unit and returns a terminal
/// `ExecutionResult`. It never compares outputs; that is the evaluator's job.
use crate::error::BackendError;
use async_trait::async_trait;
use prepjudge_common::types::{ExecutionRequest, ExecutionResult};
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ExecutionBackend: Send + Sync + Debug {
    /// Execute one request to completion.
    ///
    /// The returned status is never `Processing`.
    async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, BackendError>;

    fn name(&self) -> &'static str;
}
