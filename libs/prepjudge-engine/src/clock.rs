use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Source of delays for polling and backoff.
///
/// Production code sleeps on the tokio timer; tests substitute a clock that
/// records requested delays and returns immediately.
#[async_trait]
pub trait Clock: Send + Sync + Debug {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
