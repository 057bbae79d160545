//! Language-agnostic code judging.
//!
//! A submission is executed once per test case, on a remote Judge0-compatible
//! backend when one is configured and on the local fallback executor
//! otherwise, then reduced to a single [`Verdict`](prepjudge_common::types::Verdict).

pub mod backend;
pub mod clock;
pub mod error;
pub mod evaluator;
pub mod fallback;
pub mod judge;
pub mod judge0;
pub mod language;
pub mod runner;


pub use error::{BackendError, JudgeError};
pub use judge::Judge;
pub use runner::RunPolicy;
pub use tokio_util::sync::CancellationToken;
