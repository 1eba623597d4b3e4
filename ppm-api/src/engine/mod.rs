//! Analysis engine invocation
//!
//! The numeric curve fit runs in an external engine process. This module
//! owns the contract with that process: `codec` translates between typed
//! data and the engine's textual wire format, `invoker` manages one
//! subprocess lifecycle per batch.
//!
//! Engine-reported analysis failures are data (`AnalysisOutcome::Failure`),
//! not errors; `EngineError` is reserved for a broken deployment or a
//! crashed or misbehaving engine process.

pub mod codec;
pub mod invoker;

use crate::models::Measurement;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

pub use invoker::EngineInvoker;

/// Terminal result of one engine invocation
///
/// Exactly one variant per invocation: a parsed measurement, or the
/// engine's own diagnostic text when the fit was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The engine reported a successful fit
    Success(Measurement),
    /// The engine ran but rejected the batch; payload is its diagnostic text
    Failure(String),
}

/// Engine invocation errors
///
/// These indicate transport or process failures, never an analysis result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started
    #[error("failed to start analysis engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// Writing the encoded samples to the engine's stdin failed
    #[error("failed to deliver samples to analysis engine: {0}")]
    Stdin(#[source] std::io::Error),

    /// Waiting for the engine process failed
    #[error("failed waiting for analysis engine: {0}")]
    Wait(#[source] std::io::Error),

    /// The engine did not finish within the configured deadline
    #[error("analysis engine timed out after {0:?}")]
    Timeout(Duration),

    /// The engine exited without writing anything to stdout
    #[error("analysis engine exited with {status} before reporting a result: {stderr}")]
    Exited { status: ExitStatus, stderr: String },

    /// The engine reported success but its output does not follow the
    /// tab-separated report schema
    #[error("unparseable engine report ({reason}): {line:?}")]
    Protocol { reason: String, line: String },
}
