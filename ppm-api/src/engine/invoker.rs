//! Analysis engine subprocess lifecycle
//!
//! One invocation per batch: spawn the engine with the codec's arguments,
//! write the encoded samples, close stdin, drain stdout and stderr
//! concurrently, await exit, decode. The protocol is not interleaved: the
//! engine reads its entire input before writing anything, so input is fully
//! written and closed before output is awaited.
//!
//! Closing stdin is load-bearing: the engine blocks reading until end of
//! input, so a leaked stdin handle is a hang, not an error. The whole I/O
//! phase runs under one deadline, and `kill_on_drop` reaps the engine on
//! every early-exit path including timeout.

use super::{codec, AnalysisOutcome, EngineError};
use crate::models::RawSampleBatch;
use ppm_common::EngineConfig;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Invokes the external analysis engine, one subprocess per batch.
///
/// Invocations are fully independent and may run concurrently; there is no
/// shared engine instance and no shared mutable state.
pub struct EngineInvoker {
    config: EngineConfig,
}

impl EngineInvoker {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run one analysis over `batch` and return its terminal outcome.
    ///
    /// Engine-reported analysis failures surface as
    /// [`AnalysisOutcome::Failure`]; `Err` is reserved for process and
    /// protocol failures (engine unable to run, timed out, crashed, or
    /// produced an unparseable success report).
    pub async fn invoke(&self, batch: &RawSampleBatch) -> Result<AnalysisOutcome, EngineError> {
        let args = codec::invocation_args(&self.config, batch);

        debug!(
            interpreter = %self.config.interpreter.display(),
            script = %self.config.script.display(),
            sample_rate = batch.sample_rate,
            taken_at = batch.taken_at,
            "Invoking analysis engine"
        );

        let mut child = Command::new(&self.config.interpreter)
            .arg(&self.config.script)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            EngineError::Stdin(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "engine stdin was not captured",
            ))
        })?;

        let io_phase = async {
            stdin
                .write_all(batch.base64_samples.as_bytes())
                .await
                .map_err(EngineError::Stdin)?;
            // Dropping the handle closes the pipe; the engine reads until EOF
            drop(stdin);

            // wait_with_output drains stdout and stderr concurrently, so a
            // full pipe on one stream cannot deadlock the other
            child.wait_with_output().await.map_err(EngineError::Wait)
        };

        let output = timeout(self.config.timeout(), io_phase)
            .await
            .map_err(|_| {
                warn!(
                    timeout_secs = self.config.timeout_secs,
                    taken_at = batch.taken_at,
                    "Analysis engine timed out, killing subprocess"
                );
                EngineError::Timeout(self.config.timeout())
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // No report line at all: the engine died before producing output.
        // A non-empty stdout is authoritative regardless of exit status,
        // since the engine reports fit failures on stdout and exits zero.
        if stdout.trim().is_empty() {
            warn!(
                status = %output.status,
                stderr = %stderr.trim(),
                "Analysis engine exited without a report"
            );
            return Err(EngineError::Exited {
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        let outcome = codec::decode_report(&stdout, &stderr, batch)?;

        match &outcome {
            AnalysisOutcome::Success(m) => debug!(
                b = m.b,
                fit_frequency = m.fit_frequency,
                number_of_samples = m.number_of_samples,
                "Analysis complete"
            ),
            AnalysisOutcome::Failure(reason) => {
                debug!(reason = %reason, "Analysis rejected by engine")
            }
        }

        Ok(outcome)
    }
}
