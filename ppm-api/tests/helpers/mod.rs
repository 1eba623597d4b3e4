//! Shared test helpers: shell-script fake engines
//!
//! The invoker only needs an interpreter and a script path, so tests stand
//! in a `sh` script for the real engine and exercise the full subprocess
//! lifecycle against it.

use ppm_common::EngineConfig;
use std::path::{Path, PathBuf};

/// Fake engine that echoes its sample-rate argument back as the B field and
/// reports the stdin byte count as the sample count. Lets tests tie each
/// outcome to its own invocation.
pub const ECHO_ENGINE: &str = r#"
input=$(cat)
for arg in "$@"; do
    penultimate="$last"
    last="$arg"
done
printf 'OK\t%s\t2133.3\t2133.5\t1.5\t1200.0\t0.02\t0.01\t0.01\t0.02\t0.01\t0.01\t%s\n' "$penultimate" "${#input}"
"#;

/// Fake engine that rejects the fit the way the real engine does
pub const REJECTING_ENGINE: &str = r#"
cat >/dev/null
echo 'ERROR'
echo 'Optimal parameters not found' >&2
"#;

/// Write `body` as a script under `dir` and return its path
pub fn write_engine_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Engine config pointing the invoker at a fake `sh` engine
pub fn engine_config(script: &Path, timeout_secs: u64) -> EngineConfig {
    EngineConfig {
        interpreter: PathBuf::from("sh"),
        script: script.to_path_buf(),
        data_catalog: script.parent().unwrap().join("data"),
        timeout_secs,
        ..EngineConfig::default()
    }
}

/// A valid batch: `blocks` base64 blocks of packed zero samples
pub fn sample_batch(sample_rate: f64, blocks: usize) -> ppm_api::models::RawSampleBatch {
    ppm_api::models::RawSampleBatch {
        sample_rate,
        taken_at: 1499580140.971,
        base64_samples: "AAAA".repeat(blocks),
    }
}
