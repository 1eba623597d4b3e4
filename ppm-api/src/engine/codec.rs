//! Engine wire-format codec
//!
//! Pure, side-effect-free translation between typed data and the engine's
//! textual protocol:
//!
//! - arguments: `-d <catalog>` plus the enabled save flags, then sample rate
//!   and timestamp as positional decimals
//! - stdin: the base64 sample text verbatim
//! - stdout: one tab-separated line, sentinel first field, then twelve
//!   numeric fields in fixed order
//! - stderr: free-form diagnostics, used as the failure reason

use super::{AnalysisOutcome, EngineError};
use crate::models::{Measurement, RawSampleBatch};
use ppm_common::EngineConfig;
use std::ffi::OsString;

/// First stdout field marking a successful fit
const SUCCESS_SENTINEL: &str = "OK";

/// Fields in a successful report line: sentinel plus twelve values
const REPORT_FIELD_COUNT: usize = 13;

/// Build the engine's command-line arguments for one batch.
///
/// Order matters: the engine consumes flags first, then reads sample rate
/// and timestamp as positional arguments.
pub fn invocation_args(config: &EngineConfig, batch: &RawSampleBatch) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-d".into(), config.data_catalog.clone().into_os_string()];

    if config.save_plots {
        args.push("-p".into());
    }
    if config.save_raw_file {
        args.push("-r".into());
    }
    if config.save_summary_file {
        args.push("-s".into());
    }
    if config.save_error_file {
        args.push("-e".into());
    }

    args.push(format_number(batch.sample_rate).into());
    args.push(format_number(batch.taken_at).into());
    args
}

/// Render a numeric argument with `.` as the decimal separator.
///
/// Rust float formatting never consults the host locale. All engine-bound
/// numbers are rendered here and round-trip against [`parse_number`].
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Locale-invariant counterpart of [`format_number`]
pub fn parse_number(token: &str) -> Result<f64, std::num::ParseFloatError> {
    token.parse()
}

/// Decode the engine's stdout/stderr pair into an analysis outcome.
///
/// A non-`OK` sentinel is an analysis failure carrying the engine's stderr
/// diagnostics (stdout text if stderr is empty, so a failure never has an
/// empty reason). An `OK` line that does not parse per the fixed schema is
/// an [`EngineError::Protocol`], never a partially-populated success.
pub fn decode_report(
    stdout: &str,
    stderr: &str,
    batch: &RawSampleBatch,
) -> Result<AnalysisOutcome, EngineError> {
    let line = stdout.trim();
    if line.is_empty() {
        return Err(EngineError::Protocol {
            reason: "empty report".to_string(),
            line: String::new(),
        });
    }

    let fields: Vec<&str> = line.split('\t').collect();

    if fields[0] != SUCCESS_SENTINEL {
        let diagnostic = stderr.trim();
        let diagnostic = if diagnostic.is_empty() { line } else { diagnostic };
        return Ok(AnalysisOutcome::Failure(diagnostic.to_string()));
    }

    if fields.len() != REPORT_FIELD_COUNT {
        return Err(EngineError::Protocol {
            reason: format!(
                "expected {} fields, got {}",
                REPORT_FIELD_COUNT,
                fields.len()
            ),
            line: line.to_string(),
        });
    }

    let number = |index: usize| -> Result<f64, EngineError> {
        parse_number(fields[index]).map_err(|_| EngineError::Protocol {
            reason: format!("field {} is not a number: {:?}", index, fields[index]),
            line: line.to_string(),
        })
    };

    let number_of_samples: i64 = fields[12].parse().map_err(|_| EngineError::Protocol {
        reason: format!("field 12 is not an integer: {:?}", fields[12]),
        line: line.to_string(),
    })?;

    Ok(AnalysisOutcome::Success(Measurement {
        id: None,
        b: number(1)?,
        fit_frequency: number(2)?,
        fft_frequency: number(3)?,
        t0: number(4)?,
        fft_amplitude: number(5)?,
        a: number(6)?,
        x0_error: number(7)?,
        f_error: number(8)?,
        t0_error: number(9)?,
        a_error: number(10)?,
        y0_error: number(11)?,
        taken_at: batch.taken_at,
        sample_rate: batch.sample_rate,
        number_of_samples,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> RawSampleBatch {
        RawSampleBatch {
            sample_rate: 21000.0,
            taken_at: 1499580140.971,
            base64_samples: "AAAA".repeat(1024),
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            data_catalog: "/var/lib/ppm/data".into(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn args_start_with_data_catalog() {
        let args = invocation_args(&config(), &batch());
        assert_eq!(args[0], OsString::from("-d"));
        assert_eq!(args[1], OsString::from("/var/lib/ppm/data"));
    }

    #[test]
    fn args_end_with_positional_numbers() {
        let args = invocation_args(&config(), &batch());
        assert_eq!(args[args.len() - 2], OsString::from("21000"));
        assert_eq!(args[args.len() - 1], OsString::from("1499580140.971"));
    }

    #[test]
    fn disabled_toggles_emit_no_flags() {
        let args = invocation_args(&config(), &batch());
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn enabled_toggles_emit_flags_in_order() {
        let mut config = config();
        config.save_plots = true;
        config.save_raw_file = true;
        config.save_summary_file = true;
        config.save_error_file = true;

        let args = invocation_args(&config, &batch());
        let flags: Vec<_> = args[2..6].iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(flags, vec!["-p", "-r", "-s", "-e"]);
    }

    #[test]
    fn number_formatting_uses_period_and_round_trips() {
        for value in [
            0.5,
            21000.0,
            1499580140.971,
            2133.3,
            -17.25,
            0.000123,
        ] {
            let rendered = format_number(value);
            assert!(!rendered.contains(','), "unexpected separator in {rendered}");
            assert_eq!(parse_number(&rendered).unwrap(), value);
        }
    }

    #[test]
    fn decodes_successful_report() {
        let stdout =
            "OK\t50124.3\t2133.3\t2133.5\t1.5\t1200.0\t0.02\t0.01\t0.01\t0.02\t0.01\t0.01\t4096";
        let outcome = decode_report(stdout, "", &batch()).unwrap();

        let AnalysisOutcome::Success(m) = outcome else {
            panic!("expected success");
        };
        assert_eq!(m.b, 50124.3);
        assert_eq!(m.fit_frequency, 2133.3);
        assert_eq!(m.fft_frequency, 2133.5);
        assert_eq!(m.t0, 1.5);
        assert_eq!(m.fft_amplitude, 1200.0);
        assert_eq!(m.a, 0.02);
        assert_eq!(m.x0_error, 0.01);
        assert_eq!(m.f_error, 0.01);
        assert_eq!(m.t0_error, 0.02);
        assert_eq!(m.a_error, 0.01);
        assert_eq!(m.y0_error, 0.01);
        assert_eq!(m.number_of_samples, 4096);
        assert_eq!(m.taken_at, 1499580140.971);
        assert_eq!(m.sample_rate, 21000.0);
        assert_eq!(m.id, None);
    }

    #[test]
    fn parses_scientific_error_terms() {
        let stdout =
            "OK\t50124.30\t2133.30\t2133.50\t1.50\t1200.00\t0.02\t2.00E-02\t1.00E-02\t1.00E-02\t2.00E-02\t1.00E-02\t4096";
        let outcome = decode_report(stdout, "", &batch()).unwrap();

        let AnalysisOutcome::Success(m) = outcome else {
            panic!("expected success");
        };
        assert_eq!(m.x0_error, 0.02);
        assert_eq!(m.y0_error, 0.01);
    }

    #[test]
    fn failure_carries_stderr_diagnostics() {
        let outcome = decode_report("ERROR", "Optimal parameters not found\n", &batch()).unwrap();
        assert_eq!(
            outcome,
            AnalysisOutcome::Failure("Optimal parameters not found".to_string())
        );
    }

    #[test]
    fn failure_falls_back_to_stdout_when_stderr_empty() {
        let outcome = decode_report("ERROR\n", "", &batch()).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Failure("ERROR".to_string()));
    }

    #[test]
    fn short_report_is_a_protocol_error() {
        let err = decode_report("OK\t1\t2", "", &batch()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Protocol { ref reason, .. } if reason.contains("got 3")
        ));
    }

    #[test]
    fn bad_numeric_token_is_a_protocol_error() {
        let stdout =
            "OK\t50124.3\tnot-a-number\t2133.5\t1.5\t1200.0\t0.02\t0.01\t0.01\t0.02\t0.01\t0.01\t4096";
        let err = decode_report(stdout, "", &batch()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Protocol { ref reason, .. } if reason.contains("field 2")
        ));
    }

    #[test]
    fn bad_sample_count_is_a_protocol_error() {
        let stdout =
            "OK\t50124.3\t2133.3\t2133.5\t1.5\t1200.0\t0.02\t0.01\t0.01\t0.02\t0.01\t0.01\tmany";
        let err = decode_report(stdout, "", &batch()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Protocol { ref reason, .. } if reason.contains("field 12")
        ));
    }
}
