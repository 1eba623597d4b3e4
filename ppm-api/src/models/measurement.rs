//! Raw sample batches and processed measurements
//!
//! A `RawSampleBatch` arrives once per magnetometer reading and is consumed
//! by exactly one engine invocation. A `Measurement` is the structured
//! curve-fit result produced by that invocation; its identity is assigned by
//! the persistence layer, not by the analysis core.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation failures detected before any engine invocation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Sample rate must be a positive number of samples per second
    #[error("sample rate must be positive, got {0}")]
    NonPositiveSampleRate(f64),

    /// Base64 text length must be a whole number of 4-character blocks
    #[error("base64 sample length {0} is not a multiple of 4")]
    UnalignedBase64Length(usize),

    /// Base64 text failed to decode
    #[error("invalid base64 sample data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decoded bytes do not contain a whole number of 12-bit samples
    #[error("decoded length {0} bytes is not a whole number of 12-bit samples")]
    PartialSample(usize),
}

/// One batch of raw magnetometer samples, as received from the sensor host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSampleBatch {
    /// Sampling rate in samples per second
    pub sample_rate: f64,
    /// Unix timestamp (seconds, fractional) of the first sample
    pub taken_at: f64,
    /// Packed 12-bit sample values, base64 encoded
    pub base64_samples: String,
}

impl RawSampleBatch {
    /// Validate the batch and return the number of 12-bit samples it holds.
    ///
    /// Runs before a subprocess is started so malformed requests never reach
    /// the engine.
    pub fn validate(&self) -> Result<usize, ValidationError> {
        if self.sample_rate <= 0.0 {
            return Err(ValidationError::NonPositiveSampleRate(self.sample_rate));
        }

        if self.base64_samples.len() % 4 != 0 {
            return Err(ValidationError::UnalignedBase64Length(
                self.base64_samples.len(),
            ));
        }

        let decoded = base64::engine::general_purpose::STANDARD.decode(&self.base64_samples)?;

        // Samples are packed 12-bit values: 3 bytes hold 2 samples
        if decoded.len() * 8 % 12 != 0 {
            return Err(ValidationError::PartialSample(decoded.len()));
        }

        Ok(decoded.len() * 8 / 12)
    }
}

/// A processed magnetometer measurement, as reported by the analysis engine
///
/// Field values come straight from the engine's curve fit; `taken_at` and
/// `sample_rate` are carried through from the originating batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Storage identity, `None` until the measurement is persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Baseline magnetic field
    pub b: f64,
    /// Precession frequency from the curve fit
    pub fit_frequency: f64,
    /// Precession frequency from the FFT
    pub fft_frequency: f64,
    /// FFT peak amplitude
    pub fft_amplitude: f64,
    /// Signal decay time constant from the fit
    pub t0: f64,
    /// Signal amplitude from the fit
    pub a: f64,
    /// Propagated fit error terms
    pub x0_error: f64,
    pub f_error: f64,
    pub t0_error: f64,
    pub a_error: f64,
    pub y0_error: f64,
    /// Unix timestamp of the originating batch
    pub taken_at: f64,
    /// Sampling rate of the originating batch
    pub sample_rate: f64,
    /// Sample count as reported by the engine
    pub number_of_samples: i64,
}
