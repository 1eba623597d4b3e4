//! Data models for the PPM analysis service

pub mod measurement;

pub use measurement::{Measurement, RawSampleBatch, ValidationError};
