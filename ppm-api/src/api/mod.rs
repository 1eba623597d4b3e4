//! HTTP API handlers for ppm-api

pub mod health;
pub mod ppm;

pub use health::health_routes;
pub use ppm::ppm_routes;
