//! Highlight scan worker.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - The scan pipeline (detect, fall back, compose, persist)
//! - Structured scan logging

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use config::{DetectionSettings, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, ScanLogger};
pub use pipeline::{run_highlight_pass, write_outputs, ScanOutput, ScanRequest};
