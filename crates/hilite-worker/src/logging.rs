//! Structured scan logging.
//!
//! Every event of a scan carries the source video and the pipeline stage,
//! so JSON logs from several scans can be told apart.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: colored output for dev, JSON when
/// `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "hilite=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger bound to one video and stage.
#[derive(Debug, Clone)]
pub struct ScanLogger {
    video: String,
    stage: String,
}

impl ScanLogger {
    pub fn new(video: impl Into<String>, stage: &str) -> Self {
        Self {
            video: video.into(),
            stage: stage.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video = %self.video,
            stage = %self.stage,
            "Scan started: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video = %self.video,
            stage = %self.stage,
            "Scan warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            video = %self.video,
            stage = %self.stage,
            "Scan error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video = %self.video,
            stage = %self.stage,
            "Scan completed: {}", message
        );
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Span carrying the scan context, for events logged by library code.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "scan",
            video = %self.video,
            stage = %self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_logger_fields() {
        let logger = ScanLogger::new("match.mp4", "highlights");
        assert_eq!(logger.video(), "match.mp4");
        assert_eq!(logger.stage(), "highlights");
    }
}
