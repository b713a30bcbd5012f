#![deny(unreachable_patterns)]
//! Highlight detection core.
//!
//! This crate provides:
//! - Audio energy and visual motion signals decoded through FFmpeg
//! - Virality scoring: signal fusion and a best-window search
//! - Greedy story composition under a duration budget
//! - Classical plate region detection and plate redaction (OpenCV, behind
//!   the default `opencv` feature)

pub mod command;
#[cfg(feature = "opencv")]
pub mod cv;
pub mod error;
pub mod plate;
pub mod probe;
pub mod redact;
pub mod signals;
pub mod story;
pub mod transcript;
pub mod transform;
pub mod virality;
pub mod window;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, MediaInfo};
pub use transform::{FfmpegTransform, FrameStream, MediaTransform, Waveform};

// Scoring and composition
pub use signals::{Signal, SignalConfig};
pub use story::{compose_story, StoryConfig};
pub use virality::{detect_highlights, ViralityConfig, ViralityScorer};

// Plates
pub use plate::{PlateDetector, PlateDetectorConfig};
pub use redact::{blur_regions, plate_regions_in_frame, redact_frame, RedactionConfig, VehicleDetector};

pub use transcript::{load_transcript, StubTranscriber, Transcriber};
