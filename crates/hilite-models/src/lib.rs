//! Shared data models for highlight detection.
//!
//! This crate provides Serde-serializable types for:
//! - Highlight candidates and their mood tags
//! - Story sequences composed under a duration budget
//! - Pixel rectangles, plate candidates and object detections
//! - Transcripts returned by the transcriber

pub mod detection;
pub mod error;
pub mod highlight;
pub mod plate;
pub mod rect;
pub mod story;
pub mod transcript;

// Re-export common types
pub use detection::{ObjectDetection, VEHICLE_CLASS_IDS};
pub use error::{ModelError, ModelResult};
pub use highlight::{HighlightCandidate, Mood};
pub use plate::PlateCandidate;
pub use rect::PixelRect;
pub use story::StorySequence;
pub use transcript::{Transcript, TranscriptSegment};
