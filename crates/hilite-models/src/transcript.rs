//! Transcript models produced by the transcriber.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A time-aligned transcript segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Spoken text
    pub text: String,
}

/// Full transcript: text plus time-aligned segments.
///
/// Unknown fields emitted by the transcriber (language, tokens, ...) are
/// ignored on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Stub transcript used when transcription is unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_shape() {
        let json = r#"{
            "text": " hello world",
            "language": "en",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.5, "text": " hello"},
                {"id": 1, "start": 1.5, "end": 3.0, "text": " world"}
            ]
        }"#;
        let t: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(t.segments.len(), 2);
        assert!(!t.is_empty());
        assert_eq!(t.segments[1].start, 1.5);
    }

    #[test]
    fn test_stub_is_empty() {
        let t: Transcript = serde_json::from_str(r#"{"text":"","segments":[]}"#).unwrap();
        assert!(t.is_empty());
        assert_eq!(t, Transcript::empty());
    }
}
