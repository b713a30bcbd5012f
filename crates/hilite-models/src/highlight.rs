//! Highlight candidate models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Mood tag attached to a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Energetic,
    #[default]
    Neutral,
    Calm,
    Dramatic,
    #[serde(other)]
    Other,
}

impl Mood {
    /// Parse a mood tag, mapping unknown tags to [`Mood::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "energetic" => Mood::Energetic,
            "neutral" => Mood::Neutral,
            "calm" => Mood::Calm,
            "dramatic" => Mood::Dramatic,
            _ => Mood::Other,
        }
    }

    /// Tag as written in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Neutral => "neutral",
            Mood::Calm => "calm",
            Mood::Dramatic => "dramatic",
            Mood::Other => "other",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored time window proposed as share-worthy.
///
/// Times are in seconds from the start of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightCandidate {
    /// Start of the window (seconds)
    pub start: f64,
    /// End of the window (seconds), always after `start`
    pub end: f64,
    /// Average fused signal value over the window
    pub score: f64,
    /// Mood tag
    pub mood: Mood,
}

/// Score given to the default candidate when nothing could be scored.
pub const FALLBACK_SCORE: f64 = 0.5;

impl HighlightCandidate {
    /// Create a validated candidate.
    pub fn new(start: f64, end: f64, score: f64, mood: Mood) -> ModelResult<Self> {
        check_non_negative("start", start)?;
        check_non_negative("end", end)?;
        check_non_negative("score", score)?;
        if end <= start {
            return Err(ModelError::NonIncreasingRange { start, end });
        }
        Ok(Self {
            start,
            end,
            score,
            mood,
        })
    }

    /// Default candidate used by callers when the scorer yields nothing:
    /// the first `target_duration` seconds with a neutral score.
    pub fn fallback(target_duration: f64, mood: Mood) -> Self {
        Self {
            start: 0.0,
            end: target_duration.max(f64::EPSILON),
            score: FALLBACK_SCORE,
            mood,
        }
    }

    /// Nominal duration (`end - start`).
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Duration floored at `min_seconds`, as used when budgeting clips.
    pub fn effective_duration(&self, min_seconds: f64) -> f64 {
        self.duration().max(min_seconds)
    }
}

fn check_non_negative(field: &'static str, value: f64) -> ModelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidValue { field, value })
    }
}
