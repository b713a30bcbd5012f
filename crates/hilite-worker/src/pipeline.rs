//! Highlight scan: detect, fall back, compose, persist.

use std::path::{Path, PathBuf};

use hilite_media::{compose_story, MediaTransform, ViralityScorer};
use clap::Parser;
use hilite_models::{HighlightCandidate, Mood, StorySequence};
use tracing::Instrument;

use crate::config::DetectionSettings;
use crate::error::WorkerResult;
use crate::logging::ScanLogger;

pub const HIGHLIGHTS_FILE: &str = "highlights.json";
pub const STORY_FILE: &str = "story_sequence.json";

/// Inputs of one scan.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "hilite-scan",
    version,
    about = "Find the most engaging window of a video and compose a short story"
)]
pub struct ScanRequest {
    /// Video file to scan
    pub video: PathBuf,

    /// Separate audio track (default: the video itself)
    pub audio: Option<PathBuf>,

    /// Transcript JSON (accepted; not used for scoring)
    pub transcript: Option<PathBuf>,

    /// Mood of the default highlight used when nothing is detected
    #[arg(long = "mood-default", alias = "mood_default", value_parser = parse_mood)]
    pub mood_default: Option<Mood>,
}

fn parse_mood(tag: &str) -> Result<Mood, String> {
    match Mood::from_tag(tag) {
        Mood::Other if !tag.trim().eq_ignore_ascii_case("other") => {
            Err(format!("unknown mood '{tag}'"))
        }
        mood => Ok(mood),
    }
}

impl ScanRequest {
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            audio: None,
            transcript: None,
            mood_default: None,
        }
    }

    pub fn audio_path(&self) -> &Path {
        self.audio.as_deref().unwrap_or(&self.video)
    }

    /// Apply command-line overrides to the detection settings.
    pub fn apply_overrides(&self, settings: &mut DetectionSettings) {
        if let Some(mood) = self.mood_default {
            settings.fallback_mood = mood;
        }
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    pub highlights: Vec<HighlightCandidate>,
    pub story: StorySequence,
    /// True when no highlight was detected and the default candidate was used
    pub used_fallback: bool,
}

/// Detect highlights and compose the story for one video.
pub async fn run_highlight_pass(
    transform: &dyn MediaTransform,
    request: &ScanRequest,
    settings: &DetectionSettings,
) -> WorkerResult<ScanOutput> {
    let logger = ScanLogger::new(request.video.display().to_string(), "highlights");
    logger.log_start("scoring virality");

    let scorer = ViralityScorer::new(settings.virality.clone());
    let mut highlights = scorer
        .detect(
            transform,
            &request.video,
            request.transcript.as_deref(),
            request.audio_path(),
        )
        .instrument(logger.create_span())
        .await?;

    let used_fallback = highlights.is_empty();
    if used_fallback {
        logger.log_warning("no highlight window found, using default candidate");
        highlights.push(HighlightCandidate::fallback(
            settings.virality.target_duration,
            settings.fallback_mood,
        ));
    }

    let story = compose_story(&highlights, &settings.story);
    logger.log_completion(&format!(
        "{} highlight(s), {} story segment(s), {:.1}s",
        highlights.len(),
        story.len(),
        story.total_duration
    ));

    Ok(ScanOutput {
        highlights,
        story,
        used_fallback,
    })
}

/// Write `highlights.json` and `story_sequence.json` into `dir`.
pub async fn write_outputs(dir: &Path, output: &ScanOutput) -> WorkerResult<(PathBuf, PathBuf)> {
    tokio::fs::create_dir_all(dir).await?;

    let highlights_path = dir.join(HIGHLIGHTS_FILE);
    tokio::fs::write(&highlights_path, serde_json::to_vec_pretty(&output.highlights)?).await?;

    let story_path = dir.join(STORY_FILE);
    tokio::fs::write(&story_path, serde_json::to_vec_pretty(&output.story.segments)?).await?;

    Ok((highlights_path, story_path))
}
