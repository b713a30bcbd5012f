//! End-to-end highlight detection over in-memory media.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use hilite_media::{
    compose_story, FrameStream, MediaError, MediaResult, MediaTransform, SignalConfig, StoryConfig,
    ViralityConfig, ViralityScorer, Waveform,
};
use hilite_models::{HighlightCandidate, Mood};
use image::{GrayImage, Luma};

const SAMPLE_RATE: u32 = 512;

/// Media transform backed by prepared buffers. `None` simulates a decode failure.
struct FakeMedia {
    waveform: Option<Waveform>,
    frames: Option<Vec<GrayImage>>,
    fps: f64,
}

struct VecFrames {
    frames: VecDeque<GrayImage>,
    fps: f64,
}

#[async_trait]
impl FrameStream for VecFrames {
    async fn next_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        Ok(self.frames.pop_front())
    }

    fn frame_rate(&self) -> Option<f64> {
        Some(self.fps)
    }
}

#[async_trait]
impl MediaTransform for FakeMedia {
    async fn decode_waveform(&self, _path: &Path, _sample_rate: Option<u32>) -> MediaResult<Waveform> {
        self.waveform
            .clone()
            .ok_or_else(|| MediaError::decode_failed("no audio stream"))
    }

    async fn open_gray_frames(&self, _path: &Path) -> MediaResult<Box<dyn FrameStream>> {
        let frames = self
            .frames
            .clone()
            .ok_or_else(|| MediaError::decode_failed("no video stream"))?;
        Ok(Box::new(VecFrames {
            frames: frames.into(),
            fps: self.fps,
        }))
    }
}

/// `seconds` of quiet audio with a loud burst over `[loud_from, loud_to)`.
fn burst_waveform(seconds: usize, loud_from: usize, loud_to: usize) -> Waveform {
    let rate = SAMPLE_RATE as usize;
    let samples = (0..seconds * rate)
        .map(|i| {
            let t = i / rate;
            if (loud_from..loud_to).contains(&t) {
                0.9
            } else {
                0.01
            }
        })
        .collect();
    Waveform::new(samples, SAMPLE_RATE)
}

fn still_frames(count: usize) -> Vec<GrayImage> {
    vec![GrayImage::from_pixel(8, 8, Luma([40])); count]
}

fn scorer(target: f64) -> ViralityScorer {
    ViralityScorer::new(ViralityConfig::default().with_target_duration(target))
}

async fn detect(media: &FakeMedia, scorer: &ViralityScorer) -> Vec<HighlightCandidate> {
    scorer
        .detect(
            media,
            Path::new("match.mp4"),
            Some(Path::new("match.json")),
            Path::new("match.wav"),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_loud_section_becomes_the_highlight() {
    let media = FakeMedia {
        waveform: Some(burst_waveform(120, 50, 60)),
        frames: Some(still_frames(120)),
        fps: 1.0,
    };

    let highlights = detect(&media, &scorer(10.0)).await;
    assert_eq!(highlights.len(), 1);

    let h = highlights[0];
    // Hop is 512 samples at 512 Hz, one second per energy frame.
    assert!(h.start >= 45.0 && h.start <= 52.0, "start {}", h.start);
    assert!((h.duration() - 10.0).abs() < 1e-9);
    assert_eq!(h.mood, Mood::Energetic);
    assert!(h.score > 0.0 && h.score <= 1.0);

    let story = compose_story(&highlights, &StoryConfig::default());
    assert_eq!(story.len(), 1);
    assert_eq!(story.segments[0], h);
}

#[cfg(feature = "opencv")]
#[tokio::test]
async fn test_motion_carries_when_audio_fails() {
    // Ten frames per second, sampled every tenth frame: one motion sample per second.
    let frames: Vec<GrayImage> = (0..1000)
        .map(|i| {
            let second = i / 10;
            let white = (70..80).contains(&second) && second % 2 == 1;
            GrayImage::from_pixel(8, 8, Luma([if white { 255 } else { 0 }]))
        })
        .collect();

    let media = FakeMedia {
        waveform: None,
        frames: Some(frames),
        fps: 10.0,
    };

    let highlights = detect(&media, &scorer(10.0)).await;
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].start, 70.0);
    assert_eq!(highlights[0].end, 80.0);
}

#[tokio::test]
async fn test_nothing_decodable_uses_caller_fallback() {
    let media = FakeMedia {
        waveform: None,
        frames: None,
        fps: 25.0,
    };

    let highlights = detect(&media, &scorer(30.0)).await;
    assert!(highlights.is_empty());

    let candidates = vec![HighlightCandidate::fallback(30.0, Mood::Neutral)];
    let story = compose_story(&candidates, &StoryConfig::default());
    assert_eq!(story.len(), 1);
    assert_eq!(story.segments[0].start, 0.0);
    assert_eq!(story.segments[0].end, 30.0);
    assert_eq!(story.segments[0].score, 0.5);
}

#[tokio::test]
async fn test_recording_shorter_than_window_is_empty() {
    let media = FakeMedia {
        waveform: Some(burst_waveform(20, 5, 10)),
        frames: Some(still_frames(20)),
        fps: 1.0,
    };
    assert!(detect(&media, &scorer(30.0)).await.is_empty());
}

#[tokio::test]
async fn test_detection_is_deterministic() {
    let media = FakeMedia {
        waveform: Some(burst_waveform(90, 20, 35)),
        frames: Some(still_frames(90)),
        fps: 1.0,
    };
    let s = scorer(15.0);
    assert_eq!(detect(&media, &s).await, detect(&media, &s).await);
}

#[tokio::test]
async fn test_custom_hop_changes_timing_resolution() {
    let media = FakeMedia {
        waveform: Some(burst_waveform(60, 30, 40)),
        frames: Some(still_frames(60)),
        fps: 1.0,
    };
    let config = ViralityConfig::default()
        .with_target_duration(10.0)
        .with_signals(SignalConfig::default().with_hop_length(256).with_frame_length(1024));

    let highlights = detect(&media, &ViralityScorer::new(config)).await;
    assert_eq!(highlights.len(), 1);
    // Half-second hops: the window lands on the burst within a frame.
    assert!((highlights[0].start - 30.0).abs() <= 1.0, "start {}", highlights[0].start);
}
