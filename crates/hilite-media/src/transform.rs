//! Media transform collaborator.
//!
//! The scoring core only ever asks the media layer for two things: a mono
//! waveform and a lazy sequence of grayscale frames. [`MediaTransform`] is
//! that boundary; [`FfmpegTransform`] implements it with the FFmpeg CLI.

use std::path::Path;

use async_trait::async_trait;
use image::GrayImage;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// A lazy, forward-only sequence of decoded grayscale frames.
#[async_trait]
pub trait FrameStream: Send {
    /// Next frame, or `None` once the stream is exhausted.
    async fn next_frame(&mut self) -> MediaResult<Option<GrayImage>>;

    /// Source frame rate, when known.
    fn frame_rate(&self) -> Option<f64> {
        None
    }
}

/// Decoding service used by the signal extractors.
#[async_trait]
pub trait MediaTransform: Send + Sync {
    /// Decode the first audio stream to a mono waveform.
    ///
    /// `sample_rate` of `None` keeps the native rate.
    async fn decode_waveform(&self, path: &Path, sample_rate: Option<u32>) -> MediaResult<Waveform>;

    /// Open the first video stream as a sequence of grayscale frames.
    async fn open_gray_frames(&self, path: &Path) -> MediaResult<Box<dyn FrameStream>>;
}

/// FFmpeg-backed media transform.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTransform;

impl FfmpegTransform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaTransform for FfmpegTransform {
    async fn decode_waveform(&self, path: &Path, sample_rate: Option<u32>) -> MediaResult<Waveform> {
        let rate = match sample_rate {
            Some(rate) => rate,
            None => probe_media(path).await?.sample_rate.ok_or_else(|| {
                MediaError::InvalidMedia(format!("No audio stream in {}", path.display()))
            })?,
        };

        let bytes = FfmpegCommand::mono_f32_pcm(path, Some(rate)).output().await?;

        let samples = pcm_f32le_to_samples(&bytes);
        debug!(
            path = %path.display(),
            samples = samples.len(),
            sample_rate = rate,
            "Decoded waveform"
        );

        Ok(Waveform::new(samples, rate))
    }

    async fn open_gray_frames(&self, path: &Path) -> MediaResult<Box<dyn FrameStream>> {
        let info = probe_media(path).await?;
        if !info.has_video() {
            return Err(MediaError::InvalidMedia(format!(
                "No video stream in {}",
                path.display()
            )));
        }

        let (mut child, stderr) = FfmpegCommand::gray_rawvideo(path).stream()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stdout not captured"))?;

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            "Streaming grayscale frames"
        );

        Ok(Box::new(FfmpegFrameStream {
            child,
            stdout,
            stderr: Some(stderr),
            width: info.width,
            height: info.height,
            fps: info.fps,
            frames_read: 0,
            finished: false,
        }))
    }
}

/// Frames read one at a time from FFmpeg's rawvideo output.
struct FfmpegFrameStream {
    child: Child,
    stdout: ChildStdout,
    /// Background drain of FFmpeg's diagnostics
    stderr: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
    fps: f64,
    frames_read: u64,
    finished: bool,
}

impl FfmpegFrameStream {
    async fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;
        let status = self.child.wait().await?;
        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.ok().filter(|s| !s.is_empty()),
            None => None,
        };
        if !status.success() && self.frames_read == 0 {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg produced no frames",
                stderr,
                status.code(),
            ));
        }
        if !status.success() {
            warn!(
                frames = self.frames_read,
                exit_code = ?status.code(),
                stderr = stderr.as_deref().unwrap_or(""),
                "FFmpeg exited early, using frames decoded so far"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl FrameStream for FfmpegFrameStream {
    async fn next_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.width as usize * self.height as usize];
        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => {
                self.frames_read += 1;
                GrayImage::from_raw(self.width, self.height, buf)
                    .map(Some)
                    .ok_or_else(|| MediaError::internal("Frame buffer size mismatch"))
            }
            // A trailing partial frame is dropped.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn frame_rate(&self) -> Option<f64> {
        (self.fps > 0.0).then_some(self.fps)
    }
}

/// Convert raw little-endian f32 bytes to samples (4 bytes per sample).
pub fn pcm_f32le_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_conversion() {
        let test_samples: Vec<f32> = vec![0.0, 0.5, 1.0, -1.0];
        let mut bytes: Vec<u8> = test_samples.iter().flat_map(|f| f.to_le_bytes()).collect();
        // Trailing partial sample is ignored
        bytes.push(0x7f);

        let loaded = pcm_f32le_to_samples(&bytes);
        assert_eq!(loaded, test_samples);
    }

    #[test]
    fn test_waveform_duration() {
        let wf = Waveform::new(vec![0.0; 44100], 22050);
        assert!((wf.duration() - 2.0).abs() < 1e-9);
        assert_eq!(Waveform::new(vec![0.0; 10], 0).duration(), 0.0);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let transform = FfmpegTransform::new();
        let result = transform
            .open_gray_frames(Path::new("/nonexistent/video.mp4"))
            .await;
        assert!(result.is_err());
    }
}
