//! FFmpeg decoders that stream raw samples or frames to stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Output target that streams decoded data to the parent's stdout.
pub const PIPE_OUTPUT: &str = "pipe:1";

/// Bytes of FFmpeg diagnostics kept for error reports.
pub const STDERR_CAPTURE_LIMIT: usize = 16 * 1024;

/// FFmpeg invocation decoding one input to raw data on stdout.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    /// Decoder arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    fn decode(input: impl AsRef<Path>, output_args: Vec<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_args,
        }
    }

    /// Decode the first audio stream to mono 32-bit float PCM.
    ///
    /// `sample_rate` of `None` keeps the stream's native rate.
    pub fn mono_f32_pcm(input: impl AsRef<Path>, sample_rate: Option<u32>) -> Self {
        let mut args: Vec<String> = vec!["-vn".into(), "-ac".into(), "1".into()];
        if let Some(rate) = sample_rate {
            args.push("-ar".into());
            args.push(rate.to_string());
        }
        args.extend(["-f".into(), "f32le".into()]);
        Self::decode(input, args)
    }

    /// Decode the first video stream to 8-bit grayscale raw frames.
    pub fn gray_rawvideo(input: impl AsRef<Path>) -> Self {
        let args = ["-an", "-pix_fmt", "gray", "-f", "rawvideo"]
            .into_iter()
            .map(String::from)
            .collect();
        Self::decode(input, args)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-v".into(), "error".into(), "-nostdin".into()];
        args.push("-i".into());
        args.push(self.input.to_string_lossy().to_string());
        args.extend(self.output_args.iter().cloned());
        args.push(PIPE_OUTPUT.into());
        args
    }

    fn spawn(&self) -> MediaResult<Child> {
        check_ffmpeg()?;

        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        Ok(child)
    }

    /// Spawn FFmpeg for incremental reads of stdout.
    ///
    /// Stderr is drained in the background so a chatty decoder can never
    /// stall on a full pipe while the caller waits on stdout; the handle
    /// resolves to the first [`STDERR_CAPTURE_LIMIT`] bytes.
    pub fn stream(&self) -> MediaResult<(Child, JoinHandle<String>)> {
        let mut child = self.spawn()?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr not captured"))?;
        Ok((child, drain_stderr(stderr, STDERR_CAPTURE_LIMIT)))
    }

    /// Run FFmpeg to completion and collect stdout.
    pub async fn output(&self) -> MediaResult<Vec<u8>> {
        let output = self.spawn()?.wait_with_output().await?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
                output.status.code(),
            ));
        }

        Ok(output.stdout)
    }
}

/// Read `stderr` to EOF, keeping at most `limit` bytes.
fn drain_stderr(mut stderr: ChildStderr, limit: usize) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut kept = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            match stderr.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let room = limit.saturating_sub(kept.len());
                    kept.extend_from_slice(&chunk[..n.min(room)]);
                }
            }
        }
        String::from_utf8_lossy(&kept).trim().to_string()
    })
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_args_native_rate() {
        let args = FfmpegCommand::mono_f32_pcm("clip.mp4", None).build_args();
        assert_eq!(args[..3], ["-v", "error", "-nostdin"]);
        assert!(!args.contains(&"-y".to_string()));
        assert!(!args.contains(&"-ar".to_string()));
        let pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[pos + 1], "clip.mp4");
        assert_eq!(args[args.len() - 2..], ["f32le", PIPE_OUTPUT]);
    }

    #[test]
    fn test_pcm_args_fixed_rate() {
        let args = FfmpegCommand::mono_f32_pcm("clip.mp4", Some(22050)).build_args();
        let pos = args.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(args[pos + 1], "22050");
        let ac = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[ac + 1], "1");
    }

    #[test]
    fn test_gray_rawvideo_args() {
        let args = FfmpegCommand::gray_rawvideo("clip.mp4").build_args();
        let pos = args.iter().position(|a| a == "-pix_fmt").unwrap();
        assert_eq!(args[pos + 1], "gray");
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args[args.len() - 2..], ["rawvideo", PIPE_OUTPUT]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_drain_stderr_caps_capture() {
        let mut child = Command::new("sh")
            .args(["-c", "head -c 100000 /dev/zero | tr '\\0' 'x' >&2"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let drained = drain_stderr(child.stderr.take().unwrap(), 1000);
        assert!(child.wait().await.unwrap().success());
        let kept = drained.await.unwrap();
        assert_eq!(kept.len(), 1000);
        assert!(kept.chars().all(|c| c == 'x'));
    }
}
