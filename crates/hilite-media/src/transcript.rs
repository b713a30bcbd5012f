//! Transcriber collaborator and transcript loading.
//!
//! Transcripts are produced out of band; highlight scoring accepts a
//! transcript path but does not read it.

use std::path::Path;

use async_trait::async_trait;
use hilite_models::Transcript;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// Speech-to-text service.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio of `path` with the named model size.
    async fn transcribe(&self, path: &Path, model_size: &str) -> MediaResult<Transcript>;
}

/// Transcriber used when no speech model is available.
#[derive(Debug, Clone, Default)]
pub struct StubTranscriber;

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, path: &Path, model_size: &str) -> MediaResult<Transcript> {
        warn!(
            path = %path.display(),
            model_size,
            "No speech model available, using empty transcript"
        );
        Ok(Transcript::empty())
    }
}

/// Read a transcript JSON file.
///
/// Missing or malformed files yield an empty transcript.
pub async fn load_transcript(path: &Path) -> Transcript {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Transcript unreadable, using empty transcript");
            return Transcript::empty();
        }
    };

    match serde_json::from_slice::<Transcript>(&bytes) {
        Ok(t) => {
            debug!(
                path = %path.display(),
                segments = t.segments.len(),
                "Loaded transcript"
            );
            t
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Transcript malformed, using empty transcript");
            Transcript::empty()
        }
    }
}
