use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::AppError;

/// Configuration for the muxer.
#[derive(Debug, Clone)]
pub struct MuxerConfig {
    pub ffmpeg_bin: PathBuf,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

/// Combines a video-only and an audio-only file into one MP4 via ffmpeg.
#[derive(Clone)]
pub struct Merger {
    config: MuxerConfig,
}

impl Merger {
    pub fn new(config: MuxerConfig) -> Self {
        Self { config }
    }

    /// Mux `video` and `audio` into `output` (H.264 video, AAC audio).
    ///
    /// Both temp inputs are removed after a successful merge. On failure they
    /// are deliberately left in place so the downloaded streams can still be
    /// salvaged by hand.
    pub async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), AppError> {
        info!(output = %output.display(), "merging video and audio");

        let result = Command::new(&self.config.ffmpeg_bin)
            .arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .arg("-map")
            .arg("0:v:0")
            .arg("-map")
            .arg("1:a:0")
            .arg("-c:v")
            .arg("libx264")
            .arg("-c:a")
            .arg("aac")
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                AppError::Merge(format!("{}: {}", self.config.ffmpeg_bin.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("ffmpeg exited with an error")
                .to_string();
            return Err(AppError::Merge(message));
        }

        for temp in [video, audio] {
            if let Err(e) = tokio::fs::remove_file(temp).await {
                warn!(path = %temp.display(), error = %e, "could not remove temp file");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merger_with_binary(name: &str) -> Merger {
        Merger::new(MuxerConfig {
            ffmpeg_bin: PathBuf::from(name),
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_merge_removes_temp_inputs_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip_video.mp4");
        let audio = dir.path().join("clip_audio.mp4");
        let output = dir.path().join("clip_HQ.mp4");
        std::fs::write(&video, b"v").unwrap();
        std::fs::write(&audio, b"a").unwrap();

        // `true` exits 0 and ignores the arguments, standing in for ffmpeg.
        let merger = merger_with_binary("true");
        merger.merge(&video, &audio, &output).await.unwrap();

        assert!(!video.exists());
        assert!(!audio.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_merge_failure_keeps_temp_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip_video.mp4");
        let audio = dir.path().join("clip_audio.mp4");
        let output = dir.path().join("clip_HQ.mp4");
        std::fs::write(&video, b"v").unwrap();
        std::fs::write(&audio, b"a").unwrap();

        let merger = merger_with_binary("false");
        let err = merger.merge(&video, &audio, &output).await.unwrap_err();

        assert!(matches!(err, AppError::Merge(_)));
        assert!(video.exists());
        assert!(audio.exists());
    }

    #[tokio::test]
    async fn test_merge_missing_binary() {
        let merger = merger_with_binary("/nonexistent/fake-ffmpeg");
        let err = merger
            .merge(
                Path::new("/tmp/v.mp4"),
                Path::new("/tmp/a.mp4"),
                Path::new("/tmp/out.mp4"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Merge(_)));
    }
}
