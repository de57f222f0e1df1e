use std::path::{Path, PathBuf};

use crate::utils::sanitize_title;

/// What the user sees after a successful search.
#[derive(Debug, Clone)]
pub struct VideoPreview {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

/// Lifecycle of the single in-memory session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    Previewed,
    Downloading,
    Completed,
    Failed,
}

impl SessionPhase {
    /// Download is only offered once a search has succeeded.
    pub fn can_download(self) -> bool {
        self == Self::Previewed
    }

    /// A new search may start whenever nothing is in flight.
    pub fn can_search(self) -> bool {
        !matches!(self, Self::Searching | Self::Downloading)
    }

    pub fn can_reset(self) -> bool {
        !matches!(self, Self::Idle | Self::Searching | Self::Downloading)
    }
}

/// The three files a download produces, derived from title + target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

impl DownloadPaths {
    pub fn derive(title: &str, directory: &Path) -> Self {
        let safe_title = sanitize_title(title);

        Self {
            video: directory.join(format!("{safe_title}_video.mp4")),
            audio: directory.join(format!("{safe_title}_audio.mp4")),
            output: directory.join(format!("{safe_title}_HQ.mp4")),
        }
    }
}

/// Everything needed to run a download, resolved before any file is written.
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub video_url: String,
    pub audio_url: String,
    pub paths: DownloadPaths,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_paths_sanitizes_title() {
        let paths = DownloadPaths::derive("My Clip: Part/1", Path::new("/tmp/out"));

        assert_eq!(
            paths.video,
            PathBuf::from("/tmp/out/My_Clip:_Part_1_video.mp4")
        );
        assert_eq!(
            paths.audio,
            PathBuf::from("/tmp/out/My_Clip:_Part_1_audio.mp4")
        );
        assert_eq!(paths.output, PathBuf::from("/tmp/out/My_Clip:_Part_1_HQ.mp4"));
    }

    #[test]
    fn test_phase_gating() {
        assert!(SessionPhase::Previewed.can_download());
        assert!(!SessionPhase::Idle.can_download());
        assert!(!SessionPhase::Searching.can_download());
        assert!(!SessionPhase::Downloading.can_download());
        assert!(!SessionPhase::Failed.can_download());

        assert!(SessionPhase::Idle.can_search());
        assert!(SessionPhase::Failed.can_search());
        assert!(!SessionPhase::Searching.can_search());
        assert!(!SessionPhase::Downloading.can_search());

        assert!(SessionPhase::Previewed.can_reset());
        assert!(SessionPhase::Completed.can_reset());
        assert!(SessionPhase::Failed.can_reset());
        assert!(!SessionPhase::Idle.can_reset());
    }
}
