use std::cmp::Ordering;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Video metadata as dumped by the provider in JSON mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One entry of the provider's format list.
///
/// The provider reports absent tracks as the literal string `"none"`, so both
/// codec fields need the same present-and-not-"none" treatment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamFormat {
    pub format_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

fn codec_present(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| c != "none")
}

impl StreamFormat {
    pub fn has_video(&self) -> bool {
        codec_present(&self.vcodec)
    }

    pub fn has_audio(&self) -> bool {
        codec_present(&self.acodec)
    }

    /// Video track only, audio delivered separately.
    pub fn is_adaptive_video(&self) -> bool {
        self.has_video() && !self.has_audio()
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }
}

impl VideoMetadata {
    /// Highest-resolution adaptive video-only stream in an MP4 container.
    pub fn best_adaptive_video(&self) -> Option<&StreamFormat> {
        self.formats
            .iter()
            .filter(|f| f.is_adaptive_video() && f.ext == "mp4" && f.url.is_some())
            .max_by_key(|f| f.height.unwrap_or(0))
    }

    /// Best audio-only stream in the MP4 family (`m4a`), by average bitrate.
    pub fn best_audio_only(&self) -> Option<&StreamFormat> {
        self.formats
            .iter()
            .filter(|f| f.is_audio_only() && f.ext == "m4a" && f.url.is_some())
            .max_by(|a, b| {
                a.abr
                    .unwrap_or(0.0)
                    .partial_cmp(&b.abr.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub ytdlp_bin: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: PathBuf::from("yt-dlp"),
        }
    }
}
