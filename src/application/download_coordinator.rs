use std::path::{Path, PathBuf};

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::{
    api::{ProviderClient, VideoMetadata},
    domain::{AppError, DownloadPaths, DownloadPlan, VideoPreview},
    media::Merger,
    utils::{decode_thumbnail, extract_video_id, DecodedImage},
};

/// Which half of the adaptive pair is currently on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Video,
    Audio,
}

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    TrackStarted(Track),
    Progress(Track, f32),
    Merging,
    Completed(PathBuf),
    Failed(AppError),
}

/// Orchestrates one session: metadata lookup, thumbnail, stream downloads
/// and the final merge. Owns no UI state; everything is reported back as
/// values or as a stream of [`DownloadEvent`]s.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: ProviderClient,
    merger: Merger,
}

impl DownloadCoordinator {
    pub fn new(client: ProviderClient, merger: Merger) -> Self {
        Self { client, merger }
    }

    /// Look up metadata for the pasted URL and build the preview.
    pub async fn prepare_session(
        &self,
        raw_input: &str,
    ) -> Result<(VideoPreview, VideoMetadata), AppError> {
        let video_id = extract_video_id(raw_input).ok_or(AppError::InvalidInput)?;
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);

        let metadata = self
            .client
            .fetch_metadata(&watch_url)
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        info!(video_id, title = %metadata.title, "video found");

        let preview = VideoPreview {
            video_id,
            title: metadata.title.clone(),
            thumbnail_url: metadata.thumbnail.clone(),
        };

        Ok((preview, metadata))
    }

    /// Fetch and decode the preview thumbnail.
    pub async fn load_thumbnail(&self, url: String) -> Result<DecodedImage, AppError> {
        let bytes = self
            .client
            .fetch_thumbnail(&url)
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        decode_thumbnail(&bytes)
    }

    /// Ask the user where the download should land.
    pub async fn choose_download_dir(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    /// Resolve both streams and all target paths. No file is touched here;
    /// a missing stream aborts the download before anything is written.
    pub fn plan_download(
        &self,
        metadata: &VideoMetadata,
        directory: &Path,
    ) -> Result<DownloadPlan, AppError> {
        let video = metadata
            .best_adaptive_video()
            .ok_or(AppError::StreamsUnavailable)?;
        let audio = metadata
            .best_audio_only()
            .ok_or(AppError::StreamsUnavailable)?;

        let (Some(video_url), Some(audio_url)) = (video.url.clone(), audio.url.clone()) else {
            return Err(AppError::StreamsUnavailable);
        };

        Ok(DownloadPlan {
            video_url,
            audio_url,
            paths: DownloadPaths::derive(&metadata.title, directory),
        })
    }

    /// Run the whole pipeline: video download, audio download, merge.
    /// The first failure emits a terminal [`DownloadEvent::Failed`].
    pub fn run(&self, plan: DownloadPlan) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RunState::Start {
                client: self.client.clone(),
                merger: self.merger.clone(),
                plan,
            },
            |state| async move {
                match state {
                    RunState::Start {
                        client,
                        merger,
                        plan,
                    } => Some((
                        DownloadEvent::TrackStarted(Track::Video),
                        RunState::OpenTrack {
                            track: Track::Video,
                            client,
                            merger,
                            plan,
                        },
                    )),
                    RunState::OpenTrack {
                        track,
                        client,
                        merger,
                        plan,
                    } => {
                        let path = match track {
                            Track::Video => plan.paths.video.clone(),
                            Track::Audio => plan.paths.audio.clone(),
                        };
                        let url = match track {
                            Track::Video => plan.video_url.clone(),
                            Track::Audio => plan.audio_url.clone(),
                        };

                        let file = match tokio::fs::File::create(&path).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    RunState::Finished,
                                ));
                            }
                        };

                        match client.download_file_stream(&url).await {
                            Ok((total, stream)) => Some((
                                DownloadEvent::Progress(track, 0.0),
                                RunState::Streaming {
                                    track,
                                    file,
                                    stream: stream.boxed(),
                                    downloaded: 0,
                                    total,
                                    client,
                                    merger,
                                    plan,
                                },
                            )),
                            Err(e) => Some((
                                DownloadEvent::Failed(AppError::Provider(e.to_string())),
                                RunState::Finished,
                            )),
                        }
                    }
                    RunState::Streaming {
                        track,
                        mut file,
                        mut stream,
                        mut downloaded,
                        total,
                        client,
                        merger,
                        plan,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    RunState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;

                            let progress = match total {
                                Some(total_size) if total_size > 0 => {
                                    downloaded as f32 / total_size as f32
                                }
                                _ => 0.0,
                            };

                            Some((
                                DownloadEvent::Progress(track, progress),
                                RunState::Streaming {
                                    track,
                                    file,
                                    stream,
                                    downloaded,
                                    total,
                                    client,
                                    merger,
                                    plan,
                                },
                            ))
                        }
                        Some(Err(e)) => Some((
                            DownloadEvent::Failed(AppError::Provider(e.to_string())),
                            RunState::Finished,
                        )),
                        None => {
                            if let Err(e) = file.sync_all().await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to sync file: {}",
                                        e
                                    ))),
                                    RunState::Finished,
                                ));
                            }

                            match track {
                                Track::Video => Some((
                                    DownloadEvent::TrackStarted(Track::Audio),
                                    RunState::OpenTrack {
                                        track: Track::Audio,
                                        client,
                                        merger,
                                        plan,
                                    },
                                )),
                                Track::Audio => Some((
                                    DownloadEvent::Merging,
                                    RunState::Merge { merger, plan },
                                )),
                            }
                        }
                    },
                    RunState::Merge { merger, plan } => {
                        match merger
                            .merge(&plan.paths.video, &plan.paths.audio, &plan.paths.output)
                            .await
                        {
                            Ok(()) => Some((
                                DownloadEvent::Completed(plan.paths.output.clone()),
                                RunState::Finished,
                            )),
                            Err(e) => Some((DownloadEvent::Failed(e), RunState::Finished)),
                        }
                    }
                    RunState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum RunState {
    Start {
        client: ProviderClient,
        merger: Merger,
        plan: DownloadPlan,
    },
    OpenTrack {
        track: Track,
        client: ProviderClient,
        merger: Merger,
        plan: DownloadPlan,
    },
    Streaming {
        track: Track,
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        downloaded: u64,
        total: Option<u64>,
        client: ProviderClient,
        merger: Merger,
        plan: DownloadPlan,
    },
    Merge {
        merger: Merger,
        plan: DownloadPlan,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProviderConfig;
    use crate::media::MuxerConfig;
    use std::path::PathBuf;

    fn metadata_with_formats(formats_json: &str) -> VideoMetadata {
        let json = format!(
            r#"{{"id": "dQw4w9WgXcQ", "title": "My Clip: Part/1", "formats": {}}}"#,
            formats_json
        );
        serde_json::from_str(&json).unwrap()
    }

    fn coordinator(merger_bin: &str) -> DownloadCoordinator {
        DownloadCoordinator::new(
            ProviderClient::new(ProviderConfig::default()),
            Merger::new(MuxerConfig {
                ffmpeg_bin: PathBuf::from(merger_bin),
            }),
        )
    }

    #[test]
    fn test_plan_download_selects_streams_and_paths() {
        let meta = metadata_with_formats(
            r#"[
                {"format_id": "140", "url": "https://cdn.example/a", "ext": "m4a",
                 "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5},
                {"format_id": "137", "url": "https://cdn.example/v", "ext": "mp4",
                 "vcodec": "avc1.640028", "acodec": "none", "height": 1080}
            ]"#,
        );

        let plan = coordinator("true")
            .plan_download(&meta, Path::new("/tmp/out"))
            .unwrap();

        assert_eq!(plan.video_url, "https://cdn.example/v");
        assert_eq!(plan.audio_url, "https://cdn.example/a");
        assert_eq!(
            plan.paths.output,
            PathBuf::from("/tmp/out/My_Clip:_Part_1_HQ.mp4")
        );
    }

    #[test]
    fn test_plan_download_aborts_without_streams() {
        // Progressive-only listing: nothing qualifies as adaptive.
        let meta = metadata_with_formats(
            r#"[{"format_id": "18", "url": "https://cdn.example/p", "ext": "mp4",
                 "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360}]"#,
        );

        let err = coordinator("true")
            .plan_download(&meta, Path::new("/tmp/out"))
            .unwrap_err();

        assert!(matches!(err, AppError::StreamsUnavailable));
    }

    #[test]
    fn test_prepare_session_rejects_bad_input_without_provider() {
        // Uses a nonexistent binary: proves invalid input fails fast,
        // before the provider is ever spawned.
        let coordinator = DownloadCoordinator::new(
            ProviderClient::new(ProviderConfig {
                ytdlp_bin: PathBuf::from("/nonexistent/fake-yt-dlp"),
            }),
            Merger::new(MuxerConfig::default()),
        );

        let result = futures::executor::block_on(coordinator.prepare_session("not a url"));
        assert!(matches!(result, Err(AppError::InvalidInput)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_downloads_both_tracks_then_merges() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/video")
            .with_status(200)
            .with_body(b"video-bytes")
            .create_async()
            .await;
        server
            .mock("GET", "/audio")
            .with_status(200)
            .with_body(b"audio-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let paths = DownloadPaths::derive("clip", dir.path());
        let plan = DownloadPlan {
            video_url: format!("{}/video", server.url()),
            audio_url: format!("{}/audio", server.url()),
            paths: paths.clone(),
        };

        // `true` stands in for ffmpeg, so the merge step succeeds and the
        // temp inputs get cleaned up.
        let events: Vec<_> = coordinator("true").run(plan).collect().await;

        assert!(matches!(
            events.first(),
            Some(DownloadEvent::TrackStarted(Track::Video))
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, DownloadEvent::TrackStarted(Track::Audio))));
        assert!(events.iter().any(|e| matches!(e, DownloadEvent::Merging)));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));

        assert!(!paths.video.exists());
        assert!(!paths.audio.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_failed_merge_reports_and_keeps_temps() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/video")
            .with_status(200)
            .with_body(b"video-bytes")
            .create_async()
            .await;
        server
            .mock("GET", "/audio")
            .with_status(200)
            .with_body(b"audio-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let paths = DownloadPaths::derive("clip", dir.path());
        let plan = DownloadPlan {
            video_url: format!("{}/video", server.url()),
            audio_url: format!("{}/audio", server.url()),
            paths: paths.clone(),
        };

        let events: Vec<_> = coordinator("false").run(plan).collect().await;

        assert!(matches!(
            events.last(),
            Some(DownloadEvent::Failed(AppError::Merge(_)))
        ));
        assert!(paths.video.exists());
        assert!(paths.audio.exists());
        assert_eq!(std::fs::read(&paths.video).unwrap(), b"video-bytes");
        assert_eq!(std::fs::read(&paths.audio).unwrap(), b"audio-bytes");
    }
}
