use std::path::PathBuf;

use futures::StreamExt;
use iced::widget::image::Handle;
use iced::Task;

use crate::api::{ProviderClient, ProviderConfig, VideoMetadata};
use crate::application::{DownloadCoordinator, DownloadEvent, Track};
use crate::domain::{SessionPhase, VideoPreview};
use crate::media::{Merger, MuxerConfig};
use crate::ui::{SessionMessage, SessionView};

pub struct DownloaderApp {
    view: SessionView,
    coordinator: DownloadCoordinator,
    // Provider listing for the currently previewed video; cleared on reset
    // and replaced on every new search.
    current_video: Option<VideoMetadata>,
}

impl Default for DownloaderApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloaderApp {
    pub fn new() -> Self {
        let coordinator = DownloadCoordinator::new(
            ProviderClient::new(ProviderConfig::default()),
            Merger::new(MuxerConfig::default()),
        );

        Self {
            view: SessionView::default(),
            coordinator,
            current_video: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(SessionMessage),
    /// Metadata lookup finished (preview + full format listing).
    PreviewReceived(Result<(VideoPreview, VideoMetadata), String>),
    /// Thumbnail fetched and decoded; failure is non-fatal.
    ThumbnailLoaded(Result<Handle, String>),
    /// The folder dialog closed.
    DownloadDirSelected(Option<PathBuf>),
    /// Progress from the download/merge pipeline.
    Pipeline(DownloadEvent),
}

pub fn update(app: &mut DownloaderApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                SessionMessage::SearchPressed => {
                    if !app.view.phase.can_search() {
                        return Task::none();
                    }

                    let input = app.view.url_input.trim().to_string();
                    if input.is_empty() {
                        app.view.status_message = "Please enter a YouTube URL.".to_string();
                        return Task::none();
                    }

                    app.view.phase = SessionPhase::Searching;
                    app.view.video_title.clear();
                    app.view.thumbnail = None;
                    app.view.status_message = "Fetching video details...".to_string();
                    app.current_video = None;

                    let coordinator = app.coordinator.clone();
                    return Task::perform(
                        async move {
                            coordinator
                                .prepare_session(&input)
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::PreviewReceived,
                    );
                }
                SessionMessage::DownloadPressed => {
                    if !app.view.phase.can_download() || app.current_video.is_none() {
                        return Task::none();
                    }

                    app.view.status_message = "Select a download folder...".to_string();

                    let coordinator = app.coordinator.clone();
                    return Task::perform(
                        async move { coordinator.choose_download_dir().await },
                        Message::DownloadDirSelected,
                    );
                }
                SessionMessage::ResetPressed => {
                    app.view.reset();
                    app.current_video = None;
                }
                SessionMessage::UrlChanged(_) => {}
            }
        }
        Message::PreviewReceived(result) => match result {
            Ok((preview, metadata)) => {
                app.view.phase = SessionPhase::Previewed;
                app.view.video_title = preview.title.clone();
                app.view.status_message =
                    "Video found. Please confirm and download.".to_string();
                app.current_video = Some(metadata);

                if let Some(thumbnail_url) = preview.thumbnail_url {
                    let coordinator = app.coordinator.clone();
                    return Task::perform(
                        async move {
                            coordinator
                                .load_thumbnail(thumbnail_url)
                                .await
                                .map(|img| Handle::from_rgba(img.width, img.height, img.rgba))
                                .map_err(|e| e.to_string())
                        },
                        Message::ThumbnailLoaded,
                    );
                }
            }
            Err(e) => {
                app.view.phase = SessionPhase::Failed;
                app.view.status_message = format!("Failed to fetch video details: {}", e);
            }
        },
        Message::ThumbnailLoaded(result) => match result {
            Ok(handle) => {
                app.view.thumbnail = Some(handle);
            }
            Err(_) => {
                // Preview continues title-only.
                app.view.status_message = "Failed to load thumbnail.".to_string();
            }
        },
        Message::DownloadDirSelected(choice) => match choice {
            Some(directory) => {
                let Some(metadata) = app.current_video.as_ref() else {
                    return Task::none();
                };

                match app.coordinator.plan_download(metadata, &directory) {
                    Ok(plan) => {
                        app.view.phase = SessionPhase::Downloading;
                        app.view.progress = 0.0;
                        app.view.status_message = "Downloading video...".to_string();
                        return Task::stream(app.coordinator.run(plan).map(Message::Pipeline));
                    }
                    Err(e) => {
                        app.view.status_message = e.to_string();
                    }
                }
            }
            None => {
                // User closed the dialog; the preview stays usable.
                app.view.status_message = "Download cancelled.".to_string();
            }
        },
        Message::Pipeline(event) => match event {
            DownloadEvent::TrackStarted(track) => {
                app.view.progress = 0.0;
                app.view.status_message = match track {
                    Track::Video => "Downloading video...".to_string(),
                    Track::Audio => "Downloading audio...".to_string(),
                };
            }
            DownloadEvent::Progress(_, progress) => {
                app.view.progress = progress;
            }
            DownloadEvent::Merging => {
                app.view.progress = 1.0;
                app.view.status_message = "Merging video and audio...".to_string();
            }
            DownloadEvent::Completed(path) => {
                app.view.phase = SessionPhase::Completed;
                app.view.progress = 0.0;
                app.view.status_message =
                    format!("Download complete! Saved at: {}", path.display());
            }
            DownloadEvent::Failed(e) => {
                app.view.phase = SessionPhase::Failed;
                app.view.progress = 0.0;
                app.view.status_message = format!("Download failed: {}", e);
            }
        },
    }
    Task::none()
}

pub fn view(app: &DownloaderApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
