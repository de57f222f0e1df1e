use iced::{
    widget::{button, column, container, progress_bar, text, text_input, Space},
    Element, Length,
};

use crate::domain::SessionPhase;

/// Main view state
pub struct SessionView {
    pub url_input: String,
    pub phase: SessionPhase,
    pub video_title: String,
    pub thumbnail: Option<iced::widget::image::Handle>,
    pub status_message: String,
    pub progress: f32,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            phase: SessionPhase::Idle,
            video_title: String::new(),
            thumbnail: None,
            status_message: String::new(),
            progress: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionMessage {
    UrlChanged(String),
    SearchPressed,
    DownloadPressed,
    ResetPressed,
}

impl SessionView {
    pub fn update(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::UrlChanged(url) => {
                self.url_input = url;
            }
            // Orchestration for these lives in the app.
            SessionMessage::SearchPressed
            | SessionMessage::DownloadPressed
            | SessionMessage::ResetPressed => {}
        }
    }

    /// Back to a blank window: empty fields, disabled triggers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> Element<'_, SessionMessage> {
        let thumbnail: Element<'_, SessionMessage> = match &self.thumbnail {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(320.0))
                .height(Length::Fixed(180.0))
                .into(),
            None => container(text("No preview").size(14))
                .style(container::bordered_box)
                .width(Length::Fixed(320.0))
                .height(Length::Fixed(180.0))
                .padding(10)
                .into(),
        };

        let progress: Element<'_, SessionMessage> = if self.phase == SessionPhase::Downloading {
            progress_bar(0.0..=1.0, self.progress).into()
        } else {
            Space::new().height(Length::Fixed(0.0)).into()
        };

        column![
            text("Enter YouTube URL").size(24),
            Space::new().height(Length::Fixed(10.0)),
            text_input("Paste YouTube URL here...", &self.url_input)
                .on_input(SessionMessage::UrlChanged)
                .padding(10),
            button("Search")
                .on_press_maybe(
                    self.phase
                        .can_search()
                        .then_some(SessionMessage::SearchPressed)
                )
                .padding([5, 20]),
            text(&self.video_title).size(16),
            thumbnail,
            text(&self.status_message).size(14),
            progress,
            button("Download")
                .on_press_maybe(
                    self.phase
                        .can_download()
                        .then_some(SessionMessage::DownloadPressed)
                )
                .padding([5, 20]),
            button("Reset")
                .on_press_maybe(
                    self.phase
                        .can_reset()
                        .then_some(SessionMessage::ResetPressed)
                )
                .padding([5, 20]),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
