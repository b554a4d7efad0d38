//! Embedded YouTube players (`www.youtube.com/embed/...`).
//!
//! Embeds have no Polymer app around them, so everything is read from the
//! player chrome and the `<video>` element.

use super::youtube::{enabled, NEXT, PREVIOUS, VIDEO};
use super::{media_command, media_element_state, media_state_of, text_of, Site};
use crate::page::{MediaCommand, Page};
use crate::selectors;
use crate::types::{ControlError, RepeatMode, StateMode};
use async_trait::async_trait;

const TITLE: &str = ".ytp-title-link";
const CHANNEL: &str = ".ytp-title-channel-name";

#[derive(Debug, Default)]
pub struct YouTubeEmbedSite;

impl YouTubeEmbedSite {
    pub fn new() -> Self {
        Self
    }

    fn media(&self, page: &dyn Page) -> Option<crate::page::MediaElementState> {
        media_state_of(page, VIDEO)
    }
}

/// Video id from an `/embed/<id>` path
fn video_id(pathname: &str) -> Option<&str> {
    pathname
        .strip_prefix("/embed/")
        .and_then(|rest| rest.split(['/', '?']).next())
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl Site for YouTubeEmbedSite {
    fn name(&self) -> &'static str {
        "YouTube Embeds"
    }

    fn matches(&self, page: &dyn Page) -> bool {
        page.hostname() == "www.youtube.com" && page.pathname().starts_with("/embed")
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.exists(VIDEO)
    }

    fn player(&self, _page: &dyn Page) -> Option<String> {
        Some(self.name().to_string())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        Some(
            self.media(page)
                .map(|m| media_element_state(&m))
                .unwrap_or(StateMode::Stopped),
        )
    }

    fn title(&self, page: &dyn Page) -> Option<String> {
        Some(text_of(page, TITLE, "title"))
    }

    fn artist(&self, page: &dyn Page) -> Option<String> {
        Some(text_of(page, CHANNEL, "artist"))
    }

    fn cover(&self, page: &dyn Page) -> Option<String> {
        let pathname = page.pathname();
        Some(
            video_id(&pathname)
                .map(|id| format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", id))
                .unwrap_or_default(),
        )
    }

    fn duration(&self, page: &dyn Page) -> Option<f64> {
        Some(
            self.media(page)
                .map(|m| m.duration)
                .filter(|d| d.is_finite())
                .unwrap_or(0.0),
        )
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        Some(self.media(page).map(|m| m.current_time).unwrap_or(0.0))
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let media = self.media(page)?;
        Some(if media.muted { 0.0 } else { media.volume * 100.0 })
    }

    fn repeat(&self, page: &dyn Page) -> Option<RepeatMode> {
        let looping = self.media(page).map(|m| m.looping).unwrap_or(false);
        Some(if looping { RepeatMode::One } else { RepeatMode::None })
    }

    fn can_skip_previous(&self, page: &dyn Page) -> bool {
        enabled(page, PREVIOUS)
    }

    fn can_skip_next(&self, page: &dyn Page) -> bool {
        enabled(page, NEXT)
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        let command = match state {
            StateMode::Playing => MediaCommand::Play,
            StateMode::Paused | StateMode::Stopped => MediaCommand::Pause,
        };
        media_command(page, VIDEO, command, "setState");
        Ok(())
    }

    async fn skip_previous(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, PREVIOUS, "skipPrevious");
        Ok(())
    }

    async fn skip_next(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, NEXT, "skipNext");
        Ok(())
    }

    async fn set_position_seconds(&self, page: &dyn Page, seconds: f64) -> Result<(), ControlError> {
        media_command(page, VIDEO, MediaCommand::Seek { seconds }, "setPositionSeconds");
        Ok(())
    }

    async fn set_position_percentage(&self, page: &dyn Page, percentage: f64) -> Result<(), ControlError> {
        let duration = self.duration(page).unwrap_or(0.0);
        self.set_position_seconds(page, percentage * duration).await
    }

    async fn set_volume(&self, page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let volume = f64::from(volume) / 100.0;
        media_command(page, VIDEO, MediaCommand::SetVolume { volume }, "setVolume");
        Ok(())
    }

    async fn toggle_repeat(&self, page: &dyn Page) -> Result<(), ControlError> {
        let looping = self.media(page).map(|m| m.looping).unwrap_or(false);
        media_command(page, VIDEO, MediaCommand::SetLoop { enabled: !looping }, "toggleRepeat");
        Ok(())
    }
}
