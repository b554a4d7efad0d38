//! YouTube Music adapter.
//!
//! Metadata and play state come from the media session. The player bar's
//! volume lives on its internal player API, reached over the bridge.

use super::refresh::{BridgeState, DEFAULT_REFRESH};
use super::{apply_rating, media_session_state, Site};
use crate::bridge::BridgeClient;
use crate::page::Page;
use crate::rating::{DISLIKED, LIKED};
use crate::selectors;
use crate::types::{ControlError, RatingSystem, RepeatMode, StateMode};
use crate::util::media_session_cover;
use async_trait::async_trait;
use std::time::Duration;

const PLAYER_BAR: &str = "ytmusic-player-bar";
const PROGRESS: &str = "#progress-bar";
const PLAY_PAUSE: &str = "#play-pause-button";
const PREVIOUS: &str = ".previous-button";
const NEXT: &str = ".next-button";
const REPEAT: &str = ".repeat";
const SHUFFLE: &str = ".shuffle";
const LIKE: &str = "#button-shape-like button";
const DISLIKE: &str = "#button-shape-dislike button";

#[derive(Debug)]
pub struct YouTubeMusicSite {
    volume: BridgeState<Option<f64>>,
}

impl YouTubeMusicSite {
    pub fn new() -> Self {
        Self::with_refresh(DEFAULT_REFRESH)
    }

    pub fn with_refresh(interval: Duration) -> Self {
        Self {
            volume: BridgeState::new(interval),
        }
    }

    fn progress(page: &dyn Page, attribute: &str, name: &str) -> f64 {
        selectors::query_report(
            page,
            PROGRESS,
            |el| el.attribute(attribute).and_then(|v| v.parse().ok()),
            0.0,
            name,
        )
    }

    fn pressed(page: &dyn Page, selector: &str) -> bool {
        selectors::query(
            page,
            selector,
            |el| el.attribute("aria-pressed").map(|v| v == "true"),
            false,
        )
    }
}

impl Default for YouTubeMusicSite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Site for YouTubeMusicSite {
    fn name(&self) -> &'static str {
        "YouTube Music"
    }

    fn matches(&self, page: &dyn Page) -> bool {
        page.hostname() == "music.youtube.com"
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.media_session().metadata.is_some() && page.exists(PLAYER_BAR)
    }

    fn rating_system(&self) -> RatingSystem {
        RatingSystem::LikeDislike
    }

    fn init(&self, _page: &dyn Page, bridge: Option<&BridgeClient>) {
        if let Some(bridge) = bridge {
            self.volume.start(self.name(), bridge, |client| async move {
                client.youtube_music_volume().await
            });
        }
    }

    fn player(&self, _page: &dyn Page) -> Option<String> {
        Some(self.name().to_string())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        Some(media_session_state(page))
    }

    fn title(&self, page: &dyn Page) -> Option<String> {
        Some(page.media_session().metadata.map(|m| m.title).unwrap_or_default())
    }

    fn artist(&self, page: &dyn Page) -> Option<String> {
        Some(page.media_session().metadata.map(|m| m.artist).unwrap_or_default())
    }

    fn album(&self, page: &dyn Page) -> Option<String> {
        Some(page.media_session().metadata.map(|m| m.album).unwrap_or_default())
    }

    fn cover(&self, page: &dyn Page) -> Option<String> {
        Some(media_session_cover(&page.media_session()))
    }

    fn duration(&self, page: &dyn Page) -> Option<f64> {
        Some(Self::progress(page, "aria-valuemax", "duration"))
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        Some(Self::progress(page, "aria-valuenow", "position"))
    }

    /// Only known once the bridge has answered
    fn volume(&self, _page: &dyn Page) -> Option<f64> {
        self.volume.get().flatten()
    }

    fn rating(&self, page: &dyn Page) -> Option<i64> {
        if Self::pressed(page, LIKE) {
            Some(LIKED)
        } else if Self::pressed(page, DISLIKE) {
            Some(DISLIKED)
        } else {
            Some(0)
        }
    }

    fn repeat(&self, page: &dyn Page) -> Option<RepeatMode> {
        let mode = selectors::query(page, PLAYER_BAR, |el| el.attribute("repeat-mode"), String::new());
        Some(match mode.as_str() {
            "ALL" => RepeatMode::All,
            "ONE" => RepeatMode::One,
            _ => RepeatMode::None,
        })
    }

    fn can_skip_previous(&self, page: &dyn Page) -> bool {
        page.exists(PREVIOUS)
    }

    fn can_skip_next(&self, page: &dyn Page) -> bool {
        page.exists(NEXT)
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        let playing = media_session_state(page) == StateMode::Playing;
        if playing != (state == StateMode::Playing) {
            selectors::click(page, PLAY_PAUSE, "setState");
        }
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

    async fn set_volume(&self, _page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let bridge = self.volume.bridge().ok_or(ControlError::Unsupported("setVolume"))?;
        bridge.set_youtube_music_volume(volume).await?;
        self.volume.set(Some(f64::from(volume)));
        Ok(())
    }

    async fn toggle_repeat(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, REPEAT, "toggleRepeat");
        Ok(())
    }

    async fn toggle_shuffle(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, SHUFFLE, "toggleShuffle");
        Ok(())
    }

    async fn set_rating(&self, page: &dyn Page, requested: u8) -> Result<(), ControlError> {
        let current = self.rating(page).unwrap_or(0);
        apply_rating(self.rating_system(), page, current, requested, LIKE, Some(DISLIKE))
    }
}
