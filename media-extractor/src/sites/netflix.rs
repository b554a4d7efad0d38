//! Netflix adapter.
//!
//! Titles and episode navigation come from the page's player state over the
//! bridge. Seeking the `<video>` directly desyncs the player, so seeks go
//! through the player API as well.

use super::refresh::{BridgeState, DEFAULT_REFRESH};
use super::{media_command, media_element_state, media_state_of, Site};
use crate::bridge::{BridgeClient, NetflixInfo};
use crate::page::{MediaCommand, Page};
use crate::selectors;
use crate::types::{ControlError, StateMode};
use async_trait::async_trait;
use std::time::Duration;

const VIDEO: &str = "video";
const NEXT_EPISODE: &str = "[data-uia='control-next']";

#[derive(Debug)]
pub struct NetflixSite {
    info: BridgeState<NetflixInfo>,
}

impl NetflixSite {
    pub fn new() -> Self {
        Self::with_refresh(DEFAULT_REFRESH)
    }

    pub fn with_refresh(interval: Duration) -> Self {
        Self {
            info: BridgeState::new(interval),
        }
    }

    pub fn info(&self) -> Option<NetflixInfo> {
        self.info.get()
    }

    fn bridge(&self, event: &'static str) -> Result<BridgeClient, ControlError> {
        self.info.bridge().ok_or(ControlError::Unsupported(event))
    }
}

impl Default for NetflixSite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Site for NetflixSite {
    fn name(&self) -> &'static str {
        "Netflix"
    }

    fn matches(&self, page: &dyn Page) -> bool {
        page.hostname() == "www.netflix.com"
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.exists(VIDEO) && self.info().map(|i| i.is_player_ready).unwrap_or(false)
    }

    fn init(&self, _page: &dyn Page, bridge: Option<&BridgeClient>) {
        if let Some(bridge) = bridge {
            self.info
                .start(self.name(), bridge, |client| async move { client.netflix_info().await });
        }
    }

    fn player(&self, _page: &dyn Page) -> Option<String> {
        Some(self.name().to_string())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        Some(
            media_state_of(page, VIDEO)
                .map(|m| media_element_state(&m))
                .unwrap_or(StateMode::Stopped),
        )
    }

    /// Episode title for shows, the title itself for movies
    fn title(&self, _page: &dyn Page) -> Option<String> {
        let info = self.info()?;
        let title = info.episode_title().or(info.show_title()).unwrap_or_default();
        Some(title.to_string())
    }

    /// Show title, only for episodes
    fn artist(&self, _page: &dyn Page) -> Option<String> {
        let info = self.info()?;
        let artist = match info.episode_title() {
            Some(_) => info.show_title().unwrap_or_default(),
            None => "",
        };
        Some(artist.to_string())
    }

    /// `S1:E2` label, only for episodes
    fn album(&self, _page: &dyn Page) -> Option<String> {
        Some(self.info()?.episode_label().unwrap_or_default())
    }

    fn cover(&self, _page: &dyn Page) -> Option<String> {
        Some(self.info()?.artwork().unwrap_or_default())
    }

    fn duration(&self, page: &dyn Page) -> Option<f64> {
        Some(
            media_state_of(page, VIDEO)
                .map(|m| m.duration)
                .filter(|d| d.is_finite())
                .unwrap_or(0.0),
        )
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        Some(media_state_of(page, VIDEO).map(|m| m.current_time).unwrap_or(0.0))
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let media = media_state_of(page, VIDEO)?;
        Some(if media.muted { 0.0 } else { media.volume * 100.0 })
    }

    fn can_skip_next(&self, _page: &dyn Page) -> bool {
        self.info()
            .map(|i| i.nav_data.next_id.is_some())
            .unwrap_or(false)
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        let command = match state {
            StateMode::Playing => MediaCommand::Play,
            StateMode::Paused | StateMode::Stopped => MediaCommand::Pause,
        };
        media_command(page, VIDEO, command, "setState");
        Ok(())
    }

    async fn skip_next(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, NEXT_EPISODE, "skipNext");
        Ok(())
    }

    async fn set_position_seconds(&self, _page: &dyn Page, seconds: f64) -> Result<(), ControlError> {
        self.bridge("setPositionSeconds")?.seek_netflix(seconds).await?;
        Ok(())
    }

    async fn set_position_percentage(&self, page: &dyn Page, percentage: f64) -> Result<(), ControlError> {
        let bridge = self.bridge("setPositionPercentage")?;
        let duration = self.duration(page).unwrap_or(0.0);
        bridge.seek_netflix(percentage * duration).await?;
        Ok(())
    }

    async fn set_volume(&self, page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let volume = f64::from(volume) / 100.0;
        media_command(page, VIDEO, MediaCommand::SetVolume { volume }, "setVolume");
        Ok(())
    }
}
