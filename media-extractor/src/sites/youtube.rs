//! YouTube adapter.
//!
//! Video details live in the page's Polymer elements, out of reach of the
//! content script, so they come over the bridge (`getYouTubeInfo`) and are
//! refreshed in the background. Playback state is read straight from the
//! `<video>` element.

use super::refresh::{BridgeState, DEFAULT_REFRESH};
use super::{apply_rating, media_command, media_element_state, media_state_of, Site};
use crate::bridge::{BridgeClient, YouTubeInfo};
use crate::page::{MediaCommand, Page};
use crate::rating::{DISLIKED, LIKED};
use crate::selectors;
use crate::types::{ControlError, RatingSystem, RepeatMode, StateMode};
use crate::util::find_key;
use async_trait::async_trait;
use std::time::Duration;

pub(crate) const VIDEO: &str = ".html5-main-video";
pub(crate) const PREVIOUS: &str = ".ytp-prev-button";
pub(crate) const NEXT: &str = ".ytp-next-button";
const LIKE: &str = "like-button-view-model button";
const DISLIKE: &str = "dislike-button-view-model button";
const PLAYLIST_LOOP: &str = "ytd-playlist-loop-button-renderer button";
const PLAYLIST_SHUFFLE: &str = "ytd-playlist-shuffle-button-renderer button";

#[derive(Debug)]
pub struct YouTubeSite {
    info: BridgeState<YouTubeInfo>,
}

impl YouTubeSite {
    pub fn new() -> Self {
        Self::with_refresh(DEFAULT_REFRESH)
    }

    pub fn with_refresh(interval: Duration) -> Self {
        Self {
            info: BridgeState::new(interval),
        }
    }

    /// Last video details fetched from the page
    pub fn info(&self) -> Option<YouTubeInfo> {
        self.info.get()
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

impl Default for YouTubeSite {
    fn default() -> Self {
        Self::new()
    }
}

/// `true` when the button exists and is enabled
pub(crate) fn enabled(page: &dyn Page, selector: &str) -> bool {
    selectors::query(page, selector, |el| Some(!el.disabled()), false)
}

#[async_trait]
impl Site for YouTubeSite {
    fn name(&self) -> &'static str {
        "YouTube"
    }

    fn matches(&self, page: &dyn Page) -> bool {
        page.hostname() == "www.youtube.com"
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.exists(VIDEO) && self.info().and_then(|i| i.video_id().map(str::to_string)).is_some()
    }

    fn rating_system(&self) -> RatingSystem {
        RatingSystem::LikeDislike
    }

    fn init(&self, _page: &dyn Page, bridge: Option<&BridgeClient>) {
        if let Some(bridge) = bridge {
            self.info
                .start(self.name(), bridge, |client| async move { client.youtube_info().await });
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

    fn title(&self, _page: &dyn Page) -> Option<String> {
        Some(self.info().and_then(|i| i.title().map(str::to_string)).unwrap_or_default())
    }

    fn artist(&self, _page: &dyn Page) -> Option<String> {
        Some(self.info().and_then(|i| i.author().map(str::to_string)).unwrap_or_default())
    }

    /// Playlist title when watching from a playlist
    fn album(&self, _page: &dyn Page) -> Option<String> {
        let album = self.info().and_then(|info| {
            find_key(&info.playlist_details, "title")
                .and_then(|t| t.as_str())
                .map(str::to_string)
        });
        Some(album.unwrap_or_default())
    }

    fn cover(&self, _page: &dyn Page) -> Option<String> {
        let info = self.info()?;
        let cover = info.thumbnail().or_else(|| {
            info.video_id()
                .map(|id| format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", id))
        });
        Some(cover.unwrap_or_default())
    }

    fn duration(&self, page: &dyn Page) -> Option<f64> {
        let from_video = media_state_of(page, VIDEO)
            .map(|m| m.duration)
            .filter(|d| d.is_finite());
        let from_info = || self.info().and_then(|i| i.length_seconds());
        Some(from_video.or_else(from_info).unwrap_or(0.0))
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        Some(media_state_of(page, VIDEO).map(|m| m.current_time).unwrap_or(0.0))
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let media = media_state_of(page, VIDEO)?;
        Some(if media.muted { 0.0 } else { media.volume * 100.0 })
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
        let loop_state = self.info().and_then(|i| i.loop_state().map(str::to_string));
        let mode = match loop_state.as_deref() {
            Some("PLAYLIST_LOOP_STATE_ALL") => RepeatMode::All,
            Some("PLAYLIST_LOOP_STATE_ONE") => RepeatMode::One,
            _ if media_state_of(page, VIDEO).map(|m| m.looping).unwrap_or(false) => RepeatMode::One,
            _ => RepeatMode::None,
        };
        Some(mode)
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

    async fn set_volume(&self, _page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let bridge = self.info.bridge().ok_or(ControlError::Unsupported("setVolume"))?;
        bridge.set_youtube_volume(volume).await?;
        Ok(())
    }

    /// Playlist loop button when in a playlist, the video's own loop otherwise
    async fn toggle_repeat(&self, page: &dyn Page) -> Result<(), ControlError> {
        if page.exists(PLAYLIST_LOOP) {
            selectors::click(page, PLAYLIST_LOOP, "toggleRepeat");
        } else {
            let looping = media_state_of(page, VIDEO).map(|m| m.looping).unwrap_or(false);
            media_command(page, VIDEO, MediaCommand::SetLoop { enabled: !looping }, "toggleRepeat");
        }
        Ok(())
    }

    async fn toggle_shuffle(&self, page: &dyn Page) -> Result<(), ControlError> {
        selectors::click(page, PLAYLIST_SHUFFLE, "toggleShuffle");
        Ok(())
    }

    async fn set_rating(&self, page: &dyn Page, requested: u8) -> Result<(), ControlError> {
        let current = self.rating(page).unwrap_or(0);
        apply_rating(self.rating_system(), page, current, requested, LIKE, Some(DISLIKE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{FixtureRuntime, PageChannel, PageHost};
    use crate::page::{FixtureElement, FixturePage, Interaction, MediaElementState};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn page() -> FixturePage {
        let page = FixturePage::new("www.youtube.com", "/watch");
        page.insert(
            VIDEO,
            FixtureElement::new("video").with_media(MediaElementState {
                paused: false,
                current_time: 30.4,
                duration: 215.0,
                volume: 0.55,
                ..Default::default()
            }),
        );
        page.insert(LIKE, FixtureElement::new("button").with_attribute("aria-pressed", "false"));
        page.insert(DISLIKE, FixtureElement::new("button").with_attribute("aria-pressed", "true"));
        page
    }

    fn runtime() -> Arc<FixtureRuntime> {
        Arc::new(
            FixtureRuntime::from_json(
                &json!({
                    "elements": {
                        "ytd-watch-flexy": {
                            "active": true,
                            "playerData": { "videoDetails": {
                                "videoId": "dQw4w9WgXcQ",
                                "title": "Never Gonna Give You Up",
                                "author": "Rick Astley",
                                "lengthSeconds": "213"
                            } }
                        }
                    }
                })
                .to_string(),
            )
            .unwrap(),
        )
    }

    async fn wait_for_info(site: &YouTubeSite) {
        for _ in 0..100 {
            if site.info().is_some() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("video details never arrived");
    }

    #[test]
    fn test_not_ready_without_bridge_info() {
        let site = YouTubeSite::new();
        let page = page();
        assert!(site.matches(&page));
        assert!(!site.ready(&page));
        assert_eq!(site.cover(&page), None);
    }

    #[tokio::test]
    async fn test_reads_details_over_bridge() {
        let channel = PageChannel::new();
        let runtime = runtime();
        PageHost::new(channel.clone(), runtime.clone()).spawn();
        let client = BridgeClient::connect(channel);

        let site = YouTubeSite::new();
        let page = page();
        site.init(&page, Some(&client));
        wait_for_info(&site).await;

        assert!(site.ready(&page));
        assert_eq!(site.title(&page).as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(site.artist(&page).as_deref(), Some("Rick Astley"));
        assert_eq!(
            site.cover(&page).as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg")
        );
        assert_eq!(site.state(&page), Some(StateMode::Playing));
        assert_eq!(site.duration(&page), Some(215.0));
        assert_eq!(site.volume(&page), Some(55.0));
        assert_eq!(site.rating(&page), Some(DISLIKED));

        site.set_volume(&page, 20).await.unwrap();
        let call = runtime.invocations().into_iter().last().unwrap();
        assert_eq!(call.target, "ytd-watch-flexy.player");
        assert_eq!(call.args, vec![json!(20)]);
    }

    #[tokio::test]
    async fn test_set_volume_needs_bridge() {
        let site = YouTubeSite::new();
        let result = site.set_volume(&page(), 20).await;
        assert!(matches!(result, Err(ControlError::Unsupported("setVolume"))));
    }

    #[tokio::test]
    async fn test_controls_drive_video_element() {
        let site = YouTubeSite::new();
        let page = page();

        site.set_state(&page, StateMode::Paused).await.unwrap();
        site.set_position_percentage(&page, 0.5).await.unwrap();
        site.toggle_repeat(&page).await.unwrap();

        let video = page.element(VIDEO).unwrap();
        assert_eq!(
            video.interactions(),
            vec![
                Interaction::Media(MediaCommand::Pause),
                Interaction::Media(MediaCommand::Seek { seconds: 107.5 }),
                Interaction::Media(MediaCommand::SetLoop { enabled: true }),
            ]
        );
        assert_eq!(site.state(&page), Some(StateMode::Paused));
        assert_eq!(site.repeat(&page), Some(RepeatMode::One));
    }

    #[tokio::test]
    async fn test_rating_clears_dislike() {
        let site = YouTubeSite::new();
        let page = page();

        site.set_rating(&page, 0).await.unwrap();
        assert_eq!(page.element(DISLIKE).unwrap().clicks(), 1);
        assert_eq!(page.element(LIKE).unwrap().clicks(), 0);
    }
}
