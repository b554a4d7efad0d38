//! SoundCloud adapter.
//!
//! Metadata comes from the media session. Times are read from the timeline
//! labels, volume from the slider geometry. The volume slider is only
//! rendered while the pointer hovers the volume button, so setting volume
//! hovers first and waits for the slider before clicking it.

use super::{media_session_state, time_of, Site};
use crate::page::{MouseEvent, MouseEventKind, Page};
use crate::rating::{self, LIKED};
use crate::selectors;
use crate::slider::{ReadyWait, WaitState};
use crate::types::{ControlError, RatingSystem, RepeatMode, StateMode};
use crate::util::media_session_cover;
use async_trait::async_trait;
use tracing::debug;

const DURATION: &str = "(.playbackTimeline__duration > span)[1]";
const POSITION: &str = "(.playbackTimeline__timePassed > span)[1]";
const PROGRESS_WRAPPER: &str = ".playbackTimeline__progressWrapper";
const VOLUME: &str = ".volume";
const VOLUME_EXPANDED: &str = ".volume.expanded.hover";
const VOLUME_PROGRESS: &str = ".volume__sliderProgress";
const VOLUME_BACKGROUND: &str = ".volume__sliderBackground";
const LIKE: &str = ".playbackSoundBadge__like";
const PLAY: &str = ".playControl";
const PREVIOUS: &str = ".skipControl__previous";
const NEXT: &str = ".skipControl__next";
const REPEAT: &str = ".repeatControl";
const SHUFFLE: &str = ".shuffleControl";

/// Pixels below the target height the volume click lands
const VOLUME_CLICK_OFFSET: f64 = 5.0;

#[derive(Debug, Default)]
pub struct SoundCloudSite;

impl SoundCloudSite {
    pub fn new() -> Self {
        Self
    }

    fn current_rating(&self, page: &dyn Page) -> i64 {
        selectors::query_report(
            page,
            LIKE,
            |el| Some(if el.has_class("selected") { LIKED } else { 0 }),
            0,
            "rating",
        )
    }
}

#[async_trait]
impl Site for SoundCloudSite {
    fn name(&self) -> &'static str {
        "Soundcloud"
    }

    fn matches(&self, page: &dyn Page) -> bool {
        page.hostname() == "soundcloud.com"
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.media_session().metadata.is_some()
    }

    fn rating_system(&self) -> RatingSystem {
        RatingSystem::Like
    }

    fn player(&self, _page: &dyn Page) -> Option<String> {
        Some(self.name().to_string())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        // Never reports STOPPED
        Some(match media_session_state(page) {
            StateMode::Playing => StateMode::Playing,
            _ => StateMode::Paused,
        })
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
        Some(time_of(page, DURATION, "duration"))
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        Some(time_of(page, POSITION, "position"))
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let height = |el: &dyn crate::page::Element| Some(el.bounding_rect().height);
        let progress = selectors::query_report(page, VOLUME_PROGRESS, height, 1.0, "volume");
        let background = selectors::query_report(page, VOLUME_BACKGROUND, height, 1.0, "volume");
        if background == 0.0 {
            return Some(0.0);
        }
        Some(progress / background * 100.0)
    }

    fn rating(&self, page: &dyn Page) -> Option<i64> {
        Some(self.current_rating(page))
    }

    fn repeat(&self, page: &dyn Page) -> Option<RepeatMode> {
        if page.exists(".m-one") {
            Some(RepeatMode::One)
        } else if page.exists(".m-all") {
            Some(RepeatMode::All)
        } else {
            Some(RepeatMode::None)
        }
    }

    fn shuffle(&self, page: &dyn Page) -> Option<bool> {
        // The class is only present while shuffle is on
        Some(page.exists(".m-shuffling"))
    }

    fn can_skip_previous(&self, page: &dyn Page) -> bool {
        selectors::query(page, PREVIOUS, |el| Some(!el.disabled()), false)
    }

    fn can_skip_next(&self, page: &dyn Page) -> bool {
        selectors::query(page, NEXT, |el| Some(!el.disabled()), false)
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        if self.state(page) == Some(state) {
            return Ok(());
        }
        selectors::click(page, PLAY, "setState");
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

    async fn set_position_percentage(&self, page: &dyn Page, percentage: f64) -> Result<(), ControlError> {
        selectors::query_event_report(
            page,
            PROGRESS_WRAPPER,
            |el| {
                let rect = el.bounding_rect();
                let x = rect.left + percentage * rect.width;
                let y = rect.top + rect.height / 2.0;
                el.dispatch_mouse(MouseEvent::new(MouseEventKind::MouseDown, x, y));
                el.dispatch_mouse(MouseEvent::new(MouseEventKind::MouseUp, x, y));
            },
            "setPositionPercentage",
        );
        Ok(())
    }

    async fn set_volume(&self, page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let hovered = selectors::query_event(page, VOLUME, |el| {
            el.dispatch_mouse(MouseEvent::at_origin(MouseEventKind::MouseOver));
            el.dispatch_mouse(MouseEvent::at_origin(MouseEventKind::MouseMove));
        });
        if !hovered {
            debug!("[setVolume] no element for selector '{}'", VOLUME);
            return Ok(());
        }

        let state = ReadyWait::default().run(|| page.exists(VOLUME_EXPANDED)).await;
        if state != WaitState::Ready {
            return Ok(());
        }

        let fraction = f64::from(volume) / 100.0;
        selectors::query_event(page, VOLUME_BACKGROUND, |el| {
            let rect = el.bounding_rect();
            let x = rect.left + rect.width / 2.0;
            let y = rect.bottom() - fraction * rect.height + VOLUME_CLICK_OFFSET;
            el.dispatch_mouse(MouseEvent::new(MouseEventKind::MouseDown, x, y));
            el.dispatch_mouse(MouseEvent::new(MouseEventKind::MouseUp, x, y));
        });
        selectors::query_event_report(
            page,
            VOLUME,
            |el| el.dispatch_mouse(MouseEvent::at_origin(MouseEventKind::MouseOut)),
            "setVolume",
        );
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
        rating::like(self.current_rating(page), requested, || {
            selectors::click(page, LIKE, "setRating");
        });
        Ok(())
    }
}
