//! Heuristic fallback for sites without a dedicated adapter.
//!
//! Metadata comes from the media session, playback from the first `<video>`
//! or `<audio>` element. When there is no usable media element, time labels
//! that look like `H:MM:SS` are read as a last resort.

use super::{media_command, media_element_state, media_session_state, Site};
use crate::page::{MediaCommand, MediaElementState, Page};
use crate::selectors;
use crate::types::{ControlError, RepeatMode, StateMode};
use crate::util::{media_session_cover, parse_time, TIME_PATTERN};
use async_trait::async_trait;

const MEDIA: [&str; 2] = ["video", "audio"];

const POSITION_LABELS: [&str; 3] = [
    "[class*='current-time']",
    "[class*='elapsed']",
    "[class*='position']",
];

const DURATION_LABELS: [&str; 3] = [
    "[class*='duration']",
    "[class*='total-time']",
    "[class*='length']",
];

#[derive(Debug, Default)]
pub struct GenericSite;

impl GenericSite {
    pub fn new() -> Self {
        Self
    }

    /// Selector and state of the first media element on the page
    fn media(&self, page: &dyn Page) -> Option<(&'static str, MediaElementState)> {
        MEDIA.into_iter().find_map(|selector| {
            selectors::find(page, selector)
                .and_then(|el| el.media_state())
                .map(|state| (selector, state))
        })
    }

    fn time_label(&self, page: &dyn Page, candidates: &[&str]) -> Option<f64> {
        candidates.iter().find_map(|selector| {
            let text = selectors::query(page, selector, |el| Some(el.text()), String::new());
            if TIME_PATTERN.is_match(&text) {
                parse_time(&text)
            } else {
                None
            }
        })
    }
}

#[async_trait]
impl Site for GenericSite {
    fn name(&self) -> &'static str {
        "Generic"
    }

    /// Gating is done by the registry's generic settings
    fn matches(&self, _page: &dyn Page) -> bool {
        true
    }

    fn ready(&self, page: &dyn Page) -> bool {
        page.media_session().metadata.is_some() || self.media(page).is_some()
    }

    fn player(&self, page: &dyn Page) -> Option<String> {
        Some(page.hostname())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        Some(match self.media(page) {
            Some((_, media)) => media_element_state(&media),
            None => media_session_state(page),
        })
    }

    fn title(&self, page: &dyn Page) -> Option<String> {
        match page.media_session().metadata {
            Some(metadata) => Some(metadata.title),
            None => Some(selectors::query(page, "title", |el| Some(el.text()), String::new())),
        }
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
        let from_media = self
            .media(page)
            .map(|(_, m)| m.duration)
            .filter(|d| d.is_finite() && *d > 0.0);
        Some(
            from_media
                .or_else(|| self.time_label(page, &DURATION_LABELS))
                .unwrap_or(0.0),
        )
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        match self.media(page) {
            Some((_, media)) => Some(media.current_time),
            None => Some(self.time_label(page, &POSITION_LABELS).unwrap_or(0.0)),
        }
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let (_, media) = self.media(page)?;
        Some(if media.muted { 0.0 } else { media.volume * 100.0 })
    }

    fn repeat(&self, page: &dyn Page) -> Option<RepeatMode> {
        let (_, media) = self.media(page)?;
        Some(if media.looping { RepeatMode::One } else { RepeatMode::None })
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        let (selector, _) = self.media(page).ok_or(ControlError::Unsupported("setState"))?;
        let command = match state {
            StateMode::Playing => MediaCommand::Play,
            StateMode::Paused | StateMode::Stopped => MediaCommand::Pause,
        };
        media_command(page, selector, command, "setState");
        Ok(())
    }

    async fn set_position_seconds(&self, page: &dyn Page, seconds: f64) -> Result<(), ControlError> {
        let (selector, _) = self
            .media(page)
            .ok_or(ControlError::Unsupported("setPositionSeconds"))?;
        media_command(page, selector, MediaCommand::Seek { seconds }, "setPositionSeconds");
        Ok(())
    }

    async fn set_position_percentage(&self, page: &dyn Page, percentage: f64) -> Result<(), ControlError> {
        let (selector, media) = self
            .media(page)
            .ok_or(ControlError::Unsupported("setPositionPercentage"))?;
        let seconds = percentage * media.duration;
        media_command(page, selector, MediaCommand::Seek { seconds }, "setPositionPercentage");
        Ok(())
    }

    async fn set_volume(&self, page: &dyn Page, volume: u8) -> Result<(), ControlError> {
        let (selector, _) = self.media(page).ok_or(ControlError::Unsupported("setVolume"))?;
        let volume = f64::from(volume) / 100.0;
        media_command(page, selector, MediaCommand::SetVolume { volume }, "setVolume");
        Ok(())
    }

    async fn toggle_repeat(&self, page: &dyn Page) -> Result<(), ControlError> {
        let (selector, media) = self.media(page).ok_or(ControlError::Unsupported("toggleRepeat"))?;
        media_command(
            page,
            selector,
            MediaCommand::SetLoop { enabled: !media.looping },
            "toggleRepeat",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Element, FixtureElement, FixturePage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_audio_element() {
        let site = GenericSite::new();
        let page = FixturePage::new("radio.example.org", "/");
        page.insert(
            "audio",
            FixtureElement::new("audio").with_media(MediaElementState {
                paused: false,
                current_time: 12.6,
                duration: f64::NAN,
                volume: 0.3,
                looping: true,
                ..Default::default()
            }),
        );
        page.insert("title", FixtureElement::new("title").with_text("Live stream"));

        assert!(site.ready(&page));
        assert_eq!(site.player(&page).as_deref(), Some("radio.example.org"));
        assert_eq!(site.state(&page), Some(StateMode::Playing));
        assert_eq!(site.title(&page).as_deref(), Some("Live stream"));
        assert_eq!(site.position(&page), Some(12.6));
        assert_eq!(site.duration(&page), Some(0.0));
        assert_eq!(site.repeat(&page), Some(RepeatMode::One));
    }

    #[test]
    fn test_time_labels_as_last_resort() {
        let site = GenericSite::new();
        let page = FixturePage::new("player.example.org", "/");
        page.insert("[class*='elapsed']", FixtureElement::new("span").with_text("1:05"));
        page.insert("[class*='duration']", FixtureElement::new("span").with_text("not a time"));
        page.insert("[class*='total-time']", FixtureElement::new("span").with_text("1:02:03"));

        assert!(!site.ready(&page));
        assert_eq!(site.position(&page), Some(65.0));
        assert_eq!(site.duration(&page), Some(3723.0));
        assert_eq!(site.volume(&page), None);
    }

    #[tokio::test]
    async fn test_controls_need_media_element() {
        let site = GenericSite::new();
        let page = FixturePage::new("example.org", "/");
        let result = site.set_volume(&page, 10).await;
        assert!(matches!(result, Err(ControlError::Unsupported("setVolume"))));

        let video = page.insert(
            "video",
            FixtureElement::new("video").with_media(MediaElementState {
                duration: 100.0,
                ..Default::default()
            }),
        );
        site.set_position_percentage(&page, 0.1).await.unwrap();
        assert_eq!(video.media_state().unwrap().current_time, 10.0);
    }
}
