//! Site adapters.
//!
//! Every supported site is one value implementing [`Site`]. Accessors read
//! the page synchronously on every poll and must never fail: a miss yields a
//! default, and `None` means the site does not report that field at all.
//! Control events are async because some of them wait on the page.

pub mod generic;
pub mod netflix;
pub mod profile;
pub mod refresh;
pub mod soundcloud;
pub mod youtube;
pub mod youtube_embed;
pub mod youtube_music;

pub use generic::GenericSite;
pub use netflix::NetflixSite;
pub use profile::{ProfileSite, SiteProfile};
pub use refresh::{BridgeState, DEFAULT_REFRESH};
pub use soundcloud::SoundCloudSite;
pub use youtube::YouTubeSite;
pub use youtube_embed::YouTubeEmbedSite;
pub use youtube_music::YouTubeMusicSite;

use crate::bridge::BridgeClient;
use crate::page::{MediaElementState, MediaCommand, Page, PlaybackState};
use crate::rating;
use crate::selectors;
use crate::types::{
    ControlError, ControlEvent, Field, FieldValue, RatingSystem, RepeatMode, StateMode,
};
use async_trait::async_trait;

/// A supported media site
#[async_trait]
pub trait Site: Send + Sync {
    /// Display name, also the key used in `disabledSites`
    fn name(&self) -> &'static str;

    fn matches(&self, page: &dyn Page) -> bool;

    /// Whether the page has loaded far enough to be read
    fn ready(&self, page: &dyn Page) -> bool;

    fn rating_system(&self) -> RatingSystem {
        RatingSystem::None
    }

    /// Runs once per session, the first time the site is resolved
    fn init(&self, _page: &dyn Page, _bridge: Option<&BridgeClient>) {}

    fn player(&self, _page: &dyn Page) -> Option<String> {
        None
    }

    fn state(&self, _page: &dyn Page) -> Option<StateMode> {
        None
    }

    fn title(&self, _page: &dyn Page) -> Option<String> {
        None
    }

    fn artist(&self, _page: &dyn Page) -> Option<String> {
        None
    }

    fn album(&self, _page: &dyn Page) -> Option<String> {
        None
    }

    fn cover(&self, _page: &dyn Page) -> Option<String> {
        None
    }

    /// Seconds
    fn duration(&self, _page: &dyn Page) -> Option<f64> {
        None
    }

    /// Seconds
    fn position(&self, _page: &dyn Page) -> Option<f64> {
        None
    }

    /// 0 - 100
    fn volume(&self, _page: &dyn Page) -> Option<f64> {
        None
    }

    /// 0 - 5
    fn rating(&self, _page: &dyn Page) -> Option<i64> {
        None
    }

    fn repeat(&self, _page: &dyn Page) -> Option<RepeatMode> {
        None
    }

    fn shuffle(&self, _page: &dyn Page) -> Option<bool> {
        None
    }

    fn can_skip_previous(&self, _page: &dyn Page) -> bool {
        false
    }

    fn can_skip_next(&self, _page: &dyn Page) -> bool {
        false
    }

    async fn set_state(&self, _page: &dyn Page, _state: StateMode) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("setState"))
    }

    async fn skip_previous(&self, _page: &dyn Page) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("skipPrevious"))
    }

    async fn skip_next(&self, _page: &dyn Page) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("skipNext"))
    }

    async fn set_position_seconds(&self, _page: &dyn Page, _seconds: f64) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("setPositionSeconds"))
    }

    /// `percentage` is a fraction, 0.0 - 1.0
    async fn set_position_percentage(
        &self,
        _page: &dyn Page,
        _percentage: f64,
    ) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("setPositionPercentage"))
    }

    async fn set_volume(&self, _page: &dyn Page, _volume: u8) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("setVolume"))
    }

    async fn toggle_repeat(&self, _page: &dyn Page) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("toggleRepeat"))
    }

    async fn toggle_shuffle(&self, _page: &dyn Page) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("toggleShuffle"))
    }

    async fn set_rating(&self, _page: &dyn Page, _rating: u8) -> Result<(), ControlError> {
        Err(ControlError::Unsupported("setRating"))
    }
}

/// Read one polled field through the matching accessor
pub fn read_field(site: &dyn Site, page: &dyn Page, field: Field) -> Option<FieldValue> {
    match field {
        Field::Player => site.player(page).map(FieldValue::from),
        Field::State => site.state(page).map(FieldValue::from),
        Field::Title => site.title(page).map(FieldValue::from),
        Field::Artist => site.artist(page).map(FieldValue::from),
        Field::Album => site.album(page).map(FieldValue::from),
        Field::Cover => site.cover(page).map(FieldValue::from),
        Field::Duration => site.duration(page).map(FieldValue::from),
        Field::Position => site.position(page).map(FieldValue::from),
        Field::Volume => site.volume(page).map(FieldValue::from),
        Field::Rating => site.rating(page).map(FieldValue::from),
        Field::Repeat => site.repeat(page).map(FieldValue::from),
        Field::Shuffle => site.shuffle(page).map(FieldValue::from),
        Field::Timestamp => None,
    }
}

/// Highest volume a site is asked to apply
pub const MAX_VOLUME: u8 = 100;
/// Highest rating a site is asked to apply
pub const MAX_RATING: u8 = 5;

/// Route a control event to the site's handler. Volume and rating are
/// clamped to their ranges first.
pub async fn dispatch(site: &dyn Site, page: &dyn Page, event: &ControlEvent) -> Result<(), ControlError> {
    match *event {
        ControlEvent::SetState { state } => site.set_state(page, state).await,
        ControlEvent::SkipPrevious => site.skip_previous(page).await,
        ControlEvent::SkipNext => site.skip_next(page).await,
        ControlEvent::SetPositionSeconds { seconds } => site.set_position_seconds(page, seconds).await,
        ControlEvent::SetPositionPercentage { percentage } => {
            site.set_position_percentage(page, percentage).await
        }
        ControlEvent::SetVolume { volume } => site.set_volume(page, volume.min(MAX_VOLUME)).await,
        ControlEvent::ToggleRepeat => site.toggle_repeat(page).await,
        ControlEvent::ToggleShuffle => site.toggle_shuffle(page).await,
        ControlEvent::SetRating { rating } => site.set_rating(page, rating.min(MAX_RATING)).await,
    }
}

/// Apply a rating request through the site's rating protocol, clicking the
/// given toggles. `Scale` sites handle ratings themselves.
pub fn apply_rating(
    system: RatingSystem,
    page: &dyn Page,
    current: i64,
    requested: u8,
    like_selector: &str,
    dislike_selector: Option<&str>,
) -> Result<(), ControlError> {
    let toggle_like = || {
        selectors::click(page, like_selector, "setRating");
    };
    match (system, dislike_selector) {
        (RatingSystem::Like, _) => {
            rating::like(current, requested, toggle_like);
            Ok(())
        }
        (RatingSystem::LikeDislike, Some(dislike)) => {
            rating::like_dislike(current, requested, toggle_like, || {
                selectors::click(page, dislike, "setRating");
            });
            Ok(())
        }
        _ => Err(ControlError::Unsupported("setRating")),
    }
}

/// Current state from the media session
pub fn media_session_state(page: &dyn Page) -> StateMode {
    match page.media_session().playback_state {
        PlaybackState::Playing => StateMode::Playing,
        PlaybackState::Paused => StateMode::Paused,
        PlaybackState::None => StateMode::Stopped,
    }
}

/// State of a `<video>`/`<audio>` element
pub fn media_element_state(media: &MediaElementState) -> StateMode {
    if media.ended {
        StateMode::Stopped
    } else if media.paused {
        StateMode::Paused
    } else {
        StateMode::Playing
    }
}

/// Playback state of the first element matching `selector`
pub fn media_state_of(page: &dyn Page, selector: &str) -> Option<MediaElementState> {
    selectors::find(page, selector).and_then(|el| el.media_state())
}

/// Drive a media element. Returns whether the element was found.
pub fn media_command(page: &dyn Page, selector: &str, command: MediaCommand, name: &str) -> bool {
    selectors::query_event_report(page, selector, |el| el.media_command(command), name)
}

/// Text content of the first match, trimmed later by the cache
pub fn text_of(page: &dyn Page, selector: &str, name: &str) -> String {
    selectors::query_report(page, selector, |el| Some(el.text()), String::new(), name)
}

/// `H:MM:SS` label of the first match, in seconds
pub fn time_of(page: &dyn Page, selector: &str, name: &str) -> f64 {
    selectors::query_report(
        page,
        selector,
        |el| crate::util::parse_time(&el.text()),
        0.0,
        name,
    )
}
