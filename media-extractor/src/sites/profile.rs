//! Data-driven adapters.
//!
//! Most sites differ only in where things are on the page. A [`SiteProfile`]
//! describes that as data and [`ProfileSite`] runs it. Selectors here track
//! each site's current markup and are expected to change with it.

use super::{apply_rating, media_command, media_element_state, media_session_state, text_of, time_of, Site};
use crate::page::{Element, MediaCommand, MediaElementState, MouseEvent, MouseEventKind, Page};
use crate::rating::{DISLIKED, LIKED};
use crate::selectors;
use crate::types::{ControlError, RatingSystem, RepeatMode, StateMode};
use crate::util::media_session_cover;
use async_trait::async_trait;

/// How a site recognizes its pages
#[derive(Debug, Clone, Copy)]
pub enum MatchRule {
    Host(&'static str),
    HostSuffix(&'static str),
    /// An element only the site renders, for self-hosted apps
    Marker(&'static str),
    Any(&'static [MatchRule]),
}

impl MatchRule {
    pub fn matches(&self, page: &dyn Page) -> bool {
        match self {
            MatchRule::Host(host) => page.hostname() == *host,
            MatchRule::HostSuffix(suffix) => page.hostname().ends_with(suffix),
            MatchRule::Marker(selector) => page.exists(selector),
            MatchRule::Any(rules) => rules.iter().any(|rule| rule.matches(page)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Ready {
    /// Media session metadata is set
    MediaSession,
    /// An element exists
    Selector(&'static str),
}

/// Where a text field comes from
#[derive(Debug, Clone, Copy)]
pub enum Source {
    MediaSession,
    Text(&'static str),
    Attribute(&'static str, &'static str),
    Absent,
}

/// Where a time field comes from
#[derive(Debug, Clone, Copy)]
pub enum Time {
    /// The profile's media element
    Media,
    /// A `H:MM:SS` label
    Label(&'static str),
    Absent,
}

/// Repeat state read from an attribute of the repeat button.
/// The value is matched case-insensitively against `one` first, then `all`.
#[derive(Debug, Clone, Copy)]
pub struct RepeatSource {
    pub selector: &'static str,
    pub attribute: &'static str,
    pub one: &'static str,
    pub all: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum Rating {
    None,
    Like { like: &'static str },
    LikeDislike { like: &'static str, dislike: &'static str },
    /// A row of stars; rating is the number carrying `filled`
    Scale { stars: &'static str, filled: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub name: &'static str,
    pub matcher: MatchRule,
    pub ready: Ready,
    /// `<audio>`/`<video>` driving playback, if reachable
    pub media: Option<&'static str>,
    pub title: Source,
    pub artist: Source,
    pub album: Source,
    pub cover: Source,
    pub duration: Time,
    pub position: Time,
    pub play_pause: Option<&'static str>,
    pub previous: Option<&'static str>,
    pub next: Option<&'static str>,
    /// Progress bar clicked for seeks when there is no media element
    pub seek_bar: Option<&'static str>,
    pub repeat: Option<RepeatSource>,
    pub shuffle: Option<&'static str>,
    pub rating: Rating,
}

const BASE: SiteProfile = SiteProfile {
    name: "",
    matcher: MatchRule::Any(&[]),
    ready: Ready::MediaSession,
    media: None,
    title: Source::MediaSession,
    artist: Source::MediaSession,
    album: Source::MediaSession,
    cover: Source::MediaSession,
    duration: Time::Absent,
    position: Time::Absent,
    play_pause: None,
    previous: None,
    next: None,
    seek_bar: None,
    repeat: None,
    shuffle: None,
    rating: Rating::None,
};

pub const APPLE_MUSIC: SiteProfile = SiteProfile {
    name: "Apple Music",
    matcher: MatchRule::Host("music.apple.com"),
    media: Some("#apple-music-player"),
    duration: Time::Media,
    position: Time::Media,
    previous: Some(".playback-controls__skip-back"),
    next: Some(".playback-controls__skip-forward"),
    repeat: Some(RepeatSource {
        selector: ".playback-controls__repeat",
        attribute: "aria-label",
        one: "repeat one",
        all: "repeat all",
    }),
    shuffle: Some(".playback-controls__shuffle"),
    ..BASE
};

pub const BANDCAMP: SiteProfile = SiteProfile {
    name: "Bandcamp",
    matcher: MatchRule::Any(&[
        MatchRule::HostSuffix("bandcamp.com"),
        MatchRule::Marker("[content=\"@bandcamp\"]"),
    ]),
    ready: Ready::Selector(".inline_player"),
    media: Some("audio"),
    title: Source::Text(".inline_player .title"),
    artist: Source::Text("#name-section [itemprop=\"byArtist\"]"),
    album: Source::Text("#name-section .trackTitle"),
    cover: Source::Attribute("#tralbumArt img", "src"),
    duration: Time::Label(".inline_player .time_total"),
    position: Time::Label(".inline_player .time_elapsed"),
    play_pause: Some(".inline_player .playbutton"),
    previous: Some(".inline_player .prevbutton"),
    next: Some(".inline_player .nextbutton"),
    ..BASE
};

pub const DEEZER: SiteProfile = SiteProfile {
    name: "Deezer",
    matcher: MatchRule::Host("www.deezer.com"),
    duration: Time::Label("[data-testid=\"remaining_time\"]"),
    position: Time::Label("[data-testid=\"elapsed_time\"]"),
    play_pause: Some("[data-testid=\"play_button_pause\"], [data-testid=\"play_button_play\"]"),
    previous: Some("[data-testid=\"previous_track_button\"]"),
    next: Some("[data-testid=\"next_track_button\"]"),
    seek_bar: Some("[data-testid=\"progress_bar\"]"),
    repeat: Some(RepeatSource {
        selector: "[data-testid=\"repeat_button\"]",
        attribute: "aria-label",
        one: "repeat one",
        all: "repeat all",
    }),
    shuffle: Some("[data-testid=\"shuffle_button\"]"),
    rating: Rating::Like {
        like: "[data-testid=\"add_to_favorite_button_on\"], [data-testid=\"add_to_favorite_button_off\"]",
    },
    ..BASE
};

pub const INVIDIOUS: SiteProfile = SiteProfile {
    name: "Invidious",
    matcher: MatchRule::Marker("link[title=\"Invidious\"]"),
    ready: Ready::Selector("video"),
    media: Some("video"),
    title: Source::Text("#contents h1"),
    artist: Source::Text("#channel-name"),
    album: Source::Absent,
    cover: Source::Attribute("video", "poster"),
    duration: Time::Media,
    position: Time::Media,
    ..BASE
};

pub const JELLYFIN: SiteProfile = SiteProfile {
    name: "Jellyfin",
    matcher: MatchRule::Marker("[content=\"Jellyfin\"]"),
    media: Some(".htmlvideoplayer, .mediaPlayerAudio"),
    duration: Time::Media,
    position: Time::Media,
    previous: Some(".nowPlayingBar .previousTrackButton"),
    next: Some(".nowPlayingBar .nextTrackButton"),
    repeat: Some(RepeatSource {
        selector: ".nowPlayingBar .toggleRepeatButton",
        attribute: "title",
        one: "repeat one",
        all: "repeat all",
    }),
    rating: Rating::Like {
        like: ".nowPlayingBar .btnUserItemRating",
    },
    ..BASE
};

pub const NAVIDROME: SiteProfile = SiteProfile {
    name: "Navidrome",
    matcher: MatchRule::Marker("[content=\"Navidrome\"]"),
    media: Some(".music-player-panel audio"),
    duration: Time::Media,
    position: Time::Media,
    play_pause: Some(".music-player-panel .play-btn"),
    previous: Some(".music-player-panel .prev-audio"),
    next: Some(".music-player-panel .next-audio"),
    repeat: Some(RepeatSource {
        selector: ".music-player-panel .loop-btn",
        attribute: "title",
        one: "single loop",
        all: "list loop",
    }),
    rating: Rating::Scale {
        stars: ".music-player-panel .rating-star",
        filled: "filled",
    },
    ..BASE
};

pub const PANDORA: SiteProfile = SiteProfile {
    name: "Pandora",
    matcher: MatchRule::Host("www.pandora.com"),
    duration: Time::Label("[data-qa=\"remaining_time\"]"),
    position: Time::Label("[data-qa=\"elapsed_time\"]"),
    play_pause: Some("[data-qa=\"play_button\"], [data-qa=\"pause_button\"]"),
    previous: Some("[data-qa=\"previous_button\"]"),
    next: Some("[data-qa=\"skip_button\"]"),
    seek_bar: Some(".Duration__bar"),
    rating: Rating::LikeDislike {
        like: "[data-qa=\"thumbs_up_button\"]",
        dislike: "[data-qa=\"thumbs_down_button\"]",
    },
    ..BASE
};

pub const PLEX: SiteProfile = SiteProfile {
    name: "Plex",
    matcher: MatchRule::Host("app.plex.tv"),
    media: Some("video, audio"),
    duration: Time::Media,
    position: Time::Media,
    previous: Some("[data-testid=\"previousButton\"]"),
    next: Some("[data-testid=\"nextButton\"]"),
    repeat: Some(RepeatSource {
        selector: "[data-testid=\"repeatButton\"]",
        attribute: "aria-label",
        one: "repeat one",
        all: "repeat all",
    }),
    shuffle: Some("[data-testid=\"shuffleButton\"]"),
    ..BASE
};

pub const RADIO_ADDICT: SiteProfile = SiteProfile {
    name: "Radio Addict",
    matcher: MatchRule::Host("www.radio-addict.com"),
    ready: Ready::Selector("#player-title"),
    media: Some("audio"),
    title: Source::Text("#player-title"),
    artist: Source::Text("#player-station"),
    album: Source::Absent,
    cover: Source::Attribute("#player-logo img", "src"),
    play_pause: Some("#player-play"),
    ..BASE
};

pub const SPOTIFY: SiteProfile = SiteProfile {
    name: "Spotify",
    matcher: MatchRule::Host("open.spotify.com"),
    duration: Time::Label("[data-testid=\"playback-duration\"]"),
    position: Time::Label("[data-testid=\"playback-position\"]"),
    play_pause: Some("[data-testid=\"control-button-playpause\"]"),
    previous: Some("[data-testid=\"control-button-skip-back\"]"),
    next: Some("[data-testid=\"control-button-skip-forward\"]"),
    seek_bar: Some("[data-testid=\"playback-progressbar\"]"),
    repeat: Some(RepeatSource {
        selector: "[data-testid=\"control-button-repeat\"]",
        attribute: "aria-checked",
        one: "mixed",
        all: "true",
    }),
    shuffle: Some("[data-testid=\"control-button-shuffle\"]"),
    rating: Rating::Like {
        like: "[data-testid=\"now-playing-widget\"] [data-testid=\"add-button\"]",
    },
    ..BASE
};

pub const TIDAL: SiteProfile = SiteProfile {
    name: "Tidal",
    matcher: MatchRule::Host("listen.tidal.com"),
    duration: Time::Label("[data-test=\"duration\"]"),
    position: Time::Label("[data-test=\"current-time\"]"),
    play_pause: Some("[data-test=\"play\"], [data-test=\"pause\"]"),
    previous: Some("[data-test=\"previous\"]"),
    next: Some("[data-test=\"next\"]"),
    seek_bar: Some("[data-test=\"interaction-layer\"]"),
    repeat: Some(RepeatSource {
        selector: "[data-test=\"repeat\"]",
        attribute: "data-type",
        one: "button__repeatsingle",
        all: "button__repeatall",
    }),
    shuffle: Some("[data-test=\"shuffle\"]"),
    rating: Rating::Like {
        like: "[data-test=\"footer-favorite-button\"]",
    },
    ..BASE
};

pub const TWITCH: SiteProfile = SiteProfile {
    name: "Twitch",
    matcher: MatchRule::Host("www.twitch.tv"),
    ready: Ready::Selector("video"),
    media: Some("video"),
    title: Source::Text("[data-a-target=\"stream-title\"]"),
    artist: Source::Text("[data-a-target=\"player-info-title\"], h1.tw-title"),
    album: Source::Absent,
    cover: Source::Attribute(".channel-info-content .tw-image-avatar", "src"),
    position: Time::Media,
    ..BASE
};

/// Adapter driven by a [`SiteProfile`]
#[derive(Debug, Clone, Copy)]
pub struct ProfileSite {
    profile: SiteProfile,
}

impl ProfileSite {
    pub fn new(profile: SiteProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    fn media(&self, page: &dyn Page) -> Option<MediaElementState> {
        let selector = self.profile.media?;
        selectors::find(page, selector).and_then(|el| el.media_state())
    }

    fn read_source(&self, page: &dyn Page, source: Source, name: &str) -> Option<String> {
        match source {
            Source::MediaSession => {
                let metadata = page.media_session().metadata.unwrap_or_default();
                Some(match name {
                    "title" => metadata.title,
                    "artist" => metadata.artist,
                    "album" => metadata.album,
                    _ => String::new(),
                })
            }
            Source::Text(selector) => Some(text_of(page, selector, name)),
            Source::Attribute(selector, attribute) => Some(selectors::query_report(
                page,
                selector,
                |el| el.attribute(attribute),
                String::new(),
                name,
            )),
            Source::Absent => None,
        }
    }

    fn read_time(&self, page: &dyn Page, time: Time, name: &str) -> Option<f64> {
        match time {
            Time::Media => {
                let media = self.media(page)?;
                let value = if name == "duration" { media.duration } else { media.current_time };
                Some(if value.is_finite() { value } else { 0.0 })
            }
            Time::Label(selector) => Some(time_of(page, selector, name)),
            Time::Absent => None,
        }
    }

    fn control(&self, selector: Option<&'static str>, page: &dyn Page, name: &'static str) -> Result<(), ControlError> {
        let selector = selector.ok_or(ControlError::Unsupported(name))?;
        selectors::click(page, selector, name);
        Ok(())
    }
}

/// Toggle buttons mark their "on" state in one of a few common ways
fn pressed(el: &dyn Element) -> bool {
    el.attribute("aria-pressed").as_deref() == Some("true")
        || el.attribute("aria-checked").as_deref() == Some("true")
        || el.has_class("active")
        || el.has_class("selected")
}

fn is_pressed(page: &dyn Page, selector: &str) -> bool {
    selectors::query(page, selector, |el| Some(pressed(el)), false)
}

#[async_trait]
impl Site for ProfileSite {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn matches(&self, page: &dyn Page) -> bool {
        self.profile.matcher.matches(page)
    }

    fn ready(&self, page: &dyn Page) -> bool {
        match self.profile.ready {
            Ready::MediaSession => page.media_session().metadata.is_some(),
            Ready::Selector(selector) => page.exists(selector),
        }
    }

    fn rating_system(&self) -> RatingSystem {
        match self.profile.rating {
            Rating::None => RatingSystem::None,
            Rating::Like { .. } => RatingSystem::Like,
            Rating::LikeDislike { .. } => RatingSystem::LikeDislike,
            Rating::Scale { .. } => RatingSystem::Scale,
        }
    }

    fn player(&self, _page: &dyn Page) -> Option<String> {
        Some(self.profile.name.to_string())
    }

    fn state(&self, page: &dyn Page) -> Option<StateMode> {
        Some(match self.media(page) {
            Some(media) => media_element_state(&media),
            None => media_session_state(page),
        })
    }

    fn title(&self, page: &dyn Page) -> Option<String> {
        self.read_source(page, self.profile.title, "title")
    }

    fn artist(&self, page: &dyn Page) -> Option<String> {
        self.read_source(page, self.profile.artist, "artist")
    }

    fn album(&self, page: &dyn Page) -> Option<String> {
        self.read_source(page, self.profile.album, "album")
    }

    fn cover(&self, page: &dyn Page) -> Option<String> {
        match self.profile.cover {
            Source::MediaSession => Some(media_session_cover(&page.media_session())),
            other => self.read_source(page, other, "cover"),
        }
    }

    fn duration(&self, page: &dyn Page) -> Option<f64> {
        self.read_time(page, self.profile.duration, "duration")
    }

    fn position(&self, page: &dyn Page) -> Option<f64> {
        self.read_time(page, self.profile.position, "position")
    }

    fn volume(&self, page: &dyn Page) -> Option<f64> {
        let media = self.media(page)?;
        Some(if media.muted { 0.0 } else { media.volume * 100.0 })
    }

    fn rating(&self, page: &dyn Page) -> Option<i64> {
        match self.profile.rating {
            Rating::None => None,
            Rating::Like { like } => Some(if is_pressed(page, like) { LIKED } else { 0 }),
            Rating::LikeDislike { like, dislike } => Some(if is_pressed(page, like) {
                LIKED
            } else if is_pressed(page, dislike) {
                DISLIKED
            } else {
                0
            }),
            Rating::Scale { stars, filled } => Some(
                page.query_all(stars)
                    .iter()
                    .filter(|star| star.has_class(filled))
                    .count() as i64,
            ),
        }
    }

    fn repeat(&self, page: &dyn Page) -> Option<RepeatMode> {
        let source = self.profile.repeat?;
        let value = selectors::query(
            page,
            source.selector,
            |el| el.attribute(source.attribute),
            String::new(),
        )
        .to_lowercase();

        Some(if value.contains(source.one) {
            RepeatMode::One
        } else if value.contains(source.all) {
            RepeatMode::All
        } else {
            RepeatMode::None
        })
    }

    fn shuffle(&self, page: &dyn Page) -> Option<bool> {
        self.profile.shuffle.map(|selector| is_pressed(page, selector))
    }

    fn can_skip_previous(&self, page: &dyn Page) -> bool {
        self.profile
            .previous
            .map(|selector| selectors::query(page, selector, |el| Some(!el.disabled()), false))
            .unwrap_or(false)
    }

    fn can_skip_next(&self, page: &dyn Page) -> bool {
        self.profile
            .next
            .map(|selector| selectors::query(page, selector, |el| Some(!el.disabled()), false))
            .unwrap_or(false)
    }

    async fn set_state(&self, page: &dyn Page, state: StateMode) -> Result<(), ControlError> {
        if let (Some(selector), Some(_)) = (self.profile.media, self.media(page)) {
            let command = match state {
                StateMode::Playing => MediaCommand::Play,
                StateMode::Paused | StateMode::Stopped => MediaCommand::Pause,
            };
            media_command(page, selector, command, "setState");
            return Ok(());
        }

        let playing = self.state(page) == Some(StateMode::Playing);
        if playing == (state == StateMode::Playing) {
            return Ok(());
        }
        self.control(self.profile.play_pause, page, "setState")
    }

    async fn skip_previous(&self, page: &dyn Page) -> Result<(), ControlError> {
        self.control(self.profile.previous, page, "skipPrevious")
    }

    async fn skip_next(&self, page: &dyn Page) -> Result<(), ControlError> {
        self.control(self.profile.next, page, "skipNext")
    }

    async fn set_position_seconds(&self, page: &dyn Page, seconds: f64) -> Result<(), ControlError> {
        match (self.profile.media, self.media(page)) {
            (Some(selector), Some(_)) => {
                media_command(page, selector, MediaCommand::Seek { seconds }, "setPositionSeconds");
                Ok(())
            }
            _ => {
                let duration = self.duration(page).unwrap_or(0.0);
                if self.profile.seek_bar.is_none() || duration <= 0.0 {
                    return Err(ControlError::Unsupported("setPositionSeconds"));
                }
                self.set_position_percentage(page, seconds / duration).await
            }
        }
    }

    async fn set_position_percentage(&self, page: &dyn Page, percentage: f64) -> Result<(), ControlError> {
        if let (Some(selector), Some(media)) = (self.profile.media, self.media(page)) {
            let seconds = percentage * media.duration;
            media_command(page, selector, MediaCommand::Seek { seconds }, "setPositionPercentage");
            return Ok(());
        }

        let seek_bar = self
            .profile
            .seek_bar
            .ok_or(ControlError::Unsupported("setPositionPercentage"))?;
        selectors::query_event_report(
            page,
            seek_bar,
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
        let selector = self
            .profile
            .media
            .filter(|_| self.media(page).is_some())
            .ok_or(ControlError::Unsupported("setVolume"))?;
        let volume = f64::from(volume) / 100.0;
        media_command(page, selector, MediaCommand::SetVolume { volume }, "setVolume");
        Ok(())
    }

    async fn toggle_repeat(&self, page: &dyn Page) -> Result<(), ControlError> {
        self.control(self.profile.repeat.map(|r| r.selector), page, "toggleRepeat")
    }

    async fn toggle_shuffle(&self, page: &dyn Page) -> Result<(), ControlError> {
        self.control(self.profile.shuffle, page, "toggleShuffle")
    }

    async fn set_rating(&self, page: &dyn Page, requested: u8) -> Result<(), ControlError> {
        let current = self.rating(page).unwrap_or(0);
        match self.profile.rating {
            Rating::None => Err(ControlError::Unsupported("setRating")),
            Rating::Like { like } => apply_rating(RatingSystem::Like, page, current, requested, like, None),
            Rating::LikeDislike { like, dislike } => {
                apply_rating(RatingSystem::LikeDislike, page, current, requested, like, Some(dislike))
            }
            Rating::Scale { stars, .. } => {
                // Clicking the current star again clears the rating
                let star = match requested {
                    0 if current > 0 => current as usize,
                    0 => return Ok(()),
                    n => usize::from(n.min(5)),
                };
                selectors::click(page, &format!("({})[{}]", stars, star - 1), "setRating");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{FixtureElement, FixturePage, Interaction, MediaMetadata, MediaSession, Rect};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_match_rules() {
        let bandcamp = ProfileSite::new(BANDCAMP);
        assert!(bandcamp.matches(&FixturePage::new("artist.bandcamp.com", "/album/x")));

        let custom_domain = FixturePage::new("music.artist.com", "/");
        assert!(!bandcamp.matches(&custom_domain));
        custom_domain.insert("[content=\"@bandcamp\"]", FixtureElement::new("meta"));
        assert!(bandcamp.matches(&custom_domain));

        let jellyfin = ProfileSite::new(JELLYFIN);
        let page = FixturePage::new("media.home.lan", "/web/index.html");
        assert!(!jellyfin.matches(&page));
        page.insert("[content=\"Jellyfin\"]", FixtureElement::new("meta"));
        assert!(jellyfin.matches(&page));
    }

    #[test]
    fn test_rating_systems() {
        assert_eq!(ProfileSite::new(SPOTIFY).rating_system(), RatingSystem::Like);
        assert_eq!(ProfileSite::new(PANDORA).rating_system(), RatingSystem::LikeDislike);
        assert_eq!(ProfileSite::new(NAVIDROME).rating_system(), RatingSystem::Scale);
        assert_eq!(ProfileSite::new(TWITCH).rating_system(), RatingSystem::None);
    }

    fn spotify_page() -> FixturePage {
        let page = FixturePage::new("open.spotify.com", "/");
        page.set_media_session(MediaSession {
            metadata: Some(MediaMetadata {
                title: "Song".to_string(),
                artist: "Artist".to_string(),
                album: "Album".to_string(),
                artwork: Vec::new(),
            }),
            playback_state: crate::page::PlaybackState::Playing,
        });
        page.insert("[data-testid=\"playback-duration\"]", FixtureElement::new("div").with_text("4:00"));
        page.insert("[data-testid=\"playback-position\"]", FixtureElement::new("div").with_text("1:00"));
        page.insert(
            "[data-testid=\"control-button-repeat\"]",
            FixtureElement::new("button").with_attribute("aria-checked", "mixed"),
        );
        page.insert(
            "[data-testid=\"control-button-shuffle\"]",
            FixtureElement::new("button").with_attribute("aria-checked", "true"),
        );
        page.insert(
            "[data-testid=\"playback-progressbar\"]",
            FixtureElement::new("div").with_rect(Rect::new(0.0, 100.0, 400.0, 8.0)),
        );
        page
    }

    #[test]
    fn test_spotify_accessors() {
        let site = ProfileSite::new(SPOTIFY);
        let page = spotify_page();

        assert!(site.ready(&page));
        assert_eq!(site.player(&page).as_deref(), Some("Spotify"));
        assert_eq!(site.state(&page), Some(StateMode::Playing));
        assert_eq!(site.album(&page).as_deref(), Some("Album"));
        assert_eq!(site.duration(&page), Some(240.0));
        assert_eq!(site.position(&page), Some(60.0));
        assert_eq!(site.volume(&page), None);
        assert_eq!(site.repeat(&page), Some(RepeatMode::One));
        assert_eq!(site.shuffle(&page), Some(true));
        assert_eq!(site.rating(&page), Some(0));
    }

    #[tokio::test]
    async fn test_seek_clicks_progress_bar() {
        let site = ProfileSite::new(SPOTIFY);
        let page = spotify_page();

        site.set_position_seconds(&page, 60.0).await.unwrap();
        let bar = page.element("[data-testid=\"playback-progressbar\"]").unwrap();
        assert_eq!(
            bar.interactions(),
            vec![
                Interaction::Mouse(MouseEvent::new(MouseEventKind::MouseDown, 100.0, 104.0)),
                Interaction::Mouse(MouseEvent::new(MouseEventKind::MouseUp, 100.0, 104.0)),
            ]
        );

        let result = site.set_volume(&page, 50).await;
        assert!(matches!(result, Err(ControlError::Unsupported("setVolume"))));
    }

    #[tokio::test]
    async fn test_set_state_without_media_clicks_play_pause() {
        let site = ProfileSite::new(SPOTIFY);
        let page = spotify_page();
        let button = page.insert("[data-testid=\"control-button-playpause\"]", FixtureElement::new("button"));

        site.set_state(&page, StateMode::Playing).await.unwrap();
        assert_eq!(button.clicks(), 0);
        site.set_state(&page, StateMode::Paused).await.unwrap();
        assert_eq!(button.clicks(), 1);
    }

    #[tokio::test]
    async fn test_scale_rating_clicks_star() {
        let site = ProfileSite::new(NAVIDROME);
        let page = FixturePage::new("music.home.lan", "/app");
        let stars: Vec<_> = (0..5)
            .map(|i| {
                let star = FixtureElement::new("svg");
                let star = if i < 2 { star.with_class("rating-star filled") } else { star.with_class("rating-star") };
                page.insert(".music-player-panel .rating-star", star)
            })
            .collect();

        assert_eq!(site.rating(&page), Some(2));

        site.set_rating(&page, 4).await.unwrap();
        assert_eq!(stars[3].clicks(), 1);

        site.set_rating(&page, 0).await.unwrap();
        assert_eq!(stars[1].clicks(), 1);
    }

    #[tokio::test]
    async fn test_pandora_thumbs() {
        let site = ProfileSite::new(PANDORA);
        let page = FixturePage::new("www.pandora.com", "/");
        let up = page.insert(
            "[data-qa=\"thumbs_up_button\"]",
            FixtureElement::new("button").with_attribute("aria-checked", "true"),
        );
        let down = page.insert("[data-qa=\"thumbs_down_button\"]", FixtureElement::new("button"));

        assert_eq!(site.rating(&page), Some(LIKED));
        site.set_rating(&page, 1).await.unwrap();
        assert_eq!(down.clicks(), 1);
        assert_eq!(up.clicks(), 0);
    }
}
