//! Page access seen from the isolated content script.
//!
//! Sites never touch a browser directly. They read the page through the
//! [`Page`] and [`Element`] traits, which the browser glue implements over the
//! real DOM. The [`fixture`] module provides a JSON-backed implementation used
//! by the replay binary and the tests.

pub mod fixture;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use fixture::{FixtureElement, FixturePage, Interaction};

/// Element bounding box in client coordinates (`getBoundingClientRect`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Center point of the box
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseEventKind {
    MouseDown,
    MouseUp,
    MouseOver,
    MouseMove,
    MouseOut,
}

/// A synthetic bubbling, cancelable mouse event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub client_x: f64,
    pub client_y: f64,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, client_x: f64, client_y: f64) -> Self {
        Self {
            kind,
            client_x,
            client_y,
        }
    }

    /// Event at the origin, for hover/unhover style events
    pub fn at_origin(kind: MouseEventKind) -> Self {
        Self::new(kind, 0.0, 0.0)
    }
}

/// Playback properties of a `<video>` or `<audio>` element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaElementState {
    pub paused: bool,
    #[serde(default)]
    pub ended: bool,
    /// Seconds
    pub current_time: f64,
    /// Seconds, NaN while metadata is loading
    pub duration: f64,
    /// 0.0 - 1.0
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

/// Commands a media element accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum MediaCommand {
    Play,
    Pause,
    Seek { seconds: f64 },
    SetVolume { volume: f64 },
    SetLoop { enabled: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    None,
    Paused,
    Playing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaImage {
    pub src: String,
    /// Space separated `WxH` list, as in the web manifest format
    #[serde(default)]
    pub sizes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artwork: Vec<MediaImage>,
}

/// Snapshot of `navigator.mediaSession`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSession {
    #[serde(default)]
    pub metadata: Option<MediaMetadata>,
    #[serde(default)]
    pub playback_state: PlaybackState,
}

/// A DOM element
pub trait Element: Send + Sync {
    /// Tag name in lowercase
    fn local_name(&self) -> String;

    /// Rendered text (`innerText`)
    fn text(&self) -> String;

    fn class_name(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    fn bounding_rect(&self) -> Rect;

    /// `disabled` property of form controls, false elsewhere
    fn disabled(&self) -> bool;

    fn click(&self);

    fn dispatch_mouse(&self, event: MouseEvent);

    /// Playback state if this is a media element
    fn media_state(&self) -> Option<MediaElementState> {
        None
    }

    /// Drive a media element; ignored by other elements
    fn media_command(&self, _command: MediaCommand) {}

    fn has_class(&self, class: &str) -> bool {
        self.class_name().split_whitespace().any(|c| c == class)
    }
}

/// The page as visible to the content script
pub trait Page: Send + Sync {
    /// `location.hostname`
    fn hostname(&self) -> String;

    /// `location.pathname`
    fn pathname(&self) -> String;

    /// All elements matching a selector, in document order
    fn query_all(&self, selector: &str) -> Vec<Arc<dyn Element>>;

    fn media_session(&self) -> MediaSession;

    /// First element matching a selector
    fn query(&self, selector: &str) -> Option<Arc<dyn Element>> {
        self.query_all(selector).into_iter().next()
    }

    fn exists(&self, selector: &str) -> bool {
        self.query(selector).is_some()
    }
}
