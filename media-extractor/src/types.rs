//! Core types used throughout the media extractor.
//!
//! This module defines the normalized media schema, the control events the
//! outside world can send, and the error types shared by the other modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A field of the normalized media schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Player,
    State,
    Title,
    Artist,
    Album,
    Cover,
    Duration,
    Position,
    Volume,
    Rating,
    Repeat,
    Shuffle,
    Timestamp,
}

impl Field {
    /// Fields read from the site on every poll, in read order.
    /// `Timestamp` is derived by the cache and never read.
    pub const POLLED: [Field; 12] = [
        Field::Player,
        Field::State,
        Field::Title,
        Field::Artist,
        Field::Album,
        Field::Cover,
        Field::Duration,
        Field::Position,
        Field::Volume,
        Field::Rating,
        Field::Repeat,
        Field::Shuffle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Player => "player",
            Field::State => "state",
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Cover => "cover",
            Field::Duration => "duration",
            Field::Position => "position",
            Field::Volume => "volume",
            Field::Rating => "rating",
            Field::Repeat => "repeat",
            Field::Shuffle => "shuffle",
            Field::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateMode {
    Playing,
    Paused,
    Stopped,
}

impl StateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMode::Playing => "PLAYING",
            StateMode::Paused => "PAUSED",
            StateMode::Stopped => "STOPPED",
        }
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepeatMode {
    None,
    One,
    All,
}

impl RepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::None => "NONE",
            RepeatMode::One => "ONE",
            RepeatMode::All => "ALL",
        }
    }
}

/// How a site lets the user rate the current item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingSystem {
    /// No rating affordance
    None,
    /// A single like/heart toggle
    Like,
    /// Separate like and dislike toggles
    LikeDislike,
    /// Direct numeric scale
    Scale,
}

/// A single value of the media schema.
///
/// `Number` is what accessors hand back; the cache rounds it to `Integer`
/// before comparing or emitting, so emissions never contain `Number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    State(StateMode),
    Repeat(RepeatMode),
    Text(String),
}

impl FieldValue {
    /// Round numbers to the nearest integer and trim text
    pub fn normalized(self) -> Self {
        match self {
            FieldValue::Number(n) if n.is_finite() => FieldValue::Integer(n.round() as i64),
            FieldValue::Number(_) => FieldValue::Integer(0),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    FieldValue::Text(s)
                } else {
                    FieldValue::Text(trimmed.to_string())
                }
            }
            other => other,
        }
    }

    /// Whether the value stringifies to an empty string
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn as_state(&self) -> Option<StateMode> {
        match self {
            FieldValue::State(state) => Some(*state),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Number(n) if n.is_finite() => Some(n.round() as i64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::State(s) => f.write_str(s.as_str()),
            FieldValue::Repeat(r) => f.write_str(r.as_str()),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<StateMode> for FieldValue {
    fn from(value: StateMode) -> Self {
        FieldValue::State(value)
    }
}

impl From<RepeatMode> for FieldValue {
    fn from(value: RepeatMode) -> Self {
        FieldValue::Repeat(value)
    }
}

/// Partial or full media snapshot, keyed by field
pub type MediaInfo = BTreeMap<Field, FieldValue>;

/// Control commands accepted from the outside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ControlEvent {
    SetState { state: StateMode },
    SkipPrevious,
    SkipNext,
    SetPositionSeconds { seconds: f64 },
    SetPositionPercentage { percentage: f64 },
    SetVolume { volume: u8 },
    ToggleRepeat,
    ToggleShuffle,
    SetRating { rating: u8 },
}

impl ControlEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControlEvent::SetState { .. } => "setState",
            ControlEvent::SkipPrevious => "skipPrevious",
            ControlEvent::SkipNext => "skipNext",
            ControlEvent::SetPositionSeconds { .. } => "setPositionSeconds",
            ControlEvent::SetPositionPercentage { .. } => "setPositionPercentage",
            ControlEvent::SetVolume { .. } => "setVolume",
            ControlEvent::ToggleRepeat => "toggleRepeat",
            ControlEvent::ToggleShuffle => "toggleShuffle",
            ControlEvent::SetRating { .. } => "setRating",
        }
    }
}

/// Errors from the page message bridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Page channel closed")]
    Disconnected,

    #[error("Failed to post message to page channel")]
    Send,

    #[error("Malformed bridge payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors that can occur while dispatching a control event
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("Event not supported by this site: {0}")]
    Unsupported(&'static str),

    #[error("No active site on this page")]
    NoActiveSite,

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_rounds_numbers() {
        assert_eq!(FieldValue::Number(41.5).normalized(), FieldValue::Integer(42));
        assert_eq!(FieldValue::Number(41.49).normalized(), FieldValue::Integer(41));
        assert_eq!(FieldValue::Number(f64::NAN).normalized(), FieldValue::Integer(0));
    }

    #[test]
    fn test_normalize_trims_text() {
        assert_eq!(
            FieldValue::Text("  Song  \n".to_string()).normalized(),
            FieldValue::Text("Song".to_string())
        );
        assert_eq!(FieldValue::Bool(true).normalized(), FieldValue::Bool(true));
    }

    #[test]
    fn test_is_blank() {
        assert!(FieldValue::from("").is_blank());
        assert!(!FieldValue::from("x").is_blank());
        assert!(!FieldValue::Integer(0).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn test_field_value_serialization() {
        let mut info = MediaInfo::new();
        info.insert(Field::State, StateMode::Playing.into());
        info.insert(Field::Title, "Song".into());
        info.insert(Field::Volume, FieldValue::Integer(80));
        info.insert(Field::Shuffle, false.into());
        info.insert(Field::Repeat, RepeatMode::All.into());

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"state":"PLAYING","title":"Song","volume":80,"repeat":"ALL","shuffle":false}"#
        );
    }

    #[test]
    fn test_control_event_deserialize() {
        let event: ControlEvent =
            serde_json::from_str(r#"{"event":"setVolume","volume":40}"#).unwrap();
        assert_eq!(event, ControlEvent::SetVolume { volume: 40 });

        let event: ControlEvent = serde_json::from_str(r#"{"event":"skipNext"}"#).unwrap();
        assert_eq!(event.name(), "skipNext");
    }

    #[test]
    fn test_rating_system_wire_names() {
        assert_eq!(
            serde_json::to_string(&RatingSystem::LikeDislike).unwrap(),
            r#""LIKE_DISLIKE""#
        );
    }
}
