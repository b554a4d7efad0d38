//! JSON-backed page fixtures.
//!
//! A fixture maps selector strings verbatim to element lists; there is no
//! selector engine. Elements record every interaction so callers can check
//! what a control event did.

use super::{
    Element, MediaCommand, MediaElementState, MediaSession, MouseEvent, Page, Rect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tracing::trace;

/// Something done to a fixture element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Interaction {
    Click,
    Mouse(MouseEvent),
    Media(MediaCommand),
}

/// Serialized form of an element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementData {
    #[serde(default = "default_local_name")]
    pub local_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub media: Option<MediaElementState>,
}

fn default_local_name() -> String {
    "div".to_string()
}

/// Serialized form of a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageData {
    pub hostname: String,
    #[serde(default = "default_pathname")]
    pub pathname: String,
    #[serde(default)]
    pub media_session: MediaSession,
    #[serde(default)]
    pub elements: HashMap<String, Vec<ElementData>>,
}

fn default_pathname() -> String {
    "/".to_string()
}

#[derive(Debug)]
pub struct FixtureElement {
    local_name: String,
    text: RwLock<String>,
    class_name: RwLock<String>,
    attributes: RwLock<HashMap<String, String>>,
    rect: RwLock<Rect>,
    disabled: bool,
    media: RwLock<Option<MediaElementState>>,
    interactions: Mutex<Vec<Interaction>>,
}

impl FixtureElement {
    pub fn new(local_name: &str) -> Self {
        Self::from_data(ElementData {
            local_name: local_name.to_string(),
            ..Default::default()
        })
    }

    pub fn from_data(data: ElementData) -> Self {
        Self {
            local_name: data.local_name,
            text: RwLock::new(data.text),
            class_name: RwLock::new(data.class_name),
            attributes: RwLock::new(data.attributes),
            rect: RwLock::new(data.rect),
            disabled: data.disabled,
            media: RwLock::new(data.media),
            interactions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_class(self, class_name: &str) -> Self {
        self.set_class_name(class_name);
        self
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        if let Ok(mut attributes) = self.attributes.write() {
            attributes.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn with_rect(self, rect: Rect) -> Self {
        if let Ok(mut current) = self.rect.write() {
            *current = rect;
        }
        self
    }

    pub fn with_media(self, media: MediaElementState) -> Self {
        if let Ok(mut current) = self.media.write() {
            *current = Some(media);
        }
        self
    }

    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn set_text(&self, text: &str) {
        if let Ok(mut current) = self.text.write() {
            *current = text.to_string();
        }
    }

    pub fn set_class_name(&self, class_name: &str) {
        if let Ok(mut current) = self.class_name.write() {
            *current = class_name.to_string();
        }
    }

    /// Everything done to this element so far
    pub fn interactions(&self) -> Vec<Interaction> {
        self.interactions
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn clicks(&self) -> usize {
        self.interactions()
            .iter()
            .filter(|i| matches!(i, Interaction::Click))
            .count()
    }

    fn record(&self, interaction: Interaction) {
        trace!("Fixture <{}> {:?}", self.local_name, interaction);
        if let Ok(mut log) = self.interactions.lock() {
            log.push(interaction);
        }
    }
}

impl Element for FixtureElement {
    fn local_name(&self) -> String {
        self.local_name.clone()
    }

    fn text(&self) -> String {
        self.text.read().map(|t| t.clone()).unwrap_or_default()
    }

    fn class_name(&self) -> String {
        self.class_name.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().ok()?.get(name).cloned()
    }

    fn bounding_rect(&self) -> Rect {
        self.rect.read().map(|r| *r).unwrap_or_default()
    }

    fn disabled(&self) -> bool {
        self.disabled
    }

    fn click(&self) {
        self.record(Interaction::Click);
    }

    fn dispatch_mouse(&self, event: MouseEvent) {
        self.record(Interaction::Mouse(event));
    }

    fn media_state(&self) -> Option<MediaElementState> {
        self.media.read().ok().and_then(|m| *m)
    }

    fn media_command(&self, command: MediaCommand) {
        self.record(Interaction::Media(command));
        let Ok(mut guard) = self.media.write() else {
            return;
        };
        let Some(media) = guard.as_mut() else {
            return;
        };
        match command {
            MediaCommand::Play => media.paused = false,
            MediaCommand::Pause => media.paused = true,
            MediaCommand::Seek { seconds } => media.current_time = seconds,
            MediaCommand::SetVolume { volume } => media.volume = volume.clamp(0.0, 1.0),
            MediaCommand::SetLoop { enabled } => media.looping = enabled,
        }
    }
}

/// In-memory page
#[derive(Debug, Default)]
pub struct FixturePage {
    hostname: String,
    pathname: String,
    media_session: RwLock<MediaSession>,
    elements: RwLock<HashMap<String, Vec<Arc<FixtureElement>>>>,
}

impl FixturePage {
    pub fn new(hostname: &str, pathname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            pathname: pathname.to_string(),
            ..Default::default()
        }
    }

    pub fn from_data(data: PageData) -> Self {
        let elements = data
            .elements
            .into_iter()
            .map(|(selector, list)| {
                let list = list
                    .into_iter()
                    .map(|e| Arc::new(FixtureElement::from_data(e)))
                    .collect();
                (selector, list)
            })
            .collect();

        Self {
            hostname: data.hostname,
            pathname: data.pathname,
            media_session: RwLock::new(data.media_session),
            elements: RwLock::new(elements),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: PageData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Append an element under a selector and return a handle to it
    pub fn insert(&self, selector: &str, element: FixtureElement) -> Arc<FixtureElement> {
        let element = Arc::new(element);
        if let Ok(mut elements) = self.elements.write() {
            elements
                .entry(selector.to_string())
                .or_default()
                .push(Arc::clone(&element));
        }
        element
    }

    pub fn remove(&self, selector: &str) {
        if let Ok(mut elements) = self.elements.write() {
            elements.remove(selector);
        }
    }

    /// First concrete element under a selector
    pub fn element(&self, selector: &str) -> Option<Arc<FixtureElement>> {
        self.elements.read().ok()?.get(selector)?.first().cloned()
    }

    pub fn set_media_session(&self, session: MediaSession) {
        if let Ok(mut current) = self.media_session.write() {
            *current = session;
        }
    }
}

impl Page for FixturePage {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn query_all(&self, selector: &str) -> Vec<Arc<dyn Element>> {
        self.elements
            .read()
            .ok()
            .and_then(|elements| elements.get(selector).cloned())
            .unwrap_or_default()
            .into_iter()
            .map(|e| e as Arc<dyn Element>)
            .collect()
    }

    fn media_session(&self) -> MediaSession {
        self.media_session
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MouseEventKind;

    #[test]
    fn test_fixture_from_json() {
        let json = r#"{
            "hostname": "soundcloud.com",
            "elements": {
                ".playControl": [{ "local_name": "button", "class_name": "playControl playing" }]
            }
        }"#;

        let page = FixturePage::from_json(json).unwrap();
        assert_eq!(page.hostname(), "soundcloud.com");
        assert_eq!(page.pathname(), "/");

        let button = page.query(".playControl").unwrap();
        assert_eq!(button.local_name(), "button");
        assert!(button.has_class("playing"));
        assert!(!button.has_class("play"));
        assert!(page.query(".missing").is_none());
    }

    #[test]
    fn test_fixture_records_interactions() {
        let page = FixturePage::new("example.com", "/");
        let element = page.insert(".target", FixtureElement::new("div"));

        let found = page.query(".target").unwrap();
        found.click();
        found.dispatch_mouse(MouseEvent::at_origin(MouseEventKind::MouseOver));

        assert_eq!(element.clicks(), 1);
        assert_eq!(element.interactions().len(), 2);
    }

    #[test]
    fn test_fixture_media_commands_update_state() {
        let page = FixturePage::new("example.com", "/");
        let video = page.insert(
            "video",
            FixtureElement::new("video").with_media(MediaElementState {
                paused: true,
                duration: 300.0,
                volume: 1.0,
                ..Default::default()
            }),
        );

        let found = page.query("video").unwrap();
        found.media_command(MediaCommand::Play);
        found.media_command(MediaCommand::Seek { seconds: 42.0 });
        found.media_command(MediaCommand::SetVolume { volume: 1.5 });

        let state = video.media_state().unwrap();
        assert!(!state.paused);
        assert_eq!(state.current_time, 42.0);
        assert_eq!(state.volume, 1.0);
    }
}
