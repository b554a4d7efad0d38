//! Request/response bridge between the content script and the page.
//!
//! The content script cannot see page-internal JavaScript objects, so a
//! script injected into the page answers questions for it. Both sides talk
//! over the page's shared message channel (visible to the page itself):
//!
//! - request: `{"type":"wnp-message","id":..,"event":..,"data":..}`
//! - response: `{"type":"wnp-response","id":..,"value":..}`
//!
//! [`BridgeClient`] keeps a map from request id to a pending completion and
//! resolves it when the matching response arrives. There is no timeout: a
//! request nobody answers stays pending.

pub mod handlers;
pub mod host;

use crate::types::BridgeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

pub use handlers::{NavData, NetflixInfo, SeasonData, YouTubeInfo};
pub use host::{FixtureRuntime, Invocation, ObjectRef, ObjectRoot, PageHost, PageRuntime};

/// `type` tag of requests
pub const REQUEST_TYPE: &str = "wnp-message";

/// `type` tag of responses
pub const RESPONSE_TYPE: &str = "wnp-response";

/// A bridge message on the page channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "wnp-message")]
    Request {
        id: String,
        event: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    #[serde(rename = "wnp-response")]
    Response {
        id: String,
        #[serde(default)]
        value: Value,
    },
}

/// Operations the in-page script knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeEvent {
    GetYouTubeInfo,
    SetYouTubeVolume,
    GetYouTubeMusicVolume,
    SetYouTubeMusicVolume,
    SeekNetflix,
    GetNetflixInfo,
}

impl BridgeEvent {
    pub const ALL: [BridgeEvent; 6] = [
        BridgeEvent::GetYouTubeInfo,
        BridgeEvent::SetYouTubeVolume,
        BridgeEvent::GetYouTubeMusicVolume,
        BridgeEvent::SetYouTubeMusicVolume,
        BridgeEvent::SeekNetflix,
        BridgeEvent::GetNetflixInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeEvent::GetYouTubeInfo => "getYouTubeInfo",
            BridgeEvent::SetYouTubeVolume => "setYouTubeVolume",
            BridgeEvent::GetYouTubeMusicVolume => "getYouTubeMusicVolume",
            BridgeEvent::SetYouTubeMusicVolume => "setYouTubeMusicVolume",
            BridgeEvent::SeekNetflix => "seekNetflix",
            BridgeEvent::GetNetflixInfo => "getNetflixInfo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

/// The page's cross-context message primitive.
///
/// Every subscriber sees every message, including its own, like
/// `window.postMessage`. Each subscriber gets its own unbounded queue, so
/// unrelated page traffic can never push a bridge message out.
#[derive(Debug, Clone)]
pub struct PageChannel {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Value>>>>,
}

impl PageChannel {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliver to every live subscriber. Fails when nobody is listening.
    pub fn post(&self, message: Value) -> Result<(), BridgeError> {
        let mut subscribers = self.subscribers.lock().map_err(|_| BridgeError::Send)?;
        subscribers.retain(|tx| tx.send(message.clone()).is_ok());
        if subscribers.is_empty() {
            return Err(BridgeError::Send);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Number of subscribers that have not gone away yet
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|s| s.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl Default for PageChannel {
    fn default() -> Self {
        Self::new()
    }
}

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>;

/// Removes a request from the pending map when its caller stops waiting,
/// whether it got an answer or was dropped
struct PendingEntry<'a> {
    pending: &'a PendingMap,
    id: String,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&self.id);
        }
    }
}

/// Content-script side of the bridge
#[derive(Debug, Clone)]
pub struct BridgeClient {
    channel: PageChannel,
    pending: PendingMap,
}

impl BridgeClient {
    /// Start listening for responses on `channel`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(channel: PageChannel) -> Self {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let rx = channel.subscribe();
        tokio::spawn(listen(rx, Arc::clone(&pending)));

        Self { channel, pending }
    }

    /// Requests still waiting for a response
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Send a request and wait for its response. Waits forever if the page
    /// never answers. Dropping the returned future forgets the request.
    pub async fn request(&self, event: &str, data: Option<Value>) -> Result<Value, BridgeError> {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(id.clone(), tx);
        }
        let _entry = PendingEntry {
            pending: &self.pending,
            id: id.clone(),
        };

        let message = BridgeMessage::Request {
            id: id.clone(),
            event: event.to_string(),
            data,
        };
        debug!("Bridge request {} ({})", event, id);

        let value = serde_json::to_value(&message)?;
        self.channel.post(value)?;

        rx.await.map_err(|_| BridgeError::Disconnected)
    }

    /// [`request`](Self::request) with the response decoded into `T`
    pub async fn request_as<T>(&self, event: BridgeEvent, data: Option<Value>) -> Result<T, BridgeError>
    where
        T: DeserializeOwned,
    {
        let value = self.request(event.as_str(), data).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn youtube_info(&self) -> Result<YouTubeInfo, BridgeError> {
        self.request_as(BridgeEvent::GetYouTubeInfo, None).await
    }

    pub async fn set_youtube_volume(&self, volume: u8) -> Result<(), BridgeError> {
        self.request(BridgeEvent::SetYouTubeVolume.as_str(), Some(Value::from(volume)))
            .await
            .map(|_| ())
    }

    pub async fn youtube_music_volume(&self) -> Result<Option<f64>, BridgeError> {
        self.request_as(BridgeEvent::GetYouTubeMusicVolume, None).await
    }

    pub async fn set_youtube_music_volume(&self, volume: u8) -> Result<(), BridgeError> {
        self.request(BridgeEvent::SetYouTubeMusicVolume.as_str(), Some(Value::from(volume)))
            .await
            .map(|_| ())
    }

    pub async fn seek_netflix(&self, seconds: f64) -> Result<(), BridgeError> {
        self.request(BridgeEvent::SeekNetflix.as_str(), Some(Value::from(seconds)))
            .await
            .map(|_| ())
    }

    pub async fn netflix_info(&self) -> Result<NetflixInfo, BridgeError> {
        self.request_as(BridgeEvent::GetNetflixInfo, None).await
    }
}

/// Resolve pending requests as responses arrive. Anything that is not a
/// response to one of our ids is ignored.
async fn listen(mut rx: mpsc::UnboundedReceiver<Value>, pending: PendingMap) {
    while let Some(raw) = rx.recv().await {
        let Ok(BridgeMessage::Response { id, value }) = serde_json::from_value(raw) else {
            continue;
        };
        let waiter = pending.lock().ok().and_then(|mut p| p.remove(&id));
        match waiter {
            Some(tx) => {
                trace!("Bridge response {}", id);
                let _ = tx.send(value);
            }
            None => trace!("Ignoring unmatched bridge response {}", id),
        }
    }

    debug!("Page channel closed, failing pending bridge requests");
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
}
