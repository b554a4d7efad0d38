//! In-page side of the bridge.
//!
//! [`PageHost`] runs inside the page context, where page-internal objects are
//! reachable through a [`PageRuntime`]. It answers every request, with `null`
//! for events it does not know.

use super::handlers;
use super::{BridgeMessage, PageChannel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Where a page object lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRoot {
    /// The JS object behind the first element matching a selector
    Element(String),
    /// A `window` global
    Global(String),
}

/// A page object: a root plus a dotted property path (may be empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub root: ObjectRoot,
    pub path: String,
}

impl ObjectRef {
    pub fn element(selector: &str, path: &str) -> Self {
        Self {
            root: ObjectRoot::Element(selector.to_string()),
            path: path.to_string(),
        }
    }

    pub fn global(name: &str, path: &str) -> Self {
        Self {
            root: ObjectRoot::Global(name.to_string()),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match &self.root {
            ObjectRoot::Element(selector) => selector.as_str(),
            ObjectRoot::Global(name) => name.as_str(),
        };
        if self.path.is_empty() {
            f.write_str(root)
        } else {
            write!(f, "{}.{}", root, self.path)
        }
    }
}

/// Page-internal state, reachable only from the page context.
///
/// Objects come back as JSON snapshots of their enumerable state. Methods are
/// reached through [`invoke`](PageRuntime::invoke), which returns `None` when
/// the object or method does not exist (optional-chaining semantics).
pub trait PageRuntime: Send + Sync {
    fn element_state(&self, selector: &str) -> Option<Value>;

    fn global(&self, name: &str) -> Option<Value>;

    fn invoke(&self, target: &ObjectRef, method: &str, args: &[Value]) -> Option<Value>;
}

/// A recorded method call on a fixture runtime
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub target: String,
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeData {
    #[serde(default)]
    pub elements: HashMap<String, Value>,
    #[serde(default)]
    pub globals: HashMap<String, Value>,
    /// Canned return values keyed by `<target>.<method>`
    #[serde(default)]
    pub returns: HashMap<String, Value>,
}

/// JSON-backed [`PageRuntime`]
#[derive(Debug, Default)]
pub struct FixtureRuntime {
    data: RuntimeData,
    invocations: Mutex<Vec<Invocation>>,
}

impl FixtureRuntime {
    pub fn new(data: RuntimeData) -> Self {
        Self {
            data,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl PageRuntime for FixtureRuntime {
    fn element_state(&self, selector: &str) -> Option<Value> {
        self.data.elements.get(selector).cloned()
    }

    fn global(&self, name: &str) -> Option<Value> {
        self.data.globals.get(name).cloned()
    }

    fn invoke(&self, target: &ObjectRef, method: &str, args: &[Value]) -> Option<Value> {
        let target = target.to_string();
        let key = format!("{}.{}", target, method);
        if let Ok(mut log) = self.invocations.lock() {
            log.push(Invocation {
                target,
                method: method.to_string(),
                args: args.to_vec(),
            });
        }
        self.data.returns.get(&key).cloned()
    }
}

/// Answers bridge requests from inside the page
pub struct PageHost {
    channel: PageChannel,
    runtime: Arc<dyn PageRuntime>,
}

impl PageHost {
    pub fn new(channel: PageChannel, runtime: Arc<dyn PageRuntime>) -> Self {
        Self { channel, runtime }
    }

    /// Answer a single raw message. Returns the response to post, or `None`
    /// when the message is not a bridge request.
    pub fn answer(&self, raw: Value) -> Option<BridgeMessage> {
        let Ok(BridgeMessage::Request { id, event, data }) = serde_json::from_value(raw) else {
            return None;
        };
        trace!("Page host handling {} ({})", event, id);
        let value = handlers::dispatch(self.runtime.as_ref(), &event, data.as_ref());
        Some(BridgeMessage::Response { id, value })
    }

    /// Serve until the channel closes
    pub async fn run(self) {
        let rx = self.channel.subscribe();
        self.serve(rx).await
    }

    async fn serve(self, mut rx: mpsc::UnboundedReceiver<Value>) {
        while let Some(raw) = rx.recv().await {
            let Some(response) = self.answer(raw) else {
                continue;
            };
            let posted = serde_json::to_value(&response)
                .map_err(crate::types::BridgeError::from)
                .and_then(|value| self.channel.post(value));
            if let Err(e) = posted {
                warn!("Page host failed to reply: {}", e);
            }
        }
        debug!("Page host stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        // Subscribe before returning so no request posted afterwards is missed
        let rx = self.channel.subscribe();
        tokio::spawn(self.serve(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeClient;
    use serde_json::json;

    fn runtime() -> Arc<FixtureRuntime> {
        Arc::new(
            FixtureRuntime::from_json(
                r#"{
                    "returns": { "ytmusic-player-bar.playerApi_.getVolume": 35 }
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_object_ref_display() {
        assert_eq!(
            ObjectRef::element("ytmusic-player-bar", "playerApi_").to_string(),
            "ytmusic-player-bar.playerApi_"
        );
        assert_eq!(ObjectRef::global("netflix", "").to_string(), "netflix");
    }

    #[test]
    fn test_answer_ignores_non_requests() {
        let host = PageHost::new(PageChannel::new(), runtime());
        assert!(host.answer(json!({ "type": "wnp-response", "id": "x", "value": 1 })).is_none());
        assert!(host.answer(json!({ "hello": "page" })).is_none());
        assert!(host.answer(json!("string")).is_none());
    }

    #[test]
    fn test_answer_unknown_event_replies_null() {
        let host = PageHost::new(PageChannel::new(), runtime());
        let response = host
            .answer(json!({ "type": "wnp-message", "id": "x", "event": "getSpotifyInfo" }))
            .unwrap();
        assert_eq!(
            response,
            BridgeMessage::Response { id: "x".to_string(), value: Value::Null }
        );
    }

    #[tokio::test]
    async fn test_client_and_host_round_trip() {
        let channel = PageChannel::new();
        let runtime = runtime();
        let client = BridgeClient::connect(channel.clone());
        PageHost::new(channel.clone(), runtime.clone()).spawn();

        assert_eq!(client.youtube_music_volume().await.unwrap(), Some(35.0));

        client.set_youtube_music_volume(60).await.unwrap();
        let calls = runtime.invocations();
        assert_eq!(calls.last().unwrap().method, "setVolume");
        assert_eq!(calls.last().unwrap().args, vec![json!(60)]);

        let unknown = client.request("getSpotifyInfo", None).await.unwrap();
        assert_eq!(unknown, Value::Null);
    }

    #[tokio::test]
    async fn test_host_answers_request_buried_in_noise() {
        let channel = PageChannel::new();
        let mut replies = channel.subscribe();
        PageHost::new(channel.clone(), runtime()).spawn();

        // Everything is queued before the host gets to run
        let request = BridgeMessage::Request {
            id: "req-1".to_string(),
            event: "getYouTubeMusicVolume".to_string(),
            data: None,
        };
        channel.post(serde_json::to_value(&request).unwrap()).unwrap();
        for n in 0..1000 {
            channel.post(json!({ "type": "page-noise", "n": n })).unwrap();
        }

        let response = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while let Some(raw) = replies.recv().await {
                if let Ok(BridgeMessage::Response { id, value }) = serde_json::from_value(raw) {
                    return Some((id, value));
                }
            }
            None
        })
        .await
        .expect("request lost in page noise");
        assert_eq!(response, Some(("req-1".to_string(), json!(35))));
    }
}
