//! Background refresh of bridge-backed site state.
//!
//! Accessors are synchronous, but some sites can only learn their state by
//! asking the in-page script. Those sites start a refresh loop from `init`
//! and their accessors read the last answer.

use crate::bridge::BridgeClient;
use crate::types::BridgeError;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Refresh interval when none is configured
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(1000);

/// Last value fetched over the bridge, plus the client used to fetch it
#[derive(Debug)]
pub struct BridgeState<T> {
    value: Arc<Mutex<Option<T>>>,
    bridge: Mutex<Option<BridgeClient>>,
    interval: Duration,
    /// Running refresh loop, aborted on `stop` or drop
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> BridgeState<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(interval: Duration) -> Self {
        Self {
            value: Arc::new(Mutex::new(None)),
            bridge: Mutex::new(None),
            interval,
            task: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.value.lock().ok().and_then(|v| v.clone())
    }

    pub fn set(&self, value: T) {
        store(&self.value, value);
    }

    /// Client handed to [`start`](Self::start), if any
    pub fn bridge(&self) -> Option<BridgeClient> {
        self.bridge.lock().ok().and_then(|b| b.clone())
    }

    /// Keep the bridge and spawn the refresh loop on the current tokio
    /// runtime. Without a runtime the bridge is kept but nothing refreshes.
    /// A loop from an earlier call is stopped first.
    pub fn start<F, Fut>(&self, site: &'static str, bridge: &BridgeClient, fetch: F)
    where
        F: Fn(BridgeClient) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BridgeError>> + Send + 'static,
    {
        if let Ok(mut slot) = self.bridge.lock() {
            *slot = Some(bridge.clone());
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime, {} state will not refresh", site);
            return;
        };

        self.stop();
        info!("Starting {} bridge refresh every {:?}", site, self.interval);
        let value = Arc::clone(&self.value);
        let bridge = bridge.clone();
        let interval = self.interval;
        let task = handle.spawn(async move {
            loop {
                match fetch(bridge.clone()).await {
                    Ok(fetched) => store(&value, fetched),
                    Err(e) => debug!("{} bridge refresh failed: {}", site, e),
                }
                tokio::time::sleep(interval).await;
            }
        });
        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(task);
        }
    }

    /// Abort the refresh loop. The last value stays readable.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().ok().and_then(|mut t| t.take()) {
            task.abort();
        }
    }
}

impl<T> Drop for BridgeState<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().ok().and_then(Option::take) {
            task.abort();
        }
    }
}

fn store<T>(slot: &Mutex<Option<T>>, value: T) {
    if let Ok(mut current) = slot.lock() {
        *current = Some(value);
    }
}
