//! Differential media state cache.
//!
//! Every poll reads all fields from the active site, normalizes them and
//! emits only what changed since the last emission. `timestamp` is derived:
//! it moves whenever the state or title changes, or the volume changes while
//! playing, so consumers can tell which of several players was touched last.

use crate::page::Page;
use crate::sites::{read_field, Site};
use crate::types::{Field, FieldValue, MediaInfo, StateMode};
use std::collections::BTreeMap;
use tracing::trace;

/// Milliseconds since the Unix epoch
pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Last emitted value per field
pub struct MediaInfoCache {
    values: BTreeMap<Field, FieldValue>,
    /// Emit the whole cache on the next poll
    send_full: bool,
    clock: Clock,
}

impl MediaInfoCache {
    pub fn new() -> Self {
        Self::with_clock(Box::new(system_clock))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            values: BTreeMap::new(),
            send_full: false,
            clock,
        }
    }

    /// Read the site and return what changed, the full snapshot if one was
    /// requested, or `None` when there is nothing to send
    pub fn poll(&mut self, site: Option<&dyn Site>, page: &dyn Page) -> Option<MediaInfo> {
        let site = site?;
        if !site.ready(page) {
            trace!("{} not ready", site.name());
            return None;
        }

        let mut delta = MediaInfo::new();
        for field in Field::POLLED {
            let Some(value) = read_field(site, page, field) else {
                continue;
            };
            let value = value.normalized();
            if self.values.get(&field) == Some(&value) {
                continue;
            }

            if self.moves_timestamp(field) {
                let timestamp = if value.is_blank() { 0 } else { (self.clock)() };
                self.values.insert(Field::Timestamp, FieldValue::Integer(timestamp));
                delta.insert(Field::Timestamp, FieldValue::Integer(timestamp));
            }

            trace!("{}: {} changed to {}", site.name(), field, value);
            self.values.insert(field, value.clone());
            delta.insert(field, value);
        }

        if self.send_full {
            self.send_full = false;
            return Some(self.values.clone());
        }

        if delta.is_empty() {
            None
        } else {
            Some(delta)
        }
    }

    /// Volume only counts while playing, judged by the cached state
    fn moves_timestamp(&self, field: Field) -> bool {
        match field {
            Field::State | Field::Title => true,
            Field::Volume => self.cached_state() == StateMode::Playing,
            _ => false,
        }
    }

    fn cached_state(&self) -> StateMode {
        self.values
            .get(&Field::State)
            .and_then(FieldValue::as_state)
            .unwrap_or(StateMode::Stopped)
    }

    /// Send everything on the next poll
    pub fn request_full_snapshot(&mut self) {
        self.send_full = true;
    }

    pub fn is_full_snapshot_pending(&self) -> bool {
        self.send_full
    }

    /// Forget all values, e.g. when the active site changes
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn snapshot(&self) -> MediaInfo {
        self.values.clone()
    }
}

impl Default for MediaInfoCache {
    fn default() -> Self {
        Self::new()
    }
}
