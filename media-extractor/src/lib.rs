//! Media Extractor - now-playing extraction for media web pages
//!
//! This crate reads the currently playing media from a web page and drives
//! its playback controls:
//!
//! - **Sites**: one adapter per supported site, plus a heuristic fallback
//! - **Bridge**: request/response messaging into the page for state the DOM
//!   does not expose
//! - **Session**: resolves the site, polls it and emits only what changed
//!
//! # Architecture
//!
//! The page is abstracted behind the [`page::Page`] trait so the same adapters
//! run against a live document or a JSON fixture. Every poll reads all fields,
//! normalizes them, and the [`cache::MediaInfoCache`] diffs them against the
//! last emission.

pub mod bridge;
pub mod cache;
pub mod config;
pub mod page;
pub mod rating;
pub mod registry;
pub mod selectors;
pub mod session;
pub mod sites;
pub mod slider;
pub mod types;
pub mod util;

// Re-export commonly used types
pub use bridge::{BridgeClient, PageChannel, PageHost};
pub use cache::MediaInfoCache;
pub use config::{Config, ConfigError, GenericListFilter, Settings};
pub use page::{Element, FixturePage, Page};
pub use registry::SiteRegistry;
pub use session::Session;
pub use sites::Site;
pub use types::{
    BridgeError, ControlError, ControlEvent, Field, FieldValue, MediaInfo, RatingSystem,
    RepeatMode, StateMode,
};
