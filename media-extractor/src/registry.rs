//! Registry of supported sites and page-to-site resolution.

use crate::config::Settings;
use crate::page::Page;
use crate::sites::{
    profile, GenericSite, NetflixSite, ProfileSite, Site, SoundCloudSite, YouTubeEmbedSite,
    YouTubeMusicSite, YouTubeSite, DEFAULT_REFRESH,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Ordered list of site adapters. The first match wins, so more specific
/// sites must come before the ones they overlap with.
pub struct SiteRegistry {
    sites: Vec<Arc<dyn Site>>,
    generic: Arc<dyn Site>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::with_bridge_refresh(DEFAULT_REFRESH)
    }

    /// Built-in sites, with bridge-backed sites refreshing every `interval`
    pub fn with_bridge_refresh(interval: Duration) -> Self {
        let sites: Vec<Arc<dyn Site>> = vec![
            Arc::new(ProfileSite::new(profile::APPLE_MUSIC)),
            Arc::new(ProfileSite::new(profile::BANDCAMP)),
            Arc::new(ProfileSite::new(profile::DEEZER)),
            Arc::new(ProfileSite::new(profile::INVIDIOUS)),
            Arc::new(ProfileSite::new(profile::JELLYFIN)),
            Arc::new(ProfileSite::new(profile::NAVIDROME)),
            Arc::new(NetflixSite::with_refresh(interval)),
            Arc::new(ProfileSite::new(profile::PANDORA)),
            Arc::new(ProfileSite::new(profile::PLEX)),
            Arc::new(ProfileSite::new(profile::RADIO_ADDICT)),
            Arc::new(SoundCloudSite::new()),
            Arc::new(ProfileSite::new(profile::SPOTIFY)),
            Arc::new(ProfileSite::new(profile::TIDAL)),
            Arc::new(ProfileSite::new(profile::TWITCH)),
            // Embeds share the host with YouTube and must match first
            Arc::new(YouTubeEmbedSite::new()),
            Arc::new(YouTubeSite::with_refresh(interval)),
            Arc::new(YouTubeMusicSite::with_refresh(interval)),
        ];

        Self::from_sites(sites, Arc::new(GenericSite::new()))
    }

    /// Custom site list, in resolution order, plus the fallback adapter
    pub fn from_sites(sites: Vec<Arc<dyn Site>>, generic: Arc<dyn Site>) -> Self {
        Self { sites, generic }
    }

    pub fn sites(&self) -> &[Arc<dyn Site>] {
        &self.sites
    }

    /// Names in resolution order, fallback last
    pub fn names(&self) -> Vec<&'static str> {
        self.sites
            .iter()
            .chain(std::iter::once(&self.generic))
            .map(|site| site.name())
            .collect()
    }

    /// Pick the adapter for a page: the first enabled site that matches,
    /// else the generic fallback if the settings allow it here.
    pub fn resolve(&self, page: &dyn Page, settings: &Settings) -> Option<Arc<dyn Site>> {
        let matched = self
            .sites
            .iter()
            .find(|site| site.matches(page) && !settings.is_disabled(site.name()));
        if let Some(site) = matched {
            trace!("Resolved {} for {}", site.name(), page.hostname());
            return Some(Arc::clone(site));
        }

        let hostname = page.hostname();
        if settings.generic_filter().allows(&hostname) {
            trace!("Falling back to generic adapter for {}", hostname);
            return Some(Arc::clone(&self.generic));
        }

        None
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
