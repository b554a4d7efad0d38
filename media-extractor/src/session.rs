//! Per-page extraction session.
//!
//! Ties together the site registry, the user's settings, the differential
//! cache and the optional bridge. One session lives as long as the page.

use crate::bridge::BridgeClient;
use crate::cache::MediaInfoCache;
use crate::config::Settings;
use crate::page::Page;
use crate::registry::SiteRegistry;
use crate::sites::{self, Site};
use crate::types::{ControlError, ControlEvent, MediaInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    settings: Settings,
    registry: SiteRegistry,
    cache: MediaInfoCache,
    bridge: Option<BridgeClient>,
    /// Sites whose one-time init already ran
    initialized: HashSet<&'static str>,
    /// Name of the site resolved on the last call
    active: Option<&'static str>,
}

impl Session {
    pub fn new(settings: Settings, registry: SiteRegistry) -> Self {
        Self {
            settings,
            registry,
            cache: MediaInfoCache::new(),
            bridge: None,
            initialized: HashSet::new(),
            active: None,
        }
    }

    pub fn with_bridge(mut self, bridge: BridgeClient) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_cache(mut self, cache: MediaInfoCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings, e.g. after the user edits them
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn cache(&self) -> &MediaInfoCache {
        &self.cache
    }

    /// Resolve the site for the page, running its init the first time it
    /// is seen. A different site than last time starts from an empty cache.
    pub fn current_site(&mut self, page: &dyn Page) -> Option<Arc<dyn Site>> {
        let site = self.registry.resolve(page, &self.settings);
        let name = site.as_ref().map(|s| s.name());

        if name != self.active {
            match name {
                Some(name) => info!("Active site is now {}", name),
                None => debug!("No site for {}", page.hostname()),
            }
            self.cache.clear();
            self.active = name;
        }

        if let Some(site) = &site {
            if self.initialized.insert(site.name()) {
                info!("Initializing {}", site.name());
                site.init(page, self.bridge.as_ref());
            }
        }

        site
    }

    /// Changes since the last poll, if any
    pub fn poll(&mut self, page: &dyn Page) -> Option<MediaInfo> {
        let site = self.current_site(page);
        self.cache.poll(site.as_deref(), page)
    }

    /// Make the next poll emit the full state
    pub fn request_full_snapshot(&mut self) {
        self.cache.request_full_snapshot();
    }

    pub async fn handle_event(&mut self, page: &dyn Page, event: &ControlEvent) -> Result<(), ControlError> {
        let site = self.current_site(page).ok_or(ControlError::NoActiveSite)?;
        debug!("{} -> {}", event.name(), site.name());
        sites::dispatch(site.as_ref(), page, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Element, FixtureElement, FixturePage, MediaElementState};
    use crate::sites::GenericSite;
    use crate::types::{Field, FieldValue, StateMode};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Matches one host and counts its inits
    struct Counting {
        name: &'static str,
        host: &'static str,
        inits: AtomicUsize,
    }

    impl Counting {
        fn new(name: &'static str, host: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                host,
                inits: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Site for Counting {
        fn name(&self) -> &'static str {
            self.name
        }

        fn matches(&self, page: &dyn Page) -> bool {
            page.hostname() == self.host
        }

        fn ready(&self, _page: &dyn Page) -> bool {
            true
        }

        fn init(&self, _page: &dyn Page, _bridge: Option<&BridgeClient>) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }

        fn title(&self, _page: &dyn Page) -> Option<String> {
            Some("Same title".to_string())
        }
    }

    fn session(sites: Vec<Arc<dyn Site>>) -> Session {
        Session::new(
            Settings::default(),
            SiteRegistry::from_sites(sites, Arc::new(GenericSite::new())),
        )
        .with_cache(MediaInfoCache::with_clock(Box::new(|| 42)))
    }

    #[test]
    fn test_init_runs_once_per_site() {
        let a = Counting::new("A", "a.example");
        let b = Counting::new("B", "b.example");
        let mut session = session(vec![a.clone() as Arc<dyn Site>, b.clone() as Arc<dyn Site>]);

        let page_a = FixturePage::new("a.example", "/");
        let page_b = FixturePage::new("b.example", "/");
        for _ in 0..3 {
            session.poll(&page_a);
        }
        session.poll(&page_b);
        session.poll(&page_a);

        assert_eq!(a.inits.load(Ordering::SeqCst), 1);
        assert_eq!(b.inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_site_change_clears_cache() {
        let mut session = session(vec![
            Counting::new("A", "a.example") as Arc<dyn Site>,
            Counting::new("B", "b.example") as Arc<dyn Site>,
        ]);
        let page_a = FixturePage::new("a.example", "/");
        let page_b = FixturePage::new("b.example", "/");

        let first = session.poll(&page_a).unwrap();
        assert_eq!(first.get(&Field::Title), Some(&FieldValue::from("Same title")));
        assert_eq!(session.poll(&page_a), None);

        // Same title, but a new site re-emits it
        let switched = session.poll(&page_b).unwrap();
        assert_eq!(switched.get(&Field::Title), Some(&FieldValue::from("Same title")));
    }

    #[test]
    fn test_no_site_polls_nothing() {
        let mut session = session(vec![Counting::new("A", "a.example") as Arc<dyn Site>]);
        let page = FixturePage::new("elsewhere.example", "/");
        assert!(session.current_site(&page).is_none());
        assert_eq!(session.poll(&page), None);
    }

    #[test]
    fn test_full_snapshot_after_quiet_poll() {
        let mut session = session(vec![Counting::new("A", "a.example") as Arc<dyn Site>]);
        let page = FixturePage::new("a.example", "/");
        let first = session.poll(&page).unwrap();
        assert_eq!(session.poll(&page), None);

        session.request_full_snapshot();
        assert_eq!(session.poll(&page), Some(first));
        assert_eq!(session.poll(&page), None);
    }

    #[tokio::test]
    async fn test_handle_event_without_site() {
        let mut session = session(vec![]);
        let page = FixturePage::new("example.org", "/");
        let result = session.handle_event(&page, &ControlEvent::SkipNext).await;
        assert!(matches!(result, Err(ControlError::NoActiveSite)));
    }

    #[tokio::test]
    async fn test_handle_event_routes_to_site() {
        let mut session = session(vec![Counting::new("A", "a.example") as Arc<dyn Site>]);
        let page = FixturePage::new("a.example", "/");
        let result = session.handle_event(&page, &ControlEvent::ToggleShuffle).await;
        assert!(matches!(result, Err(ControlError::Unsupported("toggleShuffle"))));
    }

    #[tokio::test]
    async fn test_generic_fallback_end_to_end() {
        let mut session = session(vec![]);
        session.set_settings(Settings {
            use_generic: true,
            ..Default::default()
        });

        let page = FixturePage::new("radio.example.org", "/");
        let audio = page.insert(
            "audio",
            FixtureElement::new("audio").with_media(MediaElementState {
                paused: true,
                duration: 300.0,
                volume: 1.0,
                ..Default::default()
            }),
        );

        let first = session.poll(&page).unwrap();
        assert_eq!(first.get(&Field::State), Some(&FieldValue::from(StateMode::Paused)));
        assert_eq!(first.get(&Field::Duration), Some(&FieldValue::Integer(300)));

        session
            .handle_event(&page, &ControlEvent::SetState { state: StateMode::Playing })
            .await
            .unwrap();
        assert!(!audio.media_state().unwrap().paused);

        let delta = session.poll(&page).unwrap();
        assert_eq!(delta.get(&Field::State), Some(&FieldValue::from(StateMode::Playing)));
        assert_eq!(delta.get(&Field::Timestamp), Some(&FieldValue::Integer(42)));
    }
}
