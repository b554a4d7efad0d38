//! End-to-end replay of recorded pages through a session.

use media_extractor::bridge::FixtureRuntime;
use media_extractor::page::{Element, Page, PlaybackState};
use media_extractor::{
    BridgeClient, Config, ControlError, ControlEvent, Field, FieldValue, FixturePage,
    MediaInfo, MediaInfoCache, PageChannel, PageHost, RepeatMode, Session, SiteRegistry,
    StateMode,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

const NOW: i64 = 1_700_000_000_000;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn session(config: &Config) -> Session {
    let registry = SiteRegistry::with_bridge_refresh(config.timing.bridge_refresh());
    Session::new(config.sites.clone(), registry)
        .with_cache(MediaInfoCache::with_clock(Box::new(|| NOW)))
}

#[test]
fn test_soundcloud_first_poll() {
    let page = FixturePage::load(&fixture("soundcloud.json")).unwrap();
    let mut session = session(&Config::default());

    let info = session.poll(&page).unwrap();
    let expected: MediaInfo = [
        (Field::Player, FieldValue::from("Soundcloud")),
        (Field::State, FieldValue::from(StateMode::Playing)),
        (Field::Title, FieldValue::from("Windowlicker")),
        (Field::Artist, FieldValue::from("Aphex Twin")),
        (Field::Album, FieldValue::from("Windowlicker EP")),
        (Field::Cover, FieldValue::from("https://i1.sndcdn.com/artworks-large.jpg")),
        (Field::Duration, FieldValue::Integer(367)),
        (Field::Position, FieldValue::Integer(65)),
        (Field::Volume, FieldValue::Integer(25)),
        (Field::Rating, FieldValue::Integer(5)),
        (Field::Repeat, FieldValue::from(RepeatMode::All)),
        (Field::Shuffle, FieldValue::from(false)),
        (Field::Timestamp, FieldValue::Integer(NOW)),
    ]
    .into_iter()
    .collect();
    assert_eq!(info, expected);

    assert_eq!(session.poll(&page), None);
}

#[test]
fn test_soundcloud_pause_emits_state_and_timestamp() {
    let page = FixturePage::load(&fixture("soundcloud.json")).unwrap();
    let mut session = session(&Config::default());
    let first = session.poll(&page).unwrap();

    let line = serde_json::to_string(&first).unwrap();
    assert!(line.starts_with(r#"{"player":"Soundcloud","state":"PLAYING","title":"Windowlicker""#));

    let mut media_session = page.media_session();
    media_session.playback_state = PlaybackState::Paused;
    page.set_media_session(media_session);

    let delta = session.poll(&page).unwrap();
    let expected: MediaInfo = [
        (Field::State, FieldValue::from(StateMode::Paused)),
        (Field::Timestamp, FieldValue::Integer(NOW)),
    ]
    .into_iter()
    .collect();
    assert_eq!(delta, expected);
}

#[tokio::test]
async fn test_soundcloud_controls() {
    let page = FixturePage::load(&fixture("soundcloud.json")).unwrap();
    let mut session = session(&Config::default());
    session.poll(&page);

    session
        .handle_event(&page, &ControlEvent::SetState { state: StateMode::Paused })
        .await
        .unwrap();
    assert_eq!(page.element(".playControl").unwrap().clicks(), 1);

    // Already playing, nothing to click
    session
        .handle_event(&page, &ControlEvent::SetState { state: StateMode::Playing })
        .await
        .unwrap();
    assert_eq!(page.element(".playControl").unwrap().clicks(), 1);

    // Liked, a high rating request keeps it
    session
        .handle_event(&page, &ControlEvent::SetRating { rating: 4 })
        .await
        .unwrap();
    assert_eq!(page.element(".playbackSoundBadge__like").unwrap().clicks(), 0);

    session.handle_event(&page, &ControlEvent::SkipNext).await.unwrap();
    assert_eq!(page.element(".skipControl__next").unwrap().clicks(), 1);
}

#[tokio::test]
async fn test_disabled_site_has_no_session() {
    let page = FixturePage::load(&fixture("soundcloud.json")).unwrap();
    let mut config = Config::default();
    config.sites.disabled_sites.push("Soundcloud".to_string());
    let mut session = session(&config);

    assert_eq!(session.poll(&page), None);
    let result = session.handle_event(&page, &ControlEvent::SkipNext).await;
    assert!(matches!(result, Err(ControlError::NoActiveSite)));
}

#[tokio::test]
async fn test_youtube_over_bridge() {
    let page = FixturePage::load(&fixture("youtube.json")).unwrap();
    let runtime = Arc::new(FixtureRuntime::load(&fixture("youtube-runtime.json")).unwrap());

    let channel = PageChannel::new();
    PageHost::new(channel.clone(), runtime.clone()).spawn();
    let mut session = session(&Config::default()).with_bridge(BridgeClient::connect(channel));

    // Not ready until the first bridge answer lands
    assert_eq!(session.poll(&page), None);

    let mut info = None;
    for _ in 0..200 {
        tokio::task::yield_now().await;
        info = session.poll(&page);
        if info.is_some() {
            break;
        }
    }
    let info = info.expect("bridge data never arrived");

    assert_eq!(info.get(&Field::Player), Some(&FieldValue::from("YouTube")));
    assert_eq!(info.get(&Field::State), Some(&FieldValue::from(StateMode::Playing)));
    assert_eq!(info.get(&Field::Title), Some(&FieldValue::from("Never Gonna Give You Up")));
    assert_eq!(info.get(&Field::Artist), Some(&FieldValue::from("Rick Astley")));
    assert_eq!(
        info.get(&Field::Cover),
        Some(&FieldValue::from("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"))
    );
    assert_eq!(info.get(&Field::Duration), Some(&FieldValue::Integer(212)));
    assert_eq!(info.get(&Field::Position), Some(&FieldValue::Integer(42)));
    assert_eq!(info.get(&Field::Volume), Some(&FieldValue::Integer(80)));
    assert_eq!(info.get(&Field::Rating), Some(&FieldValue::Integer(5)));
    assert_eq!(info.get(&Field::Timestamp), Some(&FieldValue::Integer(NOW)));

    session
        .handle_event(&page, &ControlEvent::SetVolume { volume: 30 })
        .await
        .unwrap();
    let calls = runtime.invocations();
    let set_volume = calls
        .iter()
        .find(|call| call.method == "setVolume")
        .expect("setVolume never reached the page");
    assert_eq!(set_volume.target, "ytd-watch-flexy.player");
    assert_eq!(set_volume.args, vec![serde_json::json!(30)]);

    session
        .handle_event(&page, &ControlEvent::SetState { state: StateMode::Paused })
        .await
        .unwrap();
    let video = page.element(".html5-main-video").unwrap();
    assert!(video.media_state().unwrap().paused);

    let delta = session.poll(&page).unwrap();
    assert_eq!(delta.get(&Field::State), Some(&FieldValue::from(StateMode::Paused)));
}

#[test]
fn test_config_fixture_drives_generic_fallback() {
    let config = Config::try_load_from_path(&fixture("config.toml")).unwrap();
    assert_eq!(config.timing.poll_interval_ms, 100);

    let mut session = session(&config);
    let page = FixturePage::new("radio.example.org", "/");
    assert_eq!(
        session.current_site(&page).map(|site| site.name()),
        Some("Generic")
    );

    let blocked = FixturePage::new("player.ads.example", "/");
    assert!(session.current_site(&blocked).is_none());
}
