//! Page-side handlers for the six bridge events.
//!
//! Each handler is stateless and reads page-internal objects fresh on every
//! call. Results are plain JSON so they can travel over the page channel;
//! the typed structs here are shared with the client for decoding.

use super::host::{ObjectRef, PageRuntime};
use super::BridgeEvent;
use crate::util::{find_key, is_truthy};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// YouTube player containers, most specific first
const YOUTUBE_CONTAINERS: [&str; 4] = [
    "ytd-video-preview",
    "ytd-shorts",
    "ytd-miniplayer",
    "ytd-watch-flexy",
];

const YOUTUBE_MUSIC_PLAYER_BAR: &str = "ytmusic-player-bar";

/// Netflix's player API object, relative to `window.netflix`
const NETFLIX_VIDEO_PLAYER: &str = "appContext.state.playerApp.api.videoPlayer";

/// Netflix's per-title metadata map, relative to `window.netflix`
const NETFLIX_VIDEO_METADATA: &str = "appContext.playerApp.state.videoPlayer.videoMetadata";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeInfo {
    #[serde(default)]
    pub video_details: Value,
    #[serde(default)]
    pub playlist_details: Value,
    #[serde(default)]
    pub container_local_name: Option<String>,
}

impl YouTubeInfo {
    fn detail_str(&self, key: &str) -> Option<&str> {
        find_key(&self.video_details, key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.detail_str("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.detail_str("author")
    }

    pub fn video_id(&self) -> Option<&str> {
        self.detail_str("videoId")
    }

    /// `lengthSeconds` comes as a string in the player response
    pub fn length_seconds(&self) -> Option<f64> {
        match find_key(&self.video_details, "lengthSeconds")? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        find_key(&self.video_details, "isLiveContent")
            .map(is_truthy)
            .unwrap_or(false)
    }

    /// Widest thumbnail URL
    pub fn thumbnail(&self) -> Option<String> {
        find_key(&self.video_details, "thumbnail.thumbnails")?
            .as_array()?
            .iter()
            .max_by_key(|t| t.get("width").and_then(Value::as_u64).unwrap_or(0))
            .and_then(|t| t.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Playlist loop state, e.g. `PLAYLIST_LOOP_STATE_ALL`
    pub fn loop_state(&self) -> Option<&str> {
        find_key(&self.playlist_details, "loopState").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonData {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episode: Option<Value>,
    #[serde(default)]
    pub season: Option<Value>,
    #[serde(default)]
    pub seasons: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetflixInfo {
    #[serde(default)]
    pub season_data: SeasonData,
    #[serde(default)]
    pub nav_data: NavData,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub is_player_ready: bool,
}

impl NetflixInfo {
    /// Show or movie title
    pub fn show_title(&self) -> Option<&str> {
        self.season_data.title.as_deref()
    }

    pub fn episode_title(&self) -> Option<&str> {
        self.season_data.episode.as_ref()?.get("title")?.as_str()
    }

    /// `S2:E5` style label for episodes
    pub fn episode_label(&self) -> Option<String> {
        let season = self.season_data.season.as_ref()?.get("seq")?.as_u64()?;
        let episode = self.season_data.episode.as_ref()?.get("seq")?.as_u64()?;
        Some(format!("S{}:E{}", season, episode))
    }

    /// Largest artwork URL in the title metadata
    pub fn artwork(&self) -> Option<String> {
        find_key(&self.metadata, "_metadata.video.artwork")?
            .as_array()?
            .iter()
            .max_by_key(|a| a.get("w").and_then(Value::as_u64).unwrap_or(0))
            .and_then(|a| a.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Route a request to its handler. Unknown events get `null`.
pub fn dispatch(runtime: &dyn PageRuntime, event: &str, data: Option<&Value>) -> Value {
    let Some(event) = BridgeEvent::from_name(event) else {
        debug!("Unknown bridge event '{}'", event);
        return Value::Null;
    };

    match event {
        BridgeEvent::GetYouTubeInfo => to_json(&youtube_info(runtime)),
        BridgeEvent::SetYouTubeVolume => {
            set_youtube_volume(runtime, data);
            Value::Null
        }
        BridgeEvent::GetYouTubeMusicVolume => youtube_music_volume(runtime).unwrap_or(Value::Null),
        BridgeEvent::SetYouTubeMusicVolume => {
            set_youtube_music_volume(runtime, data);
            Value::Null
        }
        BridgeEvent::SeekNetflix => {
            seek_netflix(runtime, data);
            Value::Null
        }
        BridgeEvent::GetNetflixInfo => to_json(&netflix_info(runtime)),
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// The YouTube container that is currently active, with its state
pub fn youtube_container(runtime: &dyn PageRuntime) -> Option<(&'static str, Value)> {
    YOUTUBE_CONTAINERS.into_iter().find_map(|selector| {
        let state = runtime.element_state(selector)?;
        let active = find_key(&state, "active").map(is_truthy).unwrap_or(false);
        active.then_some((selector, state))
    })
}

pub fn youtube_info(runtime: &dyn PageRuntime) -> YouTubeInfo {
    let Some((selector, state)) = youtube_container(runtime) else {
        return YouTubeInfo {
            video_details: json!({}),
            ..Default::default()
        };
    };

    let details = match selector {
        "ytd-video-preview" => find_key(&state, "videoPreviewFetchRequest.result_.videoDetails").cloned(),
        "ytd-miniplayer" => find_key(&state, "watchResponse.playerResponse.videoDetails").cloned(),
        "ytd-shorts" | "ytd-watch-flexy" => find_key(&state, "playerData.videoDetails").cloned(),
        _ => runtime
            .element_state("ytd-app")
            .and_then(|app| find_key(&app, "data.playerResponse.videoDetails").cloned()),
    };

    let playlist = runtime
        .element_state(&format!("{} #playlist", selector))
        .and_then(|p| find_key(&p, "data").cloned())
        .unwrap_or(Value::Null);

    YouTubeInfo {
        video_details: details.unwrap_or_else(|| json!({})),
        playlist_details: playlist,
        container_local_name: Some(selector.to_string()),
    }
}

fn set_youtube_volume(runtime: &dyn PageRuntime, data: Option<&Value>) {
    let Some((selector, _)) = youtube_container(runtime) else {
        return;
    };
    let volume = data.cloned().unwrap_or(Value::Null);
    runtime.invoke(&ObjectRef::element(selector, "player"), "setVolume", &[volume]);
}

fn youtube_music_volume(runtime: &dyn PageRuntime) -> Option<Value> {
    runtime.invoke(
        &ObjectRef::element(YOUTUBE_MUSIC_PLAYER_BAR, "playerApi_"),
        "getVolume",
        &[],
    )
}

fn set_youtube_music_volume(runtime: &dyn PageRuntime, data: Option<&Value>) {
    let volume = data.cloned().unwrap_or(Value::Null);
    runtime.invoke(
        &ObjectRef::element(YOUTUBE_MUSIC_PLAYER_BAR, "playerApi_"),
        "setVolume",
        &[volume],
    );
}

/// Session id of the main watch player (`watch-...`)
fn netflix_session_id(runtime: &dyn PageRuntime) -> Option<String> {
    let ids = runtime.invoke(
        &ObjectRef::global("netflix", NETFLIX_VIDEO_PLAYER),
        "getAllPlayerSessionIds",
        &[],
    )?;
    ids.as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find(|id| id.starts_with("watch-"))
        .map(str::to_string)
}

/// Players are exposed per session id under the video player API
fn netflix_player(session_id: &str) -> ObjectRef {
    ObjectRef::global(
        "netflix",
        &format!("{}.sessions.{}", NETFLIX_VIDEO_PLAYER, session_id),
    )
}

fn seek_netflix(runtime: &dyn PageRuntime, data: Option<&Value>) {
    let Some(seconds) = data.and_then(Value::as_f64) else {
        return;
    };
    let Some(session_id) = netflix_session_id(runtime) else {
        return;
    };
    runtime.invoke(&netflix_player(&session_id), "seek", &[json!(seconds * 1000.0)]);
}

fn netflix_metadata(runtime: &dyn PageRuntime) -> Option<Value> {
    let netflix = runtime.global("netflix")?;
    find_key(&netflix, NETFLIX_VIDEO_METADATA)?
        .as_object()?
        .values()
        .find(|entry| entry.get("_video").is_some())
        .cloned()
}

fn id_of(value: &Value) -> Option<&Value> {
    value.get("id").filter(|id| !id.is_null())
}

fn episodes_of(season: &Value) -> &[Value] {
    season
        .get("episodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Locate the current episode and its season in title metadata
pub fn season_data(metadata: &Value) -> SeasonData {
    let video = find_key(metadata, "_metadata.video");
    let kind = video
        .and_then(|v| v.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let title = video
        .and_then(|v| v.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let seasons = video
        .and_then(|v| v.get("seasons"))
        .and_then(Value::as_array)
        .cloned();
    let Some(seasons) = seasons else {
        return SeasonData {
            kind,
            title,
            ..Default::default()
        };
    };

    let current = video.and_then(|v| v.get("currentEpisode"));
    let episode_in = |season: &Value| -> Option<Value> {
        let current = current?;
        episodes_of(season)
            .iter()
            .find(|episode| id_of(episode) == Some(current))
            .cloned()
    };

    let season = seasons.iter().find(|s| episode_in(s).is_some()).cloned();
    let episode = season.as_ref().and_then(episode_in);

    SeasonData {
        kind,
        title,
        episode,
        season,
        seasons,
    }
}

/// Previous, current and next episode ids, crossing season boundaries.
/// Seasons are addressed by their 1-based `seq`.
pub fn nav_data(data: &SeasonData) -> NavData {
    let (Some(season), Some(episode)) = (&data.season, &data.episode) else {
        return NavData::default();
    };

    let episodes = episodes_of(season);
    let seq = season.get("seq").and_then(Value::as_u64).unwrap_or(1) as usize;
    let Some(index) = episodes.iter().position(|e| id_of(e) == id_of(episode)) else {
        return NavData::default();
    };

    let curr_id = id_of(&episodes[index]).cloned();

    let prev_id = if index > 0 {
        id_of(&episodes[index - 1]).cloned()
    } else if seq > 1 {
        data.seasons
            .get(seq - 2)
            .and_then(|s| episodes_of(s).last())
            .and_then(id_of)
            .cloned()
    } else {
        None
    };

    let next_id = if index + 1 == episodes.len() && seq < data.seasons.len() {
        data.seasons
            .get(seq)
            .and_then(|s| episodes_of(s).first())
            .and_then(id_of)
            .cloned()
    } else {
        episodes.get(index + 1).and_then(id_of).cloned()
    };

    NavData {
        prev_id,
        curr_id,
        next_id,
    }
}

pub fn netflix_info(runtime: &dyn PageRuntime) -> NetflixInfo {
    let metadata = netflix_metadata(runtime).unwrap_or(Value::Null);
    let season_data = season_data(&metadata);
    let nav_data = nav_data(&season_data);
    let is_player_ready = netflix_session_id(runtime)
        .and_then(|id| runtime.invoke(&netflix_player(&id), "isReady", &[]))
        .map(|ready| is_truthy(&ready))
        .unwrap_or(false);

    NetflixInfo {
        season_data,
        nav_data,
        metadata,
        is_player_ready,
    }
}
