//! Media Replay - run the extractor against a recorded page
//!
//! Loads a page fixture (and optionally the page-world state the bridge
//! reads), polls it like the content script would and prints each emission
//! as one JSON object per line.
//!
//! # Usage
//!
//! ```bash
//! # Poll a recorded SoundCloud page once
//! media-replay --page soundcloud.json
//!
//! # YouTube needs the page-world state behind the bridge
//! media-replay --page youtube.json --runtime youtube-runtime.json --polls 3
//!
//! # Send a control event after the first poll
//! media-replay --page soundcloud.json --polls 2 --event '{"event":"setState","state":"PAUSED"}'
//! ```

use media_extractor::bridge::FixtureRuntime;
use media_extractor::{
    BridgeClient, Config, ControlEvent, FixturePage, PageChannel, PageHost, Session, SiteRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Clone, Default)]
struct ReplayArgs {
    /// Page fixture
    page_path: Option<PathBuf>,
    /// Page-world state answering bridge requests
    runtime_path: Option<PathBuf>,
    /// Path to config file
    config_path: Option<PathBuf>,
    /// Number of polls before exiting
    polls: Option<u32>,
    /// Raw control events, sent after the first poll
    events: Vec<String>,
}

/// Parse command line arguments
fn parse_args() -> ReplayArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut replay = ReplayArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-v" => {
                println!("media-replay {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--page" | "-p" => {
                i += 1;
                if i < args.len() {
                    replay.page_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--runtime" | "-r" => {
                i += 1;
                if i < args.len() {
                    replay.runtime_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    replay.config_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--polls" => {
                i += 1;
                if i < args.len() {
                    if let Ok(polls) = args[i].parse() {
                        replay.polls = Some(polls);
                    }
                }
            }
            "--event" | "-e" => {
                i += 1;
                if i < args.len() {
                    replay.events.push(args[i].clone());
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Use --help for usage information.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    replay
}

fn print_help() {
    println!(
        r#"Media Replay - now-playing extraction against a recorded page

USAGE:
    media-replay --page <PATH> [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version
    -p, --page <PATH>       Page fixture (JSON)
    -r, --runtime <PATH>    Page-world state for bridge requests (JSON)
    -c, --config <PATH>     Path to configuration file
    --polls <N>             Number of polls before exiting (default: 1)
    -e, --event <JSON>      Control event to send after the first poll, repeatable

OUTPUT:
    One JSON object per emission on stdout. Logs go to stderr and follow
    RUST_LOG, or the configured log level when it is unset."#
    );
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();

    let config = match &args.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    init_logging(&config);

    if !config.general.enabled {
        info!("Extraction is disabled in configuration, exiting");
        return Ok(());
    }

    let Some(page_path) = &args.page_path else {
        eprintln!("Missing --page. Use --help for usage information.");
        std::process::exit(1);
    };
    let page = FixturePage::load(page_path)?;
    info!("Replaying {:?}", page_path);

    let events = args
        .events
        .iter()
        .map(|raw| serde_json::from_str::<ControlEvent>(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let registry = SiteRegistry::with_bridge_refresh(config.timing.bridge_refresh());
    let mut session = Session::new(config.sites.clone(), registry);

    if let Some(runtime_path) = &args.runtime_path {
        let runtime = FixtureRuntime::load(runtime_path)?;
        let channel = PageChannel::new();
        PageHost::new(channel.clone(), Arc::new(runtime)).spawn();
        session = session.with_bridge(BridgeClient::connect(channel));
        info!("Bridge connected to {:?}", runtime_path);
    }

    let polls = args.polls.unwrap_or(1).max(1);
    let mut ticker = tokio::time::interval(config.timing.poll_interval());

    for n in 0..polls {
        ticker.tick().await;

        if let Some(info) = session.poll(&page) {
            println!("{}", serde_json::to_string(&info)?);
        }

        if n == 0 {
            for event in &events {
                if let Err(e) = session.handle_event(&page, event).await {
                    warn!("{} failed: {}", event.name(), e);
                }
            }
        }
    }

    Ok(())
}
