//! GeoTrack Live
//!
//! Terminal dashboard: attaches one live page to the tracking server and
//! redraws it on every change until Ctrl-C.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use geotrack::config::Config;
use geotrack::render::{
    chip_label, clock_label, locations_table, monitor_table, pointers_table, NO_ACTIVE_DEVICES,
};
use geotrack::store::{MonitorBoard, PointerStore, TimelineFeed, ViewState};
use geotrack::transport::{ConnectionStatus, SocketService};
use geotrack::views::{MultiPointerView, RealtimeMonitorView, TimelineLiveView};
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "geotrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live device tracking in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Page,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// WebSocket server URL (overrides config)
    #[arg(long, global = true)]
    ws_url: Option<String>,
}

#[derive(Subcommand)]
enum Page {
    /// All tracked devices
    Pointers,
    /// Active timelines with live positions
    Monitor,
    /// One timeline, live
    Timeline {
        /// Timeline ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.ws_url {
        config.server.websocket_url = url;
    }

    geotrack::logging::init(&config.logging).context("Failed to initialize logging")?;
    tracing::info!("GeoTrack Live v{}", env!("CARGO_PKG_VERSION"));

    let socket = SocketService::new(&config.server.websocket_url, config.transport.clone());

    match cli.command {
        Page::Pointers => {
            let view = MultiPointerView::mount(&socket);
            run(view.changes(), || draw_pointers(&view.snapshot(), view.status())).await;
        }
        Page::Monitor => {
            let view = RealtimeMonitorView::mount(&socket);
            run(view.changes(), || draw_monitor(&view.snapshot(), view.status())).await;
        }
        Page::Timeline { id } => {
            let view = TimelineLiveView::mount(&socket, id);
            run(view.changes(), || draw_timeline(&view.snapshot(), view.status())).await;
        }
    }

    // The view is gone and its unsubscribe is queued; let it reach the server
    socket.close().await;
    tracing::info!("Detached");
    Ok(())
}

/// Redraw on every change until Ctrl-C
async fn run(mut changes: watch::Receiver<u64>, draw: impl Fn() -> String) {
    print_screen(&draw());
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                print_screen(&draw());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}

fn print_screen(body: &str) {
    print!("\x1b[2J\x1b[H{}", body);
}

fn status_line(status: ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Disconnected => format!("[{}] reconnecting automatically", status),
        _ => format!("[{}]", status),
    }
}

fn draw_pointers(store: &PointerStore, status: ConnectionStatus) -> String {
    let mut out = format!("Multi-Pointer Tracking  {}\n", status_line(status));
    if let Some(at) = store.last_update() {
        out.push_str(&format!("Last update: {}\n", clock_label(&at)));
    }
    out.push('\n');
    out.push_str(&format!("Active Devices - {}\n", store.count_label()));

    if store.is_empty() {
        out.push_str(NO_ACTIVE_DEVICES);
        out.push('\n');
    } else {
        let chips: Vec<String> = store.pointers().iter().map(chip_label).collect();
        out.push_str(&chips.join("  "));
        out.push_str("\n\n");
        out.push_str(&pointers_table(store.pointers()).render());
    }
    out
}

fn draw_monitor(board: &MonitorBoard, status: ConnectionStatus) -> String {
    let mut out = format!("Realtime Monitor  {}\n\n", status_line(status));
    match board.state() {
        ViewState::Loading => out.push_str("Loading...\n"),
        ViewState::Failed(message) => out.push_str(&format!("Error: {}\n", message)),
        ViewState::Loaded(_) => match board.notice() {
            Some(notice) => {
                out.push_str(notice);
                out.push('\n');
            }
            None => out.push_str(&monitor_table(board.timelines()).render()),
        },
    }
    out
}

fn draw_timeline(feed: &TimelineFeed, status: ConnectionStatus) -> String {
    let mut out = format!(
        "Timeline {}  {}\n\n",
        feed.timeline_id(),
        status_line(status)
    );
    match feed.state() {
        ViewState::Loading => out.push_str("Loading...\n"),
        ViewState::Failed(message) => out.push_str(&format!("Error: {}\n", message)),
        ViewState::Loaded(detail) => {
            out.push_str(&format!("{}\n\n", detail.device.name));
            out.push_str(&locations_table(&detail.locations).render());
        }
    }
    out
}
