//! GeoTrack CLI
//!
//! One-shot commands against the tracking server:
//! - Browse recorded timelines
//! - Manage pointers
//! - Generate a config file

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use geotrack::api::TimelineClient;
use geotrack::config::{Config, ServerConfig, TransportConfig};
use geotrack::model::LatLng;
use geotrack::render::{format_address, locations_table, timelines_table, MapOverlay};
use geotrack::store::ViewState;
use geotrack::transport::{ConnectionStatus, SocketService};
use geotrack::views::{load_history, HistoryDetail};

#[derive(Parser)]
#[command(name = "geotrack-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Device tracking history and pointer management")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// REST API URL
    #[arg(long, default_value = "http://localhost:3000", global = true)]
    pub api_url: String,

    /// WebSocket server URL
    #[arg(long, default_value = "http://localhost:3001", global = true)]
    pub ws_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recorded timelines
    History,

    /// Show the recorded locations of a timeline
    Detail {
        /// Timeline ID
        timeline_id: String,
        /// Show the map view (markers and path) instead of the table
        #[arg(long)]
        map: bool,
    },

    /// Add a pointer
    AddPointer {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Remove a pointer
    RemovePointer {
        /// Pointer ID
        id: String,
    },

    /// Move a pointer
    MovePointer {
        /// Pointer ID
        id: String,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    geotrack::logging::init(&config.logging)?;

    let server = ServerConfig {
        api_url: cli.api_url.clone(),
        websocket_url: cli.ws_url.clone(),
        ..config.server.clone()
    };
    let json = cli.format == "json";

    match cli.command {
        Commands::History => {
            let client = TimelineClient::new(&server)?;
            match load_history(&client).await {
                ViewState::Loaded(timelines) if json => {
                    println!("{}", serde_json::to_string_pretty(&timelines)?);
                }
                ViewState::Loaded(timelines) if timelines.is_empty() => {
                    println!("No timelines recorded yet.");
                }
                ViewState::Loaded(timelines) => {
                    print!("{}", timelines_table(&timelines));
                }
                ViewState::Failed(message) => fail(&message, &server.api_url),
                ViewState::Loading => {}
            }
        }

        Commands::Detail { timeline_id, map } => {
            let client = TimelineClient::new(&server)?;
            let detail = HistoryDetail::load(&client, &timeline_id).await;

            match &detail.state {
                ViewState::Failed(message) => fail(message, &server.api_url),
                ViewState::Loaded(locations) if json && !map => {
                    println!("{}", serde_json::to_string_pretty(locations)?);
                }
                ViewState::Loaded(_) if map => {
                    let overlay = detail.overlay();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&overlay)?);
                    } else {
                        print_overlay(&overlay);
                    }
                }
                ViewState::Loaded(locations) => {
                    println!("Timeline {} - {} locations", timeline_id, locations.len());
                    println!();
                    print!("{}", locations_table(locations));
                    if let Some(last) = locations.last() {
                        println!();
                        println!(
                            "Last address: {}",
                            format_address(last.reverse_data.as_deref())
                        );
                    }
                }
                ViewState::Loading => {}
            }
        }

        Commands::AddPointer {
            latitude,
            longitude,
        } => {
            let socket = open_socket(&server, &config.transport).await?;
            let sent = socket.add_pointer(LatLng::new(latitude, longitude));
            finish(&socket, sent, &format!("Added pointer at {:.6}, {:.6}", latitude, longitude))
                .await?;
        }

        Commands::RemovePointer { id } => {
            let socket = open_socket(&server, &config.transport).await?;
            let sent = socket.remove_pointer(&id);
            finish(&socket, sent, &format!("Removed pointer {}", id)).await?;
        }

        Commands::MovePointer {
            id,
            latitude,
            longitude,
        } => {
            let socket = open_socket(&server, &config.transport).await?;
            let sent = socket.move_pointer(&id, LatLng::new(latitude, longitude));
            finish(
                &socket,
                sent,
                &format!("Moved pointer {} to {:.6}, {:.6}", id, latitude, longitude),
            )
            .await?;
        }

        Commands::Config { output } => {
            let config = geotrack::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn fail(message: &str, api_url: &str) -> ! {
    eprintln!("{}", message);
    eprintln!("API: {}", api_url);
    std::process::exit(1);
}

/// Connect and wait for the socket to open
async fn open_socket(server: &ServerConfig, transport: &TransportConfig) -> anyhow::Result<SocketService> {
    let socket = SocketService::new(&server.websocket_url, transport.clone());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _status = socket.on_status(move |status| {
        let _ = tx.send(status);
    });
    socket.connect();

    let deadline = transport.connect_timeout();
    let opened = tokio::time::timeout(deadline, async {
        while let Some(status) = rx.recv().await {
            match status {
                ConnectionStatus::Connected => return true,
                ConnectionStatus::Disconnected => return false,
                _ => {}
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    if !opened {
        socket.disconnect();
        bail!("Cannot connect to WebSocket server at {}", socket.url());
    }
    Ok(socket)
}

/// Close deliberately once the queued command has been written
async fn finish(socket: &SocketService, sent: bool, done: &str) -> anyhow::Result<()> {
    socket.close().await;
    if !sent {
        bail!("Connection lost before the command was sent");
    }
    println!("{}", done);
    Ok(())
}

fn print_overlay(overlay: &MapOverlay) {
    println!(
        "Center: {:.6}, {:.6}",
        overlay.center.latitude, overlay.center.longitude
    );
    if let Some((sw, ne)) = overlay.bounds() {
        println!(
            "Bounds: {:.6}, {:.6} .. {:.6}, {:.6}",
            sw.latitude, sw.longitude, ne.latitude, ne.longitude
        );
    }
    println!();
    println!("{:<8} {:<24} {}", "Marker", "Position", "Popup");
    println!("{}", "-".repeat(70));
    for marker in &overlay.markers {
        println!(
            "{:<8} {:<24} {} / {}",
            marker.key,
            format!("{:.6}, {:.6}", marker.position.latitude, marker.position.longitude),
            marker.title,
            marker.lines.join(" / ")
        );
    }
    match &overlay.path {
        Some(path) => println!("\nPath: {} points", path.len()),
        None => println!("\nPath: none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_negative_coordinates() {
        let cli = Cli::try_parse_from(["geotrack-cli", "add-pointer", "-6.2088", "106.8456"]).unwrap();
        match cli.command {
            Commands::AddPointer {
                latitude,
                longitude,
            } => {
                assert_eq!(latitude, -6.2088);
                assert_eq!(longitude, 106.8456);
            }
            _ => panic!("Expected add-pointer"),
        }
    }

    #[test]
    fn test_detail_flags() {
        let cli = Cli::try_parse_from(["geotrack-cli", "--format", "json", "detail", "t1", "--map"]).unwrap();
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::Detail { map: true, .. }));
    }
}
