//! trackit-watch - follow relay rooms from the terminal
//!
//! Joins the given class and session rooms and prints the notifications a
//! dashboard session would surface, keeping them in a bounded notification
//! cache exactly as one user session would.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use trackit_common::config::{default_config_path, load_toml_config, TomlConfig};
use trackit_common::notifications::{Notification, NotificationCache};
use trackit_server::client::RelayClient;

#[derive(Parser, Debug)]
#[command(name = "trackit-watch")]
#[command(about = "Print relay notifications for class and session rooms")]
#[command(version)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:5730/ws", env = "TRACKIT_RELAY_URL")]
    url: String,

    /// Class rooms to join (repeatable)
    #[arg(short, long = "class")]
    classes: Vec<String>,

    /// Session rooms to join (repeatable)
    #[arg(short, long = "session")]
    sessions: Vec<String>,

    /// Configuration file supplying the `[notifications]` defaults
    #[arg(long, env = "TRACKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Notifications kept in the cache (default: `[notifications] capacity`)
    #[arg(long)]
    capacity: Option<usize>,

    /// Start with the dashboard's seed notifications
    #[arg(long)]
    seed: bool,
}

/// `--capacity` when given, else the configured cache size
fn cache_capacity(args: &Args, config: &TomlConfig) -> usize {
    args.capacity.unwrap_or(config.notifications.capacity)
}

fn print_notification(notification: &Notification, unread: usize) {
    println!(
        "[{}] {:?} {}: {} ({} unread)",
        notification.timestamp.format("%H:%M:%S"),
        notification.kind,
        notification.title,
        notification.message,
        unread
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = load_toml_config(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if !config_path.exists() {
        warn!("No configuration file at {}, using defaults", config_path.display());
    }

    let capacity = cache_capacity(&args, &config);
    let mut cache = if args.seed {
        NotificationCache::seeded(capacity, chrono::Utc::now())
    } else {
        NotificationCache::new(capacity)
    };
    debug!(capacity, "Notification cache ready");

    let mut client = RelayClient::connect(&args.url)
        .await
        .with_context(|| format!("Failed to connect to {}", args.url))?;

    for class_id in &args.classes {
        client.join_class(class_id).await?;
        info!("Joined class-{}", class_id);
    }
    for session_id in &args.sessions {
        client.join_session(session_id).await?;
        info!("Joined session-{}", session_id);
    }

    while let Some(frame) = client.next_frame().await? {
        debug!(event = %frame.event, "Frame received");
        match Notification::from_event(&frame.event, &frame.data) {
            Some(notification) => {
                let shown = notification.clone();
                if let Some(evicted) = cache.push(notification) {
                    debug!(id = %evicted.id, "Evicted oldest notification");
                }
                print_notification(&shown, cache.unread_count());
            }
            None => info!(event = %frame.event, data = %frame.data, "Relay event"),
        }
    }

    info!("Relay closed the connection ({} notifications cached)", cache.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_comes_from_config_unless_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notifications]\ncapacity = 7\n").unwrap();
        let config_arg = path.to_str().unwrap();

        let args = Args::try_parse_from(["trackit-watch", "--config", config_arg]).unwrap();
        let config = load_toml_config(&path).unwrap();
        assert_eq!(args.capacity, None);
        assert_eq!(cache_capacity(&args, &config), 7);

        let args =
            Args::try_parse_from(["trackit-watch", "--config", config_arg, "--capacity", "3"])
                .unwrap();
        assert_eq!(cache_capacity(&args, &config), 3);
    }

    #[test]
    fn test_rooms_are_repeatable() {
        let args =
            Args::try_parse_from(["trackit-watch", "--class", "7", "--class", "8", "-s", "9"])
                .unwrap();
        assert_eq!(args.classes, vec!["7", "8"]);
        assert_eq!(args.sessions, vec!["9"]);
    }
}
