//! # Delta Replay Tool
//!
//! Replays recorded delta batches through a fresh reconciler, for
//! debugging merge behavior offline.
//!
//! ## Usage
//! ```bash
//! # Replay a JSON array of InventoryDelta batches
//! cargo run -p pogo-sync --bin replay -- ./fixtures/session.json
//!
//! # Use an explicit config file
//! cargo run -p pogo-sync --bin replay -- ./fixtures/session.json --config ./mirror.toml
//!
//! # Per-record logging
//! RUST_LOG=pogo=trace cargo run -p pogo-sync --bin replay -- ./fixtures/session.json
//! ```

use std::env;
use std::path::PathBuf;

use pogo_core::{RecordKind, Snapshot};
use pogo_sync::{InventoryChange, InventoryDelta, InventoryReconciler, MirrorConfig};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pogo=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("Pogo Mirror Delta Replay");
    println!();
    println!("Usage: replay <BATCHES.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file path (default: platform config dir)");
    println!("  -h, --help           Show this help message");
}

/// Parsed command line.
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Replay {
        input: PathBuf,
        config_path: Option<PathBuf>,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a path", args[i]))?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => input = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    let input = input.ok_or_else(|| "missing batches file".to_string())?;
    Ok(Command::Replay { input, config_path })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let (input, config_path) = match parse_args(&args) {
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Command::Replay { input, config_path }) => (input, config_path),
        Err(message) => {
            print_help();
            return Err(message.into());
        }
    };

    init_tracing();
    let config = MirrorConfig::load_or_default(config_path);
    info!(account = config.account(), input = ?input, "Starting replay");

    let contents = std::fs::read_to_string(&input)?;
    let batches = InventoryDelta::batches_from_json(&contents)?;

    let reconciler = InventoryReconciler::builder().with_config(&config).build();
    let (_subscription, mut changes) = reconciler.change_channel_default();
    let mut level_ups = 0;

    for (index, batch) in batches.iter().enumerate() {
        let summary = reconciler.apply_delta(batch);
        level_ups += drain_level_ups(&mut changes);
        println!(
            "batch {:>4}: {:>4} records  +{} ~{} skipped {} conflicts {}",
            index + 1,
            batch.len(),
            summary.inserted,
            summary.updated,
            summary.skipped,
            summary.duplicate_conflicts
        );
    }

    let stats = reconciler.stats();
    println!();
    println!("Replayed {} batches", stats.batches);
    println!(
        "  inserted {}, updated {}, skipped {}, conflicts {}",
        stats.inserted, stats.updated, stats.skipped, stats.duplicate_conflicts
    );
    println!("  level ups: {}", level_ups);
    if let Some(stamp) = reconciler.last_batch() {
        println!("  last batch timestamp: {} ms", stamp.timestamp_ms());
    }
    println!(
        "  stale after {}s: {}",
        config.session.max_staleness_secs,
        reconciler.is_stale_default()
    );

    print_snapshot(&reconciler.snapshot());
    Ok(())
}

/// Counts level increases among the buffered changes.
fn drain_level_ups(changes: &mut broadcast::Receiver<InventoryChange>) -> usize {
    let mut level_ups = 0;
    loop {
        match changes.try_recv() {
            Ok(change) => {
                let previous = change.previous.as_ref().and_then(|p| p.as_player_stats().ok());
                let current = change.delta.as_player_stats().ok();
                if let (Some(previous), Some(current)) = (previous, current) {
                    if current.level > previous.level {
                        level_ups += 1;
                    }
                }
            }
            Err(TryRecvError::Lagged(missed)) => {
                warn!(missed, "Change channel lagged, raise inventory.change_channel_capacity");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return level_ups,
        }
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!();
    println!("Snapshot: {} records", snapshot.len());
    for kind in RecordKind::ALL {
        let count = snapshot.count_of(kind);
        if count > 0 {
            println!("  {:<16} {}", kind.as_str(), count);
        }
    }
    if let Some(stats) = snapshot.player_stats() {
        println!("  level {} ({} xp to next)", stats.level, stats.xp_to_next_level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("replay")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_input_and_config() {
        assert_eq!(
            parse_args(&args(&["session.json", "--config", "mirror.toml"])),
            Ok(Command::Replay {
                input: PathBuf::from("session.json"),
                config_path: Some(PathBuf::from("mirror.toml")),
            })
        );
        assert_eq!(parse_args(&args(&["-h"])), Ok(Command::Help));
    }

    #[test]
    fn test_config_flag_without_path_is_rejected() {
        assert_eq!(
            parse_args(&args(&["session.json", "--config"])),
            Err("--config requires a path".to_string())
        );
        assert_eq!(
            parse_args(&args(&["-c"])),
            Err("-c requires a path".to_string())
        );
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert_eq!(parse_args(&args(&[])), Err("missing batches file".to_string()));
    }
}
