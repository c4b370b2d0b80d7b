use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use pt_core::{Result, SnapshotStore, SystemClock};
use pt_scrapers::{HttpFetcher, PatchTracker, RunOutcome, TrackerConfig, WriteOutcome};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number means seconds.
        if !current_number.is_empty() {
            if let Ok(num) = current_number.parse::<u64>() {
                total_seconds += num;
                has_unit = true;
            } else {
                return Err("Invalid number in duration".to_string());
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Tracks the published patch bulletin version", long_about = None)]
struct Cli {
    /// Snapshot backend: file or memory
    #[arg(long, default_value = "file")]
    storage: String,
    /// Where the file backend keeps the snapshot
    #[arg(long, default_value = "patch_version.json")]
    snapshot_path: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the tracker once
    Run,
    /// Print the persisted snapshot
    Show,
    /// Run the tracker periodically (e.g. 1h, 30m, 1h15m30s)
    Watch {
        #[arg(long, default_value = "1h")]
        interval: HumanDuration,
    },
}

fn report(outcome: &RunOutcome) {
    let descriptor = &outcome.descriptor;
    info!(
        "🏷️ {} — {} ({} amendment(s))",
        descriptor.patch_version,
        descriptor.title,
        descriptor.mid_patch_update_dates.len()
    );
    info!("🔗 {}", descriptor.url);
    match &outcome.write {
        WriteOutcome::Written => info!("💾 snapshot written"),
        WriteOutcome::Unchanged => info!("⏭️ nothing changed, write skipped"),
        WriteOutcome::WriteFailed(reason) => error!("⚠️ snapshot write failed: {reason}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let storage = pt_storage::create_storage(&cli.storage, &cli.snapshot_path)?;
    info!("💾 snapshot storage ready (using {})", cli.storage);

    let tracker = PatchTracker::new(
        Arc::new(HttpFetcher::new()),
        storage.clone(),
        Arc::new(SystemClock),
        TrackerConfig::default(),
    );

    match cli.command {
        Commands::Run => {
            let outcome = tracker.run_once().await?;
            report(&outcome);
        }
        Commands::Show => match storage.read().await? {
            Some(descriptor) => println!("{}", serde_json::to_string_pretty(&descriptor)?),
            None => println!("No snapshot persisted yet."),
        },
        Commands::Watch { interval } => {
            info!("🔁 watching every {}s", interval.0.as_secs());
            loop {
                match tracker.run_once().await {
                    Ok(outcome) => report(&outcome),
                    Err(e) => error!("tracking run failed: {e}"),
                }
                tokio::time::sleep(interval.0).await;
            }
        }
    }

    Ok(())
}
