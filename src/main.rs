//! Lifeline - personal safety companion core
//!
//! Hosts the SOS alert sequencer and deterrent siren engine behind a small
//! line-oriented console, with outbound channel intents logged rather than
//! handed to a real OS shell.
//!
//! Module structure:
//! - `domain/` - Core types and alert message composition
//! - `io/` - Device interfaces (location, channels, audio, haptics, probing)
//! - `services/` - State machines (AlertSequencer, SirenEngine)
//! - `infra/` - Infrastructure (Config, settings and contact stores)

use clap::Parser;
use lifeline::infra::{Config, FileContactStore, FileSettingsStore};
use lifeline::io::{
    create_notice_channel, CpalBackend, FixedLocation, HostProbe, IntentLogDispatcher,
    LocationProvider, NoLocation, NoticeSeverity, NullHaptics, PlatformProbe,
};
use lifeline::services::{AlertSequencer, SequencerState, SirenEngine};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Lifeline - SOS dispatch and deterrent alarm core
#[derive(Parser, Debug)]
#[command(name = "lifeline", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for full event visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = env!("GIT_HASH"), "lifeline starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        settings_file = %config.settings_file(),
        contacts_file = %config.contacts_file(),
        fixed_location = ?config.fixed_location(),
        "config_loaded"
    );

    let probe: Arc<dyn PlatformProbe> = Arc::new(HostProbe);
    let settings = Arc::new(FileSettingsStore::new(config.settings_file()));
    let contacts = Arc::new(FileContactStore::new(config.contacts_file()));
    let dispatcher = Arc::new(IntentLogDispatcher::new(probe.os_family()));
    let location: Arc<dyn LocationProvider> = match config.fixed_location() {
        Some((lat, lng)) => Arc::new(FixedLocation::new(lat, lng)),
        None => Arc::new(NoLocation),
    };

    let (notices, mut notice_rx) = create_notice_channel();

    let sequencer = AlertSequencer::new(
        settings.clone(),
        contacts,
        location,
        dispatcher,
        probe.clone(),
        notices.clone(),
    );
    let siren = SirenEngine::new(
        settings,
        Arc::new(CpalBackend),
        Arc::new(NullHaptics),
        probe,
        notices,
    );

    // Surface notices on the console as they arrive.
    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            let tag = match notice.severity {
                NoticeSeverity::Info => "info",
                NoticeSeverity::Warning => "warn",
            };
            println!("[{}] {}: {}", tag, notice.title, notice.detail);
        }
    });

    println!("commands: sos | cancel | call | dial | alarm on | alarm off | volume <0..1>");
    println!("          sms | email | copy | status | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "sos" => sequencer.trigger(),
            "cancel" => sequencer.cancel(),
            "call" => sequencer.confirm_call().await,
            "dial" => sequencer.quick_call().await,
            "alarm on" => siren.start(),
            "alarm off" => siren.stop(),
            "sms" => sequencer.quick_sms().await,
            "email" => sequencer.quick_email().await,
            "copy" => sequencer.quick_copy_location().await,
            "status" => {
                let state = match sequencer.state() {
                    SequencerState::Idle => "idle".to_string(),
                    SequencerState::Arming { remaining } => format!("arming ({remaining}s)"),
                    SequencerState::Dispatching => "dispatching".to_string(),
                    SequencerState::AwaitingConfirmationCall => "awaiting call".to_string(),
                };
                println!(
                    "sos: {} | alarm: {} | flash: {}",
                    state,
                    if siren.is_running() { "on" } else { "off" },
                    if siren.flash_active() { "on" } else { "off" }
                );
            }
            "quit" | "exit" => break,
            other => {
                if let Some(value) = other.strip_prefix("volume ") {
                    match value.trim().parse::<f32>() {
                        Ok(v) => siren.set_volume(v),
                        Err(_) => println!("volume expects a number in 0..1"),
                    }
                } else if !other.is_empty() {
                    println!("unknown command: {other}");
                }
            }
        }
    }

    siren.stop();
    info!("lifeline shutdown complete");
    Ok(())
}
