//! Unifying monitor entry point.
//!
//! Replays a sniffed capture through the inference engine, prints what was
//! learned about every device and optionally dry-runs a keystroke injection
//! against one of them.
//!
//! ```text
//! unifying-monitor [--config PATH] [--inject ADDRESS TEXT] <CAPTURE>
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML file or defaults
//!  └─ AppState::new()        -- registry sized from the config
//!  └─ run_source()           -- replay thread ─▶ pump ─▶ FrameProcessor
//!  └─ render_table()         -- device listing on stdout
//!  └─ InjectKeystrokesUseCase (optional, DryRunTransmitter)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use unifying_core::RadioAddress;
use unifying_monitor::application::inject_keystrokes::{
    FrameTransmitter, InjectKeystrokesUseCase, InjectionSettings,
};
use unifying_monitor::application::list_devices::render_table;
use unifying_monitor::infrastructure::capture::replay::ReplayFrameSource;
use unifying_monitor::infrastructure::radio::dry_run::DryRunTransmitter;
use unifying_monitor::infrastructure::radio::pump::run_source;
use unifying_monitor::infrastructure::radio::FrameSource;
use unifying_monitor::infrastructure::state::AppState;
use unifying_monitor::infrastructure::storage::config::load_config;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Replays a sniffed Unifying capture and reports what each device revealed.
#[derive(Debug, Parser)]
#[command(name = "unifying-monitor", version)]
struct Cli {
    /// Configuration file.  Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dry-run typing TEXT into the device at ADDRESS after the replay.
    #[arg(long, num_args = 2, value_names = ["ADDRESS", "TEXT"])]
    inject: Option<Vec<String>>,

    /// Capture file, one `<address> <hex payload>` line per frame.
    capture: PathBuf,
}

impl Cli {
    /// Parsed `--inject` target, if one was given.
    fn injection(&self) -> anyhow::Result<Option<(RadioAddress, String)>> {
        let Some([address, text]) = self.inject.as_deref() else {
            return Ok(None);
        };
        let address: RadioAddress = address
            .parse()
            .with_context(|| format!("invalid injection address {address:?}"))?;
        Ok(Some((address, text.clone())))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let injection = args.injection()?;

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.monitor.log_level)),
        )
        .init();

    info!("Unifying monitor starting");

    let settings = InjectionSettings::from(&config.injection);
    let state = AppState::new(config);

    // ── Replay ────────────────────────────────────────────────────────────────
    let source = ReplayFrameSource::from_path(&args.capture)
        .with_context(|| format!("failed to load capture {}", args.capture.display()))?;
    info!(frames = source.len(), capture = %args.capture.display(), "replaying capture");

    tokio::select! {
        result = run_source(&source, Arc::clone(&state)) => {
            result.context("frame source failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, stopping replay");
            source.stop();
        }
    }

    // ── Report ────────────────────────────────────────────────────────────────
    print!("{}", render_table(&state.device_table().await));
    let stats = state.stats().await;
    println!(
        "\nframes: {}  acks: {}  keep-alives: {}  counted: {}  malformed: {}  dropped: {}",
        stats.frames,
        stats.empty,
        stats.keep_alives,
        stats.counted,
        stats.malformed,
        stats.unknown_devices + stats.storage_full_drops + stats.prefix_limit_drops,
    );

    // ── Injection (dry run) ───────────────────────────────────────────────────
    if let Some((address, text)) = injection {
        let caps = state.capabilities_of(&address).await;
        if caps.is_none() {
            warn!(%address, "target never observed, assuming plain injection");
        }
        let transmitter = Arc::new(DryRunTransmitter::new());
        let use_case = InjectKeystrokesUseCase::new(
            Arc::clone(&transmitter) as Arc<dyn FrameTransmitter>,
            settings,
        );
        let summary = use_case
            .inject_text(address, caps.as_ref(), &text)
            .await
            .with_context(|| format!("injection into {address} failed"))?;
        println!(
            "injection: {} frames built for {address}, {} characters skipped",
            transmitter.sent(),
            summary.skipped.len()
        );
    }

    info!("Unifying monitor stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("unifying-monitor").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse_capture_only() {
        let cli = parse(&["cap.txt"]).unwrap();
        assert_eq!(cli.capture, PathBuf::from("cap.txt"));
        assert!(cli.config.is_none());
        assert!(cli.injection().unwrap().is_none());
    }

    #[test]
    fn test_parse_all_options() {
        // Arrange / Act
        let cli = parse(&[
            "--config",
            "m.toml",
            "--inject",
            "DE:AD:BE:EF:07",
            "hello",
            "cap.txt",
        ])
        .unwrap();

        // Assert
        assert_eq!(cli.config, Some(PathBuf::from("m.toml")));
        let (address, text) = cli.injection().unwrap().unwrap();
        assert_eq!(address, RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x07]));
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_missing_capture_is_error() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--config", "m.toml"]).is_err());
    }

    #[test]
    fn test_inject_needs_address_and_text() {
        assert!(parse(&["cap.txt", "--inject", "DE:AD:BE:EF:07"]).is_err());
    }

    #[test]
    fn test_bad_inject_address_is_error() {
        let cli = parse(&["--inject", "nope", "hi", "cap.txt"]).unwrap();
        assert!(cli.injection().is_err());
    }

    #[test]
    fn test_unknown_option_is_error() {
        assert!(parse(&["--bogus", "cap.txt"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
