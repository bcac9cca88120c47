//! Integration tests for the receive and transmit pipelines.
//!
//! Capture text is parsed, replayed through a frame source, pumped into the
//! shared state and listed; the learned capabilities then drive injection.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use unifying_core::protocol::checksum::validate_checksum;
use unifying_core::{Frame, RadioAddress};
use unifying_monitor::application::inject_keystrokes::{
    FrameTransmitter, InjectError, InjectKeystrokesUseCase, InjectionSettings,
};
use unifying_monitor::application::list_devices::render_table;
use unifying_monitor::infrastructure::capture::parse_capture;
use unifying_monitor::infrastructure::capture::replay::ReplayFrameSource;
use unifying_monitor::infrastructure::radio::pump::run_source;
use unifying_monitor::infrastructure::radio::{FrameSource, RadioError, RadioFrame};
use unifying_monitor::infrastructure::state::AppState;
use unifying_monitor::infrastructure::storage::config::{MonitorConfig, RegistrySection};

const KEYBOARD: RadioAddress = RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x07]);
const MOUSE: RadioAddress = RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x08]);

const CAPTURE: &str = "\
# keyboard on prefix 07, mouse on prefix 08
DE:AD:BE:EF:07 00 C1 00 04 00 00 00 00 00 3B
DE:AD:BE:EF:07 -
DE:AD:BE:EF:07 00 C1 00 00 00 00 00 00 00 3F
DE:AD:BE:EF:07 00 40 04 B0 0C
DE:AD:BE:EF:08 00 C2 00 00 01 00 00 00 00 3D
DE:AD:BE:EF:08 00 C2 00 00 01 00 00 00 00 3D
DE:AD:BE:EF:08 00 C2 00 00 01 00 00 00 00 3D
this line is garbage
";

// ── Test doubles ──────────────────────────────────────────────────────────────

mock! {
    pub Radio {}

    impl FrameSource for Radio {
        fn start(&self) -> Result<mpsc::Receiver<RadioFrame>, RadioError>;
        fn stop(&self);
    }
}

#[derive(Default)]
struct RecordingTransmitter {
    frames: Mutex<Vec<(RadioAddress, Frame)>>,
}

#[async_trait]
impl FrameTransmitter for RecordingTransmitter {
    async fn transmit(&self, address: RadioAddress, frame: Frame) -> Result<(), RadioError> {
        self.frames.lock().unwrap().push((address, frame));
        Ok(())
    }
}

fn settings() -> InjectionSettings {
    InjectionSettings {
        keystroke_delay: Duration::ZERO,
        release_keys: true,
    }
}

async fn replay(text: &str, config: MonitorConfig) -> Arc<AppState> {
    let capture = parse_capture(text);
    let state = AppState::new(config);
    let source = ReplayFrameSource::new(capture.frames);
    run_source(&source, Arc::clone(&state)).await.unwrap();
    state
}

// ── Receive path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_capture_replay_learns_both_endpoints() {
    // Arrange / Act
    let state = replay(CAPTURE, MonitorConfig::default()).await;

    // Assert
    let rows = state.device_table().await;
    assert_eq!(rows.len(), 2);

    let keyboard = &rows[0];
    assert_eq!(keyboard.address, "DE:AD:BE:EF:07");
    assert!(keyboard.is_logitech);
    assert!(keyboard.vuln_plain_injection);
    assert_eq!(keyboard.frames, 3);
    assert_eq!(keyboard.strategy, "plain");

    let mouse = &rows[1];
    assert_eq!(mouse.address, "DE:AD:BE:EF:08");
    assert_eq!(mouse.report_types, "mouse");
    assert!(!mouse.vuln_plain_injection);

    let stats = state.stats().await;
    assert_eq!(stats.frames, 7);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.keep_alives, 1);
    assert_eq!(stats.counted, 5);
}

#[tokio::test]
async fn test_full_registry_drops_new_devices() {
    // Arrange
    let config = MonitorConfig {
        registry: RegistrySection {
            max_devices: 1,
            max_prefixes: 1,
        },
        ..Default::default()
    };
    let text = "\
AA:AA:AA:AA:01 00 40 04 B0 0C
BB:BB:BB:BB:01 00 40 04 B0 0C
AA:AA:AA:AA:02 00 40 04 B0 0C
";

    // Act
    let state = replay(text, config).await;

    // Assert
    let stats = state.stats().await;
    assert_eq!(stats.keep_alives, 1);
    assert_eq!(stats.storage_full_drops, 1);
    assert_eq!(stats.prefix_limit_drops, 1);
    assert_eq!(state.device_table().await.len(), 1);
}

#[test]
fn test_rendered_listing_names_every_endpoint() {
    let state = tokio_test::block_on(replay(CAPTURE, MonitorConfig::default()));
    let table = tokio_test::block_on(state.device_table());
    let rendered = render_table(&table);
    assert!(rendered.contains("DE:AD:BE:EF:07"));
    assert!(rendered.contains("DE:AD:BE:EF:08"));
}

#[tokio::test]
async fn test_source_start_failure_is_reported_and_not_stopped() {
    // Arrange
    let mut radio = MockRadio::new();
    radio
        .expect_start()
        .times(1)
        .returning(|| Err(RadioError::Unavailable("no dongle".to_string())));
    radio.expect_stop().times(0);
    let state = AppState::new(MonitorConfig::default());

    // Act
    let result = run_source(&radio, Arc::clone(&state)).await;

    // Assert
    assert!(matches!(result, Err(RadioError::Unavailable(_))));
    assert_eq!(state.stats().await.frames, 0);
}

#[tokio::test]
async fn test_source_is_stopped_after_draining() {
    // Arrange
    let mut radio = MockRadio::new();
    radio.expect_start().times(1).returning(|| {
        let (tx, rx) = mpsc::channel();
        tx.send(RadioFrame::new(KEYBOARD, Frame::empty())).unwrap();
        Ok(rx)
    });
    radio.expect_stop().times(1).return_const(());
    let state = AppState::new(MonitorConfig::default());

    // Act
    let processed = run_source(&radio, state).await.unwrap();

    // Assert
    assert_eq!(processed, 1);
}

// ── Transmit path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_learned_capabilities_drive_plain_injection() {
    // Arrange
    let state = replay(CAPTURE, MonitorConfig::default()).await;
    let caps = state.capabilities_of(&KEYBOARD).await;
    let transmitter = Arc::new(RecordingTransmitter::default());
    let use_case = InjectKeystrokesUseCase::new(
        Arc::clone(&transmitter) as Arc<dyn FrameTransmitter>,
        settings(),
    );

    // Act
    let summary = use_case
        .inject_text(KEYBOARD, caps.as_ref(), "ok")
        .await
        .unwrap();

    // Assert
    assert_eq!(summary.frames_sent, 4);
    let frames = transmitter.frames.lock().unwrap();
    assert!(frames.iter().all(|(address, _)| *address == KEYBOARD));
    assert!(frames.iter().all(|(_, f)| validate_checksum(f.as_bytes())));
    assert_eq!(frames[0].1.as_bytes()[1], 0xC1);
}

#[tokio::test]
async fn test_encrypted_target_with_key_is_refused() {
    // Arrange
    let state = replay(CAPTURE, MonitorConfig::default()).await;
    {
        let mut processor = state.processor.lock().await;
        let caps = processor
            .registry_mut()
            .capabilities_mut(&MOUSE)
            .unwrap();
        caps.is_encrypted = true;
        caps.key_known = true;
    }
    let caps = state.capabilities_of(&MOUSE).await;
    let transmitter = Arc::new(RecordingTransmitter::default());
    let use_case = InjectKeystrokesUseCase::new(
        Arc::clone(&transmitter) as Arc<dyn FrameTransmitter>,
        settings(),
    );

    // Act
    let result = use_case.inject_text(MOUSE, caps.as_ref(), "x").await;

    // Assert
    assert!(matches!(result, Err(InjectError::Synthesis(_))));
    assert!(transmitter.frames.lock().unwrap().is_empty());
}
