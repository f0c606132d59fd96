mod domain;
mod logging;
mod application;
mod infrastructure;

use crate::application::scanner::{ScanOptions, ScanOutcome, ScanRunner};
use crate::domain::config::{AppConfig, KeysConfig};
use crate::domain::ports::CapturePort; // traitメソッド使用のため
use crate::infrastructure::camera::CameraCapture;
use crate::infrastructure::decoder::QrDecoder;
use crate::infrastructure::display::WindowDisplay;
use crate::logging::init_logging;

fn main() {
    // ログシステムの初期化（標準出力）
    // 検出結果などの利用者向けメッセージはprintln、運用ログはtracingに分離する
    let _guard = init_logging("info", false, None);

    tracing::info!("ZedsDead starting...");

    match run() {
        Ok(_) => {
            tracing::info!("ZedsDead terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// 操作方法を標準出力に表示する
fn print_help(keys: &KeysConfig) {
    println!("QR Code and Barcode Scanner");
    println!("Instructions:");
    println!("  - Press '{}' to quit the program", keys.quit);
    println!("  - Press '{}' to pause/resume scanning", keys.pause);
    println!("  - Press '{}' to clear detected codes", keys.clear);
    println!();
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Camera: device={}, requested={}x{}",
        config.camera.device_index,
        config.camera.frame_width,
        config.camera.frame_height
    );
    tracing::info!("Decoder: engine={}", config.decoder.engine);
    tracing::info!(
        "Scanner: no_detection_limit={}, exit_hold={}ms, poll_wait={}ms",
        config.scanner.no_detection_limit,
        config.scanner.exit_hold_ms,
        config.scanner.poll_wait_ms
    );

    print_help(&config.keys);

    // カメラの初期化（開けない場合はループ開始前に致命的エラー）
    tracing::info!("Initializing camera capture adapter...");
    let capture = CameraCapture::new(&config.camera)?;

    let info = capture.device_info();
    tracing::info!(
        "Camera initialized: {}x{} @ {}fps - {}",
        info.width,
        info.height,
        info.fps,
        info.backend
    );

    tracing::info!("Initializing QR decoder...");
    let decoder = QrDecoder::new()?;

    tracing::info!(
        "Initializing display window '{}'...",
        config.display.window_title
    );
    let display = WindowDisplay::new(&config.display)?;

    tracing::info!("Starting scan loop...");
    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::from(&config));
    let report = runner.run()?;

    match report.outcome {
        ScanOutcome::Detected => {
            tracing::info!(
                "Scan finished: {} code(s) detected over {} frames",
                report.payloads.len(),
                report.frames
            );
        }
        ScanOutcome::NoDetection => {
            tracing::info!(
                "Scan finished: no code detected over {} frames",
                report.frames
            );
        }
        ScanOutcome::Quit => {
            tracing::info!("Scan aborted by user after {} frames", report.frames);
        }
    }

    Ok(())
}
