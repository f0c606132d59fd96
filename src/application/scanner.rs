//! スキャンループ制御モジュール
//!
//! read → decode → annotate → display → input の1サイクルを
//! シングルスレッドで回し、終了条件を判定します。

use crate::application::state::ScanState;
use crate::domain::{
    config::{AppConfig, KeysConfig, ScannerConfig},
    error::DomainResult,
    ports::{CapturePort, DecodePort, DisplayPort},
    types::{DetectedCode, Frame, Overlay},
};
use std::time::Duration;

/// スキャンループ設定
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ScanOptions {
    /// 連続で検出なしと判定する上限回数
    pub no_detection_limit: u32,
    /// 検出後にフレームを表示し続ける時間
    pub exit_hold: Duration,
    /// キー入力ポーリングの待ち時間
    pub poll_wait: Duration,
    /// 終了キー
    pub quit_key: char,
    /// 一時停止/再開キー
    pub pause_key: char,
    /// クリアキー
    pub clear_key: char,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            no_detection_limit: ScannerConfig::DEFAULT_NO_DETECTION_LIMIT,
            exit_hold: Duration::from_millis(ScannerConfig::DEFAULT_EXIT_HOLD_MS),
            poll_wait: Duration::from_millis(ScannerConfig::DEFAULT_POLL_WAIT_MS),
            quit_key: KeysConfig::DEFAULT_QUIT,
            pause_key: KeysConfig::DEFAULT_PAUSE,
            clear_key: KeysConfig::DEFAULT_CLEAR,
        }
    }
}

impl From<&AppConfig> for ScanOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            no_detection_limit: config.scanner.no_detection_limit,
            exit_hold: config.scanner.exit_hold(),
            poll_wait: config.scanner.poll_wait(),
            quit_key: config.keys.quit,
            pause_key: config.keys.pause,
            clear_key: config.keys.clear,
        }
    }
}

/// ループの終了要因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// コードを検出して正常終了
    Detected,
    /// 検出なし上限に達して終了
    NoDetection,
    /// 終了キーによる終了
    Quit,
}

/// ループ終了時のレポート
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// 終了要因
    pub outcome: ScanOutcome,
    /// 記録されたペイロード（初出順、重複なし）
    pub payloads: Vec<String>,
    /// 取得を試みたフレーム数
    pub frames: u64,
}

/// スキャンループ実行コンテキスト
#[allow(dead_code)]
pub struct ScanRunner<C, D, V>
where
    C: CapturePort,
    D: DecodePort,
    V: DisplayPort,
{
    capture: C,
    decoder: D,
    display: V,
    options: ScanOptions,
    state: ScanState,
}

#[allow(dead_code)]
impl<C, D, V> ScanRunner<C, D, V>
where
    C: CapturePort,
    D: DecodePort,
    V: DisplayPort,
{
    /// 新しいScanRunnerを作成
    pub fn new(capture: C, decoder: D, display: V, options: ScanOptions) -> Self {
        Self {
            capture,
            decoder,
            display,
            options,
            state: ScanState::new(),
        }
    }

    /// キャプチャアダプタへの参照（テスト用）
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// デコードアダプタへの参照（テスト用）
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// 表示アダプタへの参照（テスト用）
    pub fn display(&self) -> &V {
        &self.display
    }

    /// スキャンループを実行する（ブロッキング）
    ///
    /// 終了要因に関わらず、戻る前にカメラとウィンドウを解放する。
    ///
    /// # Returns
    /// - `Ok(ScanReport)`: いずれかの終了条件で正常にループを抜けた
    /// - `Err(DomainError)`: 表示系の回復不能なエラー
    pub fn run(&mut self) -> DomainResult<ScanReport> {
        let result = self.run_loop();

        // 終了経路に関わらずデバイスとウィンドウを解放する
        if let Err(e) = self.capture.release() {
            tracing::warn!("Failed to release capture device: {}", e);
        }
        if let Err(e) = self.display.close() {
            tracing::warn!("Failed to close display window: {}", e);
        }

        let outcome = result?;
        Ok(ScanReport {
            outcome,
            payloads: self.state.payloads().to_vec(),
            frames: self.state.frame_count(),
        })
    }

    fn run_loop(&mut self) -> DomainResult<ScanOutcome> {
        loop {
            // フレーム取得。カウンタは取得の成否に関わらず進む
            let read_result = self.capture.read_frame();
            self.state.record_frame();

            let frame = match read_result {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::warn!("Failed to capture image");
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to capture image: {}", e);
                    continue;
                }
            };

            let mut overlays: Vec<Overlay> = Vec::new();

            if !self.state.is_paused() {
                match self.decoder.decode(&frame) {
                    Ok(codes) if !codes.is_empty() => {
                        match self.annotate_detections(&codes, &mut overlays) {
                            Ok(()) => {
                                println!(
                                    "QR Code detected. Exiting in {} seconds...",
                                    hold_seconds_text(self.options.exit_hold)
                                );
                                if let Err(e) = self.present_and_hold(&frame, &overlays) {
                                    tracing::warn!("Final presentation failed: {}", e);
                                }
                                return Ok(ScanOutcome::Detected);
                            }
                            Err(e) => {
                                tracing::warn!("Error processing frame: {}", e);
                                if self.state.is_detected() {
                                    // 同一フレーム内の先行コードが記録済みの場合は
                                    // 検出フラグが立っているためループを抜ける
                                    return Ok(ScanOutcome::Detected);
                                }
                                continue;
                            }
                        }
                    }
                    Ok(_) => {
                        // 検出なし
                        let errors = self.state.record_empty_result();
                        if errors >= self.options.no_detection_limit {
                            println!("Error: NO QR/BARCODE DETECTED. Exiting...");
                            return Ok(ScanOutcome::NoDetection);
                        }
                    }
                    Err(e) => {
                        // デコード失敗はこのイテレーションを破棄する
                        // （空振りカウンタとは別経路。カウンタは進めない）
                        tracing::warn!("Error processing frame: {}", e);
                        continue;
                    }
                }
            } else {
                overlays.push(Overlay::PausedBanner {
                    resume_key: self.options.pause_key,
                });
            }

            overlays.push(Overlay::FrameCounter {
                count: self.state.frame_count(),
            });
            self.display.present(&frame, &overlays)?;

            if let Some(key) = self.display.wait_key(self.options.poll_wait)? {
                if key == self.options.quit_key {
                    tracing::info!("Quit key pressed");
                    return Ok(ScanOutcome::Quit);
                } else if key == self.options.pause_key {
                    let paused = self.state.toggle_paused();
                    tracing::info!("Scanning {}", if paused { "paused" } else { "resumed" });
                } else if key == self.options.clear_key {
                    self.state.clear_detections();
                    tracing::info!("Detected codes and error counter cleared");
                }
            }
        }
    }

    /// 検出されたコードを記録し、描画コマンドを組み立てる
    ///
    /// ペイロードがUTF-8として不正な場合はErrを返し、呼び出し側が
    /// イテレーションを破棄する。それまでに記録済みのコードは残る。
    fn annotate_detections(
        &mut self,
        codes: &[DetectedCode],
        overlays: &mut Vec<Overlay>,
    ) -> DomainResult<()> {
        for code in codes {
            let text = code.payload_text()?;

            if self.state.record_payload(&text) {
                println!("Detected data: {}", text);
            }
            self.state.mark_detected();

            overlays.push(Overlay::Outline {
                points: code.polygon.clone(),
            });
            overlays.push(Overlay::Label {
                rect: code.rect,
                text,
            });
            overlays.push(Overlay::DetectedBanner);
        }
        Ok(())
    }

    /// 検出フレームを表示して固定時間ホールドする
    ///
    /// ホールド中のキー入力は読み捨てる。
    fn present_and_hold(&mut self, frame: &Frame, overlays: &[Overlay]) -> DomainResult<()> {
        self.display.present(frame, overlays)?;
        let _ = self.display.wait_key(self.options.exit_hold)?;
        Ok(())
    }
}

/// 検出後メッセージに載せる秒数表記を組み立てる
///
/// 整数秒は小数点なし（3000ms→"3"）、秒未満の端数は小数で表記する
/// （1500ms→"1.5"）。切り捨てない。
fn hold_seconds_text(hold: Duration) -> String {
    hold.as_secs_f64().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        mock_capture::{MockCaptureAdapter, ScriptedRead},
        mock_decoder::{sample_code, MockDecodeAdapter},
        mock_display::MockDisplayAdapter,
    };

    fn runner_with(
        capture: MockCaptureAdapter,
        decoder: MockDecodeAdapter,
        display: MockDisplayAdapter,
        options: ScanOptions,
    ) -> ScanRunner<MockCaptureAdapter, MockDecodeAdapter, MockDisplayAdapter> {
        ScanRunner::new(capture, decoder, display, options)
    }

    #[test]
    fn test_scan_options_default() {
        let options = ScanOptions::default();
        assert_eq!(options.no_detection_limit, 500);
        assert_eq!(options.exit_hold, Duration::from_millis(3000));
        assert_eq!(options.poll_wait, Duration::from_millis(1));
        assert_eq!(options.quit_key, 'q');
        assert_eq!(options.pause_key, 'p');
        assert_eq!(options.clear_key, 'c');
    }

    #[test]
    fn test_scan_options_from_config() {
        let mut config = AppConfig::default();
        config.scanner.no_detection_limit = 42;
        config.scanner.exit_hold_ms = 1500;
        config.scanner.poll_wait_ms = 7;
        config.keys.quit = 'x';

        let options = ScanOptions::from(&config);
        assert_eq!(options.no_detection_limit, 42);
        assert_eq!(options.exit_hold, Duration::from_millis(1500));
        assert_eq!(options.poll_wait, Duration::from_millis(7));
        assert_eq!(options.quit_key, 'x');
        assert_eq!(options.pause_key, 'p');
    }

    #[test]
    fn test_hold_seconds_text() {
        // デフォルトの3000msは小数点なしの整数秒になる
        assert_eq!(hold_seconds_text(Duration::from_millis(3000)), "3");

        // 秒未満の端数は切り捨てずに小数で表記される
        assert_eq!(hold_seconds_text(Duration::from_millis(1500)), "1.5");
        assert_eq!(hold_seconds_text(Duration::from_millis(500)), "0.5");
    }

    #[test]
    fn test_detection_exits_with_final_hold() {
        let capture = MockCaptureAdapter::default();
        let mut decoder = MockDecodeAdapter::new();
        decoder.queue_codes(vec![sample_code(b"HELLO")]);
        let display = MockDisplayAdapter::new();

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        assert_eq!(report.outcome, ScanOutcome::Detected);
        assert_eq!(report.payloads, ["HELLO"]);
        assert_eq!(report.frames, 1);

        // 最終表示が1回だけ行われ、固定ホールドが発行される
        assert_eq!(runner.display().present_count(), 1);
        assert_eq!(runner.display().waits(), [Duration::from_millis(3000)]);

        // 最終フレームにフレームカウンタは描かれない
        let overlays = runner.display().last_overlays().expect("one present");
        assert!(overlays.contains(&Overlay::DetectedBanner));
        assert!(!overlays
            .iter()
            .any(|o| matches!(o, Overlay::FrameCounter { .. })));
    }

    #[test]
    fn test_quit_key_terminates() {
        let capture = MockCaptureAdapter::default();
        let decoder = MockDecodeAdapter::new();
        let mut display = MockDisplayAdapter::new();
        display.queue_key(Some('q'));

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        assert_eq!(report.outcome, ScanOutcome::Quit);
        assert!(report.payloads.is_empty());
        assert_eq!(report.frames, 1);
        assert!(runner.capture().is_released());
        assert!(runner.display().is_closed());
    }

    #[test]
    fn test_decode_error_drops_iteration() {
        let capture = MockCaptureAdapter::default();
        let mut decoder = MockDecodeAdapter::new();
        decoder.queue_error("simulated decoder failure");
        decoder.queue_codes(vec![sample_code(b"HELLO")]);
        let display = MockDisplayAdapter::new();

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        // エラーのイテレーションでは表示もキー処理も行われない
        assert_eq!(report.outcome, ScanOutcome::Detected);
        assert_eq!(report.frames, 2);
        assert_eq!(runner.display().present_count(), 1);
        assert_eq!(runner.display().waits(), [Duration::from_millis(3000)]);
    }

    #[test]
    fn test_capture_failure_retries_without_decoding() {
        let mut capture = MockCaptureAdapter::default();
        capture.queue(ScriptedRead::Miss);
        capture.queue(ScriptedRead::Fail);
        let mut decoder = MockDecodeAdapter::new();
        decoder.queue_codes(vec![sample_code(b"HELLO")]);
        let display = MockDisplayAdapter::new();

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        // 取得失敗2回はデコードを消費せず、フレームカウンタだけ進む
        assert_eq!(report.outcome, ScanOutcome::Detected);
        assert_eq!(report.frames, 3);
        assert_eq!(runner.decoder().calls(), 1);
    }

    #[test]
    fn test_invalid_utf8_payload_skips_iteration() {
        let capture = MockCaptureAdapter::default();
        let mut decoder = MockDecodeAdapter::new();
        // UTF-8として不正なペイロードのみのフレーム
        decoder.queue_codes(vec![sample_code(&[0xFF, 0xFE])]);
        let mut display = MockDisplayAdapter::new();
        display.queue_key(Some('q'));

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        // 不正ペイロードのイテレーションは破棄され、次のイテレーションで
        // 終了キーを拾って抜ける
        assert_eq!(report.outcome, ScanOutcome::Quit);
        assert!(report.payloads.is_empty());
        assert_eq!(report.frames, 2);
        assert_eq!(runner.display().present_count(), 1);
    }

    #[test]
    fn test_invalid_utf8_after_recorded_code_still_detects() {
        let capture = MockCaptureAdapter::default();
        let mut decoder = MockDecodeAdapter::new();
        // 1つ目は正常、2つ目が不正UTF-8のフレーム
        decoder.queue_codes(vec![sample_code(b"HELLO"), sample_code(&[0xFF, 0xFE])]);
        let display = MockDisplayAdapter::new();

        let mut runner = runner_with(capture, decoder, display, ScanOptions::default());
        let report = runner.run().expect("run must succeed");

        // 先行コードが記録済みなので検出として終了する（最終ホールドなし）
        assert_eq!(report.outcome, ScanOutcome::Detected);
        assert_eq!(report.payloads, ["HELLO"]);
        assert_eq!(runner.display().present_count(), 0);
    }
}
