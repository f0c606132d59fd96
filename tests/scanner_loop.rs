//! スキャンループ統合テスト
//!
//! モックアダプタを使った ScanRunner のend-to-endテスト。
//! カメラ実機やウィンドウ表示は不要で、全テストがCI環境で実行可能。

use std::time::Duration;
use ZedsDead::application::scanner::{ScanOptions, ScanOutcome, ScanRunner};
use ZedsDead::domain::types::Overlay;
use ZedsDead::infrastructure::mock_capture::{MockCaptureAdapter, ScriptedRead};
use ZedsDead::infrastructure::mock_decoder::{sample_code, MockDecodeAdapter};
use ZedsDead::infrastructure::mock_display::MockDisplayAdapter;

/// 検出なし上限だけを差し替えたオプションを作成
fn options_with_limit(limit: u32) -> ScanOptions {
    ScanOptions {
        no_detection_limit: limit,
        ..ScanOptions::default()
    }
}

/// オーバーレイ列からフレームカウンタの値を取り出す
fn frame_counter_value(overlays: &[Overlay]) -> Option<u64> {
    overlays.iter().find_map(|o| match o {
        Overlay::FrameCounter { count } => Some(*count),
        _ => None,
    })
}

#[test]
fn test_single_code_detection_flow() {
    let capture = MockCaptureAdapter::default();
    let mut decoder = MockDecodeAdapter::new();
    decoder.queue_codes(vec![sample_code(b"HELLO")]);
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::Detected);
    assert_eq!(report.payloads, vec!["HELLO"]);
    assert_eq!(report.frames, 1, "Detection should happen on the first frame");

    // 最終表示は1回のみで、検出後の保持時間だけ待機する
    let display = runner.display();
    assert_eq!(display.present_count(), 1);
    assert_eq!(display.waits(), &[Duration::from_millis(3000)]);

    let overlays = display.last_overlays().expect("final frame should be presented");
    let outlines = overlays
        .iter()
        .filter(|o| matches!(o, Overlay::Outline { .. }))
        .count();
    assert_eq!(outlines, 1, "One detected code should draw one outline");
    assert!(
        overlays
            .iter()
            .any(|o| matches!(o, Overlay::Label { text, .. } if text == "HELLO")),
        "Payload label should be drawn on the final frame"
    );
    assert!(
        overlays.iter().any(|o| matches!(o, Overlay::DetectedBanner)),
        "Detected banner should be drawn on the final frame"
    );
    assert!(
        frame_counter_value(overlays).is_none(),
        "Final frame should not carry a frame counter"
    );

    assert!(runner.capture().is_released(), "Camera should be released");
    assert!(runner.display().is_closed(), "Window should be closed");
}

#[test]
fn test_duplicate_payloads_in_one_frame_recorded_once() {
    let capture = MockCaptureAdapter::default();
    let mut decoder = MockDecodeAdapter::new();
    decoder.queue_codes(vec![sample_code(b"TWIN"), sample_code(b"TWIN")]);
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::Detected);
    assert_eq!(
        report.payloads,
        vec!["TWIN"],
        "Identical payloads should be recorded only once"
    );

    // 重複ペイロードでもオーバーレイはコードごとに描画される
    let overlays = runner.display().last_overlays().unwrap();
    let outlines = overlays
        .iter()
        .filter(|o| matches!(o, Overlay::Outline { .. }))
        .count();
    let labels = overlays
        .iter()
        .filter(|o| matches!(o, Overlay::Label { .. }))
        .count();
    assert_eq!(outlines, 2, "Each code instance should draw its own outline");
    assert_eq!(labels, 2, "Each code instance should draw its own label");
}

#[test]
fn test_detection_on_last_frame_before_limit() {
    let capture = MockCaptureAdapter::default();
    let mut decoder = MockDecodeAdapter::new();
    decoder.queue_empty_n(499);
    decoder.queue_codes(vec![sample_code(b"LAST")]);
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(
        report.outcome,
        ScanOutcome::Detected,
        "A hit on the 500th frame should still terminate as detected"
    );
    assert_eq!(report.payloads, vec!["LAST"]);
    assert_eq!(report.frames, 500);

    let display = runner.display();
    assert_eq!(display.present_count(), 500);
    assert_eq!(
        display.waits().last(),
        Some(&Duration::from_millis(3000)),
        "Final wait should be the detection hold"
    );
}

#[test]
fn test_no_detection_limit_terminates() {
    let capture = MockCaptureAdapter::default();
    // スクリプトなし: 全フレームが検出ゼロ
    let decoder = MockDecodeAdapter::new();
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::NoDetection);
    assert_eq!(report.frames, 500, "Limit of 500 misses should stop at frame 500");
    assert!(report.payloads.is_empty());

    // 上限到達フレームは表示もキー待ちも行わない
    let display = runner.display();
    assert_eq!(display.present_count(), 499);
    assert_eq!(display.waits().len(), 499);

    assert_eq!(runner.decoder().calls(), 500);
    assert!(runner.capture().is_released(), "Camera should be released");
    assert!(runner.display().is_closed(), "Window should be closed");
}

#[test]
fn test_decode_error_does_not_count_toward_limit() {
    let capture = MockCaptureAdapter::default();
    let mut decoder = MockDecodeAdapter::new();
    // 失敗1回 + 空振り2回: 失敗が空振り扱いなら2フレーム目で上限到達していた
    decoder.queue_error("simulated decoder failure");
    decoder.queue_empty_n(2);
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, options_with_limit(2));
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::NoDetection);
    assert_eq!(
        report.frames, 3,
        "Decode errors must not count toward the no-detection limit"
    );
    assert!(report.payloads.is_empty());

    // 失敗イテレーションは表示されず、上限到達イテレーションも表示されない
    assert_eq!(runner.display().present_count(), 1);
    assert_eq!(runner.decoder().calls(), 3);
}

#[test]
fn test_pause_suspends_decoding() {
    let capture = MockCaptureAdapter::default();
    let decoder = MockDecodeAdapter::new();
    let mut display = MockDisplayAdapter::new();
    // 1フレーム目で一時停止、3フレーム停止したまま、再開して終了
    display.queue_key(Some('p'));
    display.queue_no_key_n(2);
    display.queue_key(Some('p'));
    display.queue_key(Some('q'));

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::Quit);
    assert_eq!(report.frames, 5);
    assert_eq!(
        runner.decoder().calls(),
        2,
        "Paused frames must not reach the decoder"
    );

    let presented = runner.display().presented();
    assert_eq!(presented.len(), 5, "Paused frames are still presented");

    // 停止中のフレームには一時停止バナーが載る
    assert!(
        presented[1]
            .iter()
            .any(|o| matches!(o, Overlay::PausedBanner { resume_key: 'p' })),
        "Paused frame should carry the paused banner"
    );
    assert!(
        !presented[0]
            .iter()
            .any(|o| matches!(o, Overlay::PausedBanner { .. })),
        "Active frame should not carry the paused banner"
    );

    // フレームカウンタは停止中も進み続ける
    assert_eq!(frame_counter_value(&presented[0]), Some(1));
    assert_eq!(frame_counter_value(&presented[1]), Some(2));
    assert_eq!(frame_counter_value(&presented[4]), Some(5));
}

#[test]
fn test_clear_key_resets_no_detection_counter() {
    let capture = MockCaptureAdapter::default();
    let decoder = MockDecodeAdapter::new();
    let mut display = MockDisplayAdapter::new();
    // 4フレーム目でクリア: 未クリアなら5フレーム目で上限到達していた
    display.queue_no_key_n(3);
    display.queue_key(Some('c'));

    let mut runner = ScanRunner::new(capture, decoder, display, options_with_limit(5));
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::NoDetection);
    assert_eq!(
        report.frames, 9,
        "Clearing after 4 misses should restart the count toward the limit"
    );
    assert_eq!(runner.display().present_count(), 8);
}

#[test]
fn test_custom_exit_hold_applied() {
    let capture = MockCaptureAdapter::default();
    let mut decoder = MockDecodeAdapter::new();
    decoder.queue_codes(vec![sample_code(b"CUSTOM")]);
    let display = MockDisplayAdapter::new();

    let options = ScanOptions {
        exit_hold: Duration::from_millis(1500),
        ..ScanOptions::default()
    };
    let mut runner = ScanRunner::new(capture, decoder, display, options);
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::Detected);
    assert_eq!(
        runner.display().waits(),
        &[Duration::from_millis(1500)],
        "Detection hold should honor the configured duration"
    );
}

#[test]
fn test_capture_failures_do_not_reach_decoder() {
    let mut capture = MockCaptureAdapter::default();
    capture.queue(ScriptedRead::Fail);
    capture.queue(ScriptedRead::Miss);
    capture.queue(ScriptedRead::Success);
    let mut decoder = MockDecodeAdapter::new();
    decoder.queue_codes(vec![sample_code(b"RECOVERED")]);
    let display = MockDisplayAdapter::new();

    let mut runner = ScanRunner::new(capture, decoder, display, ScanOptions::default());
    let report = runner.run().expect("scan loop should succeed");

    assert_eq!(report.outcome, ScanOutcome::Detected);
    assert_eq!(report.payloads, vec!["RECOVERED"]);
    assert_eq!(
        report.frames, 3,
        "Failed capture attempts still count as frames"
    );

    assert_eq!(runner.capture().reads(), 3);
    assert_eq!(
        runner.decoder().calls(),
        1,
        "Only the successfully captured frame should be decoded"
    );
    // 取得失敗フレームは表示されない
    assert_eq!(runner.display().present_count(), 1);
}
