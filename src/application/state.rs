//! スキャンループ状態管理（Application層）
//!
//! カウンタ・フラグ・検出済みペイロード集合を1つのstructにまとめます。
//! ループはシングルスレッドなのでロックは不要。グローバル変数は持たない。

use std::collections::HashSet;

/// スキャンループの状態
///
/// 1イテレーションごとにループ本体から更新される。
/// `error_count`と検出済み集合はクリアキーでのみリセットされ、
/// `paused`/`frame_count`/`detected`には影響しない。
#[derive(Debug, Default)]
pub struct ScanState {
    /// 1つ以上のコードを記録済みか（trueになった後は最終表示を経て終了）
    detected: bool,
    /// 一時停止中か（デコードを完全にスキップ）
    paused: bool,
    /// 取得を試みたフレーム数（取得失敗でも進む）
    frame_count: u64,
    /// デコードが空振りした連続イテレーション数
    error_count: u32,
    /// 検出済みペイロードの集合（重複判定用）
    seen_payloads: HashSet<String>,
    /// 検出済みペイロードの初出順リスト（レポート用）
    payload_order: Vec<String>,
}

impl ScanState {
    /// 新しい状態を作成
    pub fn new() -> Self {
        Self::default()
    }

    // ===== 読み取り =====

    /// 検出フラグ
    #[inline]
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// 一時停止中か
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// フレームカウンタ
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// 空振りカウンタ
    #[allow(dead_code)]
    #[inline]
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// ペイロードが記録済みか
    #[allow(dead_code)]
    pub fn has_payload(&self, text: &str) -> bool {
        self.seen_payloads.contains(text)
    }

    /// 記録済みペイロード（初出順）
    pub fn payloads(&self) -> &[String] {
        &self.payload_order
    }

    // ===== 書き込み =====

    /// フレーム取得の試行を記録（成否に関わらず呼ばれる）
    ///
    /// # Returns
    /// インクリメント後のフレーム数
    pub fn record_frame(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }

    /// デコード空振りを記録
    ///
    /// # Returns
    /// インクリメント後の空振り回数
    pub fn record_empty_result(&mut self) -> u32 {
        self.error_count += 1;
        self.error_count
    }

    /// ペイロードを記録する
    ///
    /// # Returns
    /// - `true`: 新出のペイロード（呼び出し側が印字する）
    /// - `false`: 記録済み
    pub fn record_payload(&mut self, text: &str) -> bool {
        if self.seen_payloads.insert(text.to_string()) {
            self.payload_order.push(text.to_string());
            true
        } else {
            false
        }
    }

    /// 検出フラグを立てる（一度立ったら下りない）
    pub fn mark_detected(&mut self) {
        self.detected = true;
    }

    /// 一時停止をトグル（新しい状態を返す）
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// 検出済み集合と空振りカウンタをクリアする
    ///
    /// `paused`/`frame_count`/`detected`は変更しない。
    pub fn clear_detections(&mut self) {
        self.seen_payloads.clear();
        self.payload_order.clear();
        self.error_count = 0;
    }
}
