/// モックデコードアダプタ
///
/// テスト・開発用のQR/バーコード検出モック実装。
/// スクリプトされたデコード結果を先頭から消費し、尽きた後は検出なしを返し続ける。

use crate::domain::{
    BoundingRect, DecodePort, DetectedCode, DomainError, DomainResult, Frame, PixelPoint,
};
use std::collections::VecDeque;

/// モックデコードアダプタ
#[allow(dead_code)]
pub struct MockDecodeAdapter {
    script: VecDeque<DomainResult<Vec<DetectedCode>>>,
    calls: u64,
}

#[allow(dead_code)]
impl MockDecodeAdapter {
    /// 新しいモックデコードアダプタを作成（スクリプトなし = 常に検出なし）
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            calls: 0,
        }
    }

    /// 検出結果をスクリプトに追加
    pub fn queue_codes(&mut self, codes: Vec<DetectedCode>) {
        self.script.push_back(Ok(codes));
    }

    /// 検出なしをスクリプトに追加
    pub fn queue_empty(&mut self) {
        self.script.push_back(Ok(Vec::new()));
    }

    /// 検出なしをn回スクリプトに追加
    pub fn queue_empty_n(&mut self, n: usize) {
        for _ in 0..n {
            self.queue_empty();
        }
    }

    /// デコード失敗をスクリプトに追加
    pub fn queue_error(&mut self, message: &str) {
        self.script
            .push_back(Err(DomainError::Decode(message.to_string())));
    }

    /// decodeが呼ばれた回数
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl Default for MockDecodeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodePort for MockDecodeAdapter {
    fn decode(&mut self, _frame: &Frame) -> DomainResult<Vec<DetectedCode>> {
        self.calls += 1;

        match self.script.pop_front() {
            Some(result) => result,
            // スクリプトが尽きた後は検出なしを返し続ける
            None => Ok(Vec::new()),
        }
    }
}

/// テスト用の標準的な検出結果を作成するヘルパー
///
/// 固定位置の正方形ポリゴンと、それを包含する矩形を持つコードを返す。
#[allow(dead_code)]
pub fn sample_code(payload: &[u8]) -> DetectedCode {
    let polygon = vec![
        PixelPoint::new(50, 40),
        PixelPoint::new(150, 40),
        PixelPoint::new(150, 140),
        PixelPoint::new(50, 140),
    ];
    let rect = BoundingRect::from_points(&polygon).expect("polygon is non-empty");
    DetectedCode::new(payload.to_vec(), polygon, rect)
}
