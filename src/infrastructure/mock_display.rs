/// モック表示アダプタ
///
/// テスト・開発用のウィンドウモック実装。
/// 描画コマンドと待ち時間をすべて記録し、キー入力はスクリプトから返す。
/// wait_keyは実際には待たないため、ループのテストは実時間なしで走る。

use crate::domain::{DisplayPort, DomainResult, Frame, Overlay};
use std::collections::VecDeque;
use std::time::Duration;

/// モック表示アダプタ
#[allow(dead_code)]
pub struct MockDisplayAdapter {
    /// presentごとのオーバーレイ記録
    presented: Vec<Vec<Overlay>>,
    /// wait_keyに渡されたタイムアウトの記録
    waits: Vec<Duration>,
    /// wait_keyが順に返すキーのスクリプト（尽きたらNone）
    key_script: VecDeque<Option<char>>,
    closed: bool,
}

#[allow(dead_code)]
impl MockDisplayAdapter {
    /// 新しいモック表示アダプタを作成
    pub fn new() -> Self {
        Self {
            presented: Vec::new(),
            waits: Vec::new(),
            key_script: VecDeque::new(),
            closed: false,
        }
    }

    /// キー入力をスクリプトに追加
    pub fn queue_key(&mut self, key: Option<char>) {
        self.key_script.push_back(key);
    }

    /// キー入力なしをn回スクリプトに追加
    pub fn queue_no_key_n(&mut self, n: usize) {
        for _ in 0..n {
            self.key_script.push_back(None);
        }
    }

    /// presentが呼ばれた回数
    pub fn present_count(&self) -> usize {
        self.presented.len()
    }

    /// presentごとのオーバーレイ記録
    pub fn presented(&self) -> &[Vec<Overlay>] {
        &self.presented
    }

    /// 最後のpresentのオーバーレイ
    pub fn last_overlays(&self) -> Option<&[Overlay]> {
        self.presented.last().map(|o| o.as_slice())
    }

    /// wait_keyに渡されたタイムアウトの記録
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    /// closeが呼ばれたか
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for MockDisplayAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockDisplayAdapter {
    fn present(&mut self, _frame: &Frame, overlays: &[Overlay]) -> DomainResult<()> {
        self.presented.push(overlays.to_vec());
        Ok(())
    }

    fn wait_key(&mut self, timeout: Duration) -> DomainResult<Option<char>> {
        // モック実装: 待たずに記録だけ行い、スクリプトされたキーを返す
        self.waits.push(timeout);
        Ok(self.key_script.pop_front().unwrap_or(None))
    }

    fn close(&mut self) -> DomainResult<()> {
        self.closed = true;
        Ok(())
    }
}
