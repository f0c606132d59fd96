/// モックキャプチャアダプタ
///
/// テスト・開発用のカメラモック実装。
/// スクリプトされた読み取り結果を先頭から消費し、尽きた後は成功を返し続ける。

use crate::domain::{CameraInfo, CapturePort, DomainError, DomainResult, Frame};
use std::collections::VecDeque;

/// 1回分の読み取り結果のスクリプト
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedRead {
    /// 合成フレームの取得成功
    Success,
    /// 取得失敗（Ok(None)、再試行される）
    Miss,
    /// デバイスAPIエラー（Err、再試行される）
    Fail,
}

/// モックキャプチャアダプタ
#[allow(dead_code)]
pub struct MockCaptureAdapter {
    width: u32,
    height: u32,
    script: VecDeque<ScriptedRead>,
    reads: u64,
    released: bool,
}

#[allow(dead_code)]
impl MockCaptureAdapter {
    /// 指定サイズの合成フレームを返すモックを作成
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            script: VecDeque::new(),
            reads: 0,
            released: false,
        }
    }

    /// 読み取り結果をスクリプトに追加
    pub fn queue(&mut self, outcome: ScriptedRead) {
        self.script.push_back(outcome);
    }

    /// 同じ読み取り結果をn回スクリプトに追加
    pub fn queue_n(&mut self, outcome: ScriptedRead, n: usize) {
        for _ in 0..n {
            self.script.push_back(outcome);
        }
    }

    /// read_frameが呼ばれた回数
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// releaseが呼ばれたか
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn synthetic_frame(&self) -> Frame {
        // モック実装: 全画素ゼロ（黒）のBGRフレーム
        Frame::new(
            vec![0u8; (self.width * self.height * 3) as usize],
            self.width,
            self.height,
        )
    }
}

impl Default for MockCaptureAdapter {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl CapturePort for MockCaptureAdapter {
    fn read_frame(&mut self) -> DomainResult<Option<Frame>> {
        self.reads += 1;

        match self.script.pop_front() {
            Some(ScriptedRead::Miss) => Ok(None),
            Some(ScriptedRead::Fail) => {
                Err(DomainError::Capture("Scripted capture failure".to_string()))
            }
            // スクリプトが尽きた後は成功を返し続ける
            Some(ScriptedRead::Success) | None => Ok(Some(self.synthetic_frame())),
        }
    }

    fn device_info(&self) -> CameraInfo {
        CameraInfo {
            width: self.width,
            height: self.height,
            fps: 30.0,
            backend: "mock".to_string(),
        }
    }

    fn release(&mut self) -> DomainResult<()> {
        self.released = true;
        Ok(())
    }
}
