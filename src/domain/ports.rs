/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層がDIで注入する。
/// スキャンループはシングルスレッドなのでSend/Syncは要求しない。

use crate::domain::{DetectedCode, DomainResult, Frame, Overlay};
use std::time::Duration;

/// キャプチャポート: カメラフレームの取得を抽象化
#[allow(dead_code)]
pub trait CapturePort {
    /// 次のフレームを取得する
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: フレームの取得成功
    /// - `Ok(None)`: 取得失敗（読み取りエラー・空フレーム）。呼び出し側が即座に再試行する
    /// - `Err(DomainError)`: デバイスAPIエラー。呼び出し側は取得失敗と同様に再試行する
    fn read_frame(&mut self) -> DomainResult<Option<Frame>>;

    /// キャプチャデバイスの情報を取得
    fn device_info(&self) -> CameraInfo;

    /// デバイスを解放する
    ///
    /// ループ終了時に全経路で呼び出される。二重呼び出しは無害であること。
    fn release(&mut self) -> DomainResult<()>;
}

/// カメラデバイス情報
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub backend: String,
}

/// デコードポート: QR/バーコード検出を抽象化
#[allow(dead_code)]
pub trait DecodePort {
    /// フレームをデコードして検出結果を返す
    ///
    /// # Arguments
    /// - `frame`: 処理対象のフレーム
    ///
    /// # Returns
    /// - `Ok(Vec<DetectedCode>)`: 検出結果（0個 = 検出なし）
    /// - `Err(DomainError)`: デコード失敗。呼び出し側はこのイテレーションを破棄する
    fn decode(&mut self, frame: &Frame) -> DomainResult<Vec<DetectedCode>>;
}

/// 表示ポート: ウィンドウ描画とキー入力を抽象化
#[allow(dead_code)]
pub trait DisplayPort {
    /// オーバーレイを描画したフレームをウィンドウに表示する
    ///
    /// # Arguments
    /// - `frame`: 表示するフレーム
    /// - `overlays`: フレームに重ねる描画コマンド列
    fn present(&mut self, frame: &Frame, overlays: &[Overlay]) -> DomainResult<()>;

    /// キー入力をタイムアウト付きで待つ
    ///
    /// 通常ポーリング（1ms）と検出後の表示ホールド（3000ms）の両方で使われる。
    ///
    /// # Returns
    /// - `Ok(Some(char))`: 押されたキー（ASCII、0xFFマスク済み）
    /// - `Ok(None)`: タイムアウト（キー入力なし）
    fn wait_key(&mut self, timeout: Duration) -> DomainResult<Option<char>>;

    /// ウィンドウを破棄する
    ///
    /// ループ終了時に全経路で呼び出される。二重呼び出しは無害であること。
    fn close(&mut self) -> DomainResult<()>;
}

/// OpenCVのwait_key戻り値をASCII文字に変換するヘルパー
///
/// waitKeyは下位8bitにASCIIコード、上位bitにプラットフォーム依存の
/// モディファイアを載せて返すため、0xFFでマスクして比較する。
///
/// # Returns
/// - `Some(char)`: キー押下あり
/// - `None`: キー押下なし（負値）
#[inline]
pub fn key_from_code(raw: i32) -> Option<char> {
    if raw < 0 {
        return None;
    }
    Some(((raw & 0xFF) as u8) as char)
}
