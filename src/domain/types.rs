/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// すべての処理で共有される不変の型。

use crate::domain::error::{DomainError, DomainResult};
use std::time::Instant;

/// ピクセル座標上の点（画面左上原点）
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    /// 新しい点を作成
    #[allow(dead_code)]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 軸平行のバウンディング矩形（ピクセル座標）
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingRect {
    /// 新しい矩形を作成
    #[allow(dead_code)]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 点列を包含する最小の軸平行矩形を計算
    ///
    /// # Returns
    /// - `Some(BoundingRect)`: 1点以上ある場合
    /// - `None`: 点列が空の場合
    #[allow(dead_code)]
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// キャプチャされたフレームデータ
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（BGR形式、8bit 3ch、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    #[allow(dead_code)]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }

    /// BGR 3chとして期待されるバイト数
    #[allow(dead_code)]
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// 1つの検出されたQR/バーコード
///
/// デコーダが1回の呼び出しで0個以上返す一時的なレコード。
/// 寿命は1ループイテレーション。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCode {
    /// デコードされたペイロード（バイト列）
    pub payload: Vec<u8>,
    /// コード形状の境界点列（順序付き）
    pub polygon: Vec<PixelPoint>,
    /// 軸平行のバウンディング矩形
    pub rect: BoundingRect,
}

impl DetectedCode {
    /// 新しい検出結果を作成
    #[allow(dead_code)]
    pub fn new(payload: Vec<u8>, polygon: Vec<PixelPoint>, rect: BoundingRect) -> Self {
        Self {
            payload,
            polygon,
            rect,
        }
    }

    /// ペイロードをUTF-8テキストとしてデコード
    ///
    /// # Returns
    /// - `Ok(String)`: デコード成功
    /// - `Err(DomainError::Decode)`: UTF-8として不正なペイロード
    pub fn payload_text(&self) -> DomainResult<String> {
        String::from_utf8(self.payload.clone())
            .map_err(|e| DomainError::Decode(format!("Payload is not valid UTF-8: {}", e)))
    }
}

/// 1フレーム分の描画コマンド
///
/// ループ側で組み立て、DisplayPort実装が実際の描画に変換する。
/// 描画プリミティブ（色・座標・フォント）はアダプタ側の定数。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// 検出コードの外形（閉じたポリゴン）
    Outline { points: Vec<PixelPoint> },
    /// バウンディング矩形の直上に描くペイロードラベル（塗り潰し背景＋テキスト）
    Label { rect: BoundingRect, text: String },
    /// 検出ステータスバナー
    DetectedBanner,
    /// 一時停止バナー（再開キーを文言に埋め込む）
    PausedBanner { resume_key: char },
    /// フレームカウンタ表示
    FrameCounter { count: u64 },
}
