/// ウィンドウ表示アダプタ
///
/// OpenCV highguiによるウィンドウ描画とキー入力処理。
/// オーバーレイの色・座標・フォントはこのモジュールの定数で定義し、
/// Application層は描画コマンド（Overlay）だけを組み立てる。

use crate::domain::ports::key_from_code;
use crate::domain::{DisplayConfig, DisplayPort, DomainError, DomainResult, Frame, Overlay};
use crate::infrastructure::frame_mat::frame_to_mat;
use opencv::core::{Mat, Point, Rect, Scalar, Vector};
use opencv::highgui;
use opencv::imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8};
use std::time::Duration;

/// テキスト描画の共通フォントスケール
const FONT_SCALE: f64 = 0.7;
/// テキスト描画の共通線幅
const TEXT_THICKNESS: i32 = 2;
/// コード外形ポリゴンの線幅
const OUTLINE_THICKNESS: i32 = 5;
/// ペイロードラベル背景の幅（ピクセル）
const LABEL_WIDTH: i32 = 300;
/// ペイロードラベル背景の高さ（ピクセル）
const LABEL_HEIGHT: i32 = 30;
/// ラベルテキストの背景左端からのオフセット
const LABEL_TEXT_INSET_X: i32 = 10;
/// ラベルテキストのベースライン位置（矩形上端からのオフセット）
const LABEL_TEXT_INSET_Y: i32 = 10;

/// ウィンドウ表示アダプタ
///
/// DisplayPort traitを実装し、highguiによる表示とキー入力を提供。
pub struct WindowDisplay {
    window_title: String,
    closed: bool,
}

impl WindowDisplay {
    /// ウィンドウを作成してアダプタを初期化
    ///
    /// # Returns
    /// - `Ok(WindowDisplay)`: ウィンドウ作成成功
    /// - `Err(DomainError::Initialization)`: ウィンドウ作成失敗（致命的）
    pub fn new(config: &DisplayConfig) -> DomainResult<Self> {
        // WINDOW_AUTOSIZE: 画像サイズに合わせた等倍表示（リサイズ不可）
        highgui::named_window(&config.window_title, highgui::WINDOW_AUTOSIZE).map_err(|e| {
            DomainError::Initialization(format!("Failed to create window: {:?}", e))
        })?;

        Ok(Self {
            window_title: config.window_title.clone(),
            closed: false,
        })
    }

    /// 1つのオーバーレイをMatに描画する
    fn render_overlay(mat: &mut Mat, overlay: &Overlay) -> DomainResult<()> {
        let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
        let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
        let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

        match overlay {
            Overlay::Outline { points } => {
                let contour: Vector<Point> =
                    points.iter().map(|p| Point::new(p.x, p.y)).collect();
                let polygons: Vector<Vector<Point>> = std::iter::once(contour).collect();
                imgproc::polylines(mat, &polygons, true, green, OUTLINE_THICKNESS, LINE_8, 0)
                    .map_err(|e| {
                        DomainError::Display(format!("Failed to draw polygon: {:?}", e))
                    })?;
            }
            Overlay::Label { rect, text } => {
                // コード矩形の直上に塗り潰し背景を描き、その中にペイロードを載せる
                // 画面外にはみ出す部分はOpenCV側でクリップされる
                let background = Rect::new(rect.x, rect.y - LABEL_HEIGHT, LABEL_WIDTH, LABEL_HEIGHT);
                imgproc::rectangle(mat, background, green, imgproc::FILLED, LINE_8, 0)
                    .map_err(|e| {
                        DomainError::Display(format!("Failed to draw label background: {:?}", e))
                    })?;

                imgproc::put_text(
                    mat,
                    text,
                    Point::new(rect.x + LABEL_TEXT_INSET_X, rect.y - LABEL_TEXT_INSET_Y),
                    FONT_HERSHEY_SIMPLEX,
                    FONT_SCALE,
                    white,
                    TEXT_THICKNESS,
                    LINE_8,
                    false,
                )
                .map_err(|e| DomainError::Display(format!("Failed to draw label: {:?}", e)))?;
            }
            Overlay::DetectedBanner => {
                imgproc::put_text(
                    mat,
                    "QR/BarCode Detected",
                    Point::new(10, 60),
                    FONT_HERSHEY_SIMPLEX,
                    FONT_SCALE,
                    green,
                    TEXT_THICKNESS,
                    LINE_8,
                    false,
                )
                .map_err(|e| DomainError::Display(format!("Failed to draw banner: {:?}", e)))?;
            }
            Overlay::PausedBanner { resume_key } => {
                let message = format!("Scanning Paused (Press '{}' to resume)", resume_key);
                imgproc::put_text(
                    mat,
                    &message,
                    Point::new(10, 60),
                    FONT_HERSHEY_SIMPLEX,
                    FONT_SCALE,
                    red,
                    TEXT_THICKNESS,
                    LINE_8,
                    false,
                )
                .map_err(|e| DomainError::Display(format!("Failed to draw banner: {:?}", e)))?;
            }
            Overlay::FrameCounter { count } => {
                let message = format!("Frame: {}", count);
                imgproc::put_text(
                    mat,
                    &message,
                    Point::new(10, 30),
                    FONT_HERSHEY_SIMPLEX,
                    FONT_SCALE,
                    white,
                    TEXT_THICKNESS,
                    LINE_8,
                    false,
                )
                .map_err(|e| {
                    DomainError::Display(format!("Failed to draw frame counter: {:?}", e))
                })?;
            }
        }

        Ok(())
    }
}

impl Drop for WindowDisplay {
    fn drop(&mut self) {
        // 明示的なcloseを経ないエラー経路のバックストップ
        if !self.closed {
            let _ = highgui::destroy_all_windows();
        }
    }
}

impl DisplayPort for WindowDisplay {
    fn present(&mut self, frame: &Frame, overlays: &[Overlay]) -> DomainResult<()> {
        let mut mat = frame_to_mat(frame)?;

        for overlay in overlays {
            Self::render_overlay(&mut mat, overlay)?;
        }

        highgui::imshow(&self.window_title, &mat)
            .map_err(|e| DomainError::Display(format!("Failed to show frame: {:?}", e)))
    }

    fn wait_key(&mut self, timeout: Duration) -> DomainResult<Option<char>> {
        // waitKey(0)は無限ブロックになるため最低1msを保証する
        let ms = (timeout.as_millis() as i32).max(1);
        let raw = highgui::wait_key(ms)
            .map_err(|e| DomainError::Display(format!("Failed to wait for key: {:?}", e)))?;
        Ok(key_from_code(raw))
    }

    fn close(&mut self) -> DomainResult<()> {
        // 二重呼び出しは無害（終了経路すべてから呼ばれる）
        if self.closed {
            return Ok(());
        }

        highgui::destroy_all_windows()
            .map_err(|e| DomainError::Display(format!("Failed to destroy windows: {:?}", e)))?;
        self.closed = true;
        tracing::info!("Display window '{}' closed", self.window_title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundingRect, PixelPoint};
    use opencv::prelude::*;

    fn black_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height)
    }

    #[test]
    fn test_render_all_overlay_kinds() {
        // ウィンドウなしでも描画自体はMat上で完結する
        let frame = black_frame(640, 480);
        let mut mat = frame_to_mat(&frame).expect("mat");

        let overlays = [
            Overlay::Outline {
                points: vec![
                    PixelPoint::new(50, 40),
                    PixelPoint::new(150, 40),
                    PixelPoint::new(150, 140),
                    PixelPoint::new(50, 140),
                ],
            },
            Overlay::Label {
                rect: BoundingRect::new(50, 40, 100, 100),
                text: "https://example.com".to_string(),
            },
            Overlay::DetectedBanner,
            Overlay::PausedBanner { resume_key: 'p' },
            Overlay::FrameCounter { count: 42 },
        ];

        for overlay in &overlays {
            WindowDisplay::render_overlay(&mut mat, overlay).expect("render should succeed");
        }

        let bytes = mat.data_bytes().expect("mat should be continuous");
        assert!(
            bytes.iter().any(|&b| b != 0),
            "rendering should modify the frame"
        );
    }

    #[test]
    fn test_render_label_clips_at_frame_edge() {
        // コードが画面上端にあるとラベル背景は画面外にはみ出すが、描画は成功する
        let frame = black_frame(320, 240);
        let mut mat = frame_to_mat(&frame).expect("mat");

        let overlay = Overlay::Label {
            rect: BoundingRect::new(10, 5, 50, 50),
            text: "EDGE".to_string(),
        };
        WindowDisplay::render_overlay(&mut mat, &overlay).expect("clipped label should render");
    }

    #[test]
    #[ignore] // GUI環境（ウィンドウ表示）が必要なため通常はスキップ
    fn test_window_present_and_close() {
        let config = DisplayConfig::default();
        let mut display = match WindowDisplay::new(&config) {
            Ok(d) => d,
            Err(e) => {
                println!("Window creation failed (expected without display): {:?}", e);
                return;
            }
        };

        let frame = black_frame(640, 480);
        display
            .present(&frame, &[Overlay::FrameCounter { count: 1 }])
            .expect("present should succeed");

        let key = display
            .wait_key(Duration::from_millis(100))
            .expect("wait_key should succeed");
        println!("Key pressed during test: {:?}", key);

        display.close().expect("close should succeed");
        display.close().expect("second close should be harmless");
    }
}
