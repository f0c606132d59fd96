/// Webカメラキャプチャアダプタ
///
/// OpenCV VideoCaptureを使用したカメラフレーム取得。
/// フレームはBGR 3chの連続バッファとしてDomain層のFrameに変換される。

use crate::domain::{CameraConfig, CameraInfo, CapturePort, DomainError, DomainResult, Frame};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

/// Webカメラキャプチャアダプタ
///
/// CapturePort traitを実装し、VideoCaptureによるフレーム取得を提供。
pub struct CameraCapture {
    cap: VideoCapture,
    device_index: u32,
    released: bool,
}

impl CameraCapture {
    /// カメラデバイスを開いてアダプタを作成
    ///
    /// # Arguments
    /// - `config`: カメラ設定（デバイスインデックス・要求解像度）
    ///
    /// # Returns
    /// - `Ok(CameraCapture)`: オープン成功
    /// - `Err(DomainError::Initialization)`: カメラが開けない（致命的、ループ開始前に失敗させる）
    pub fn new(config: &CameraConfig) -> DomainResult<Self> {
        // CAP_ANY: 利用可能なバックエンドを自動選択
        let mut cap =
            VideoCapture::new(config.device_index as i32, videoio::CAP_ANY).map_err(|e| {
                DomainError::Initialization(format!("Failed to create VideoCapture: {:?}", e))
            })?;

        let opened = cap.is_opened().map_err(|e| {
            DomainError::Initialization(format!("Failed to query camera state: {:?}", e))
        })?;
        if !opened {
            return Err(DomainError::Initialization(format!(
                "Could not open video capture (device {})",
                config.device_index
            )));
        }

        // 解像度が設定されていればドライバに要求する（0はドライバデフォルト）
        // ドライバが対応しない解像度は拒否されることがあるため、失敗は警告のみ
        if config.frame_width > 0 {
            let accepted = cap
                .set(videoio::CAP_PROP_FRAME_WIDTH, config.frame_width as f64)
                .map_err(|e| {
                    DomainError::Initialization(format!("Failed to set frame width: {:?}", e))
                })?;
            if !accepted {
                tracing::warn!("Camera rejected frame width {}", config.frame_width);
            }
        }
        if config.frame_height > 0 {
            let accepted = cap
                .set(videoio::CAP_PROP_FRAME_HEIGHT, config.frame_height as f64)
                .map_err(|e| {
                    DomainError::Initialization(format!("Failed to set frame height: {:?}", e))
                })?;
            if !accepted {
                tracing::warn!("Camera rejected frame height {}", config.frame_height);
            }
        }

        Ok(Self {
            cap,
            device_index: config.device_index,
            released: false,
        })
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        // 明示的なreleaseを経ないエラー経路のバックストップ
        if !self.released {
            let _ = self.cap.release();
        }
    }
}

impl CapturePort for CameraCapture {
    fn read_frame(&mut self) -> DomainResult<Option<Frame>> {
        let mut mat = Mat::default();
        let grabbed = self
            .cap
            .read(&mut mat)
            .map_err(|e| DomainError::Capture(format!("Failed to read frame: {:?}", e)))?;

        // 読み取り失敗・空フレームはOk(None)。呼び出し側が即座に再試行する
        if !grabbed || mat.rows() == 0 || mat.cols() == 0 {
            return Ok(None);
        }

        let width = mat.cols() as u32;
        let height = mat.rows() as u32;

        // data_bytes()は連続メモリを要求する。VideoCaptureの出力は通常連続だが、
        // 非連続の場合はクローンで連続化する
        let mat = if mat.is_continuous() {
            mat
        } else {
            mat.try_clone()
                .map_err(|e| DomainError::Capture(format!("Failed to clone Mat: {:?}", e)))?
        };

        let data = mat
            .data_bytes()
            .map_err(|e| DomainError::Capture(format!("Failed to access frame data: {:?}", e)))?
            .to_vec();

        let frame = Frame::new(data, width, height);
        if frame.data.len() != frame.expected_len() {
            // BGR 3ch以外のフォーマットが来た場合はエラー（グレースケールカメラ等）
            return Err(DomainError::Capture(format!(
                "Unexpected frame format: {} bytes for {}x{}",
                frame.data.len(),
                width,
                height
            )));
        }

        Ok(Some(frame))
    }

    fn device_info(&self) -> CameraInfo {
        // プロパティ取得は情報表示用のため、失敗時は0/unknownで継続する
        let width = self
            .cap
            .get(videoio::CAP_PROP_FRAME_WIDTH)
            .unwrap_or(0.0) as u32;
        let height = self
            .cap
            .get(videoio::CAP_PROP_FRAME_HEIGHT)
            .unwrap_or(0.0) as u32;
        let fps = self.cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let backend = self
            .cap
            .get_backend_name()
            .unwrap_or_else(|_| "unknown".to_string());

        CameraInfo {
            width,
            height,
            fps,
            backend,
        }
    }

    fn release(&mut self) -> DomainResult<()> {
        // 二重呼び出しは無害（終了経路すべてから呼ばれる）
        if self.released {
            return Ok(());
        }

        self.cap
            .release()
            .map_err(|e| DomainError::Capture(format!("Failed to release camera: {:?}", e)))?;
        self.released = true;
        tracing::info!("Camera device {} released", self.device_index);
        Ok(())
    }
}
