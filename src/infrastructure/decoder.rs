/// QRコードデコードアダプタ
///
/// OpenCV QRCodeDetectorによるマルチコード検出。
/// 1フレームから複数コードのペイロードと四隅座標を取り出す。

use crate::domain::{
    BoundingRect, DecodePort, DetectedCode, DomainError, DomainResult, Frame, PixelPoint,
};
use crate::infrastructure::frame_mat::frame_to_mat;
use opencv::core::{Mat, Point2f, Vector};
use opencv::objdetect::QRCodeDetector;
use opencv::prelude::*;

/// 1コードあたりの頂点数（QRコードは四隅）
const CORNERS_PER_CODE: usize = 4;

/// QRコードデコードアダプタ
///
/// DecodePort traitを実装し、QRCodeDetectorによる検出を提供。
pub struct QrDecoder {
    detector: QRCodeDetector,
}

impl QrDecoder {
    /// 新しいデコーダを作成
    ///
    /// # Returns
    /// - `Ok(QrDecoder)`: 初期化成功
    /// - `Err(DomainError::Initialization)`: QRCodeDetectorの作成失敗
    pub fn new() -> DomainResult<Self> {
        let detector = QRCodeDetector::default().map_err(|e| {
            DomainError::Initialization(format!("Failed to create QRCodeDetector: {:?}", e))
        })?;
        Ok(Self { detector })
    }
}

impl DecodePort for QrDecoder {
    fn decode(&mut self, frame: &Frame) -> DomainResult<Vec<DetectedCode>> {
        let mat = frame_to_mat(frame)?;

        let mut decoded_info: Vector<String> = Vector::new();
        // pointsはN行×4列のCV_32FC2（コードごとに四隅）で返される
        let mut points = Mat::default();
        let mut straight_codes: Vector<Mat> = Vector::new();

        let found = self
            .detector
            .detect_and_decode_multi(&mat, &mut decoded_info, &mut points, &mut straight_codes)
            .map_err(|e| DomainError::Decode(format!("Failed to detect codes: {:?}", e)))?;

        if !found {
            return Ok(Vec::new());
        }

        let count = decoded_info.len();
        if points.rows() as usize != count || points.cols() as usize != CORNERS_PER_CODE {
            return Err(DomainError::Decode(format!(
                "Corner layout mismatch: {} codes but {}x{} points",
                count,
                points.rows(),
                points.cols()
            )));
        }

        let mut codes = Vec::with_capacity(count);
        for (i, info) in decoded_info.iter().enumerate() {
            // 位置のみ検出されデコードできなかったコードは空文字列で返る
            if info.is_empty() {
                tracing::debug!("Skipping undecoded code at index {}", i);
                continue;
            }

            let mut polygon = Vec::with_capacity(CORNERS_PER_CODE);
            for k in 0..CORNERS_PER_CODE {
                let p = points
                    .at_2d::<Point2f>(i as i32, k as i32)
                    .map_err(|e| DomainError::Decode(format!("Failed to read corner: {:?}", e)))?;
                polygon.push(PixelPoint::new(p.x as i32, p.y as i32));
            }

            let rect = BoundingRect::from_points(&polygon)
                .ok_or_else(|| DomainError::Decode("Detected code has no corners".to_string()))?;

            codes.push(DetectedCode::new(info.into_bytes(), polygon, rect));
        }

        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_construction() {
        QrDecoder::new().expect("QRCodeDetector should construct");
    }

    #[test]
    fn test_decode_blank_frame_finds_nothing() {
        // 黒一色のフレームにコードは存在しない
        let mut decoder = QrDecoder::new().expect("decoder should construct");
        let frame = Frame::new(vec![0u8; 320 * 240 * 3], 320, 240);

        let codes = decoder.decode(&frame).expect("decode should succeed");
        assert!(codes.is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_frame() {
        // バッファ長の壊れたフレームはデコード前に拒否される
        let mut decoder = QrDecoder::new().expect("decoder should construct");
        let frame = Frame::new(vec![0u8; 7], 320, 240);

        assert!(decoder.decode(&frame).is_err());
    }
}
