/// Frame→Mat変換ヘルパー
///
/// Domain層のFrame（BGR 3ch連続バッファ）をOpenCVのMatに変換する。
/// カメラ・デコーダ・表示の各アダプタが共有する。

use crate::domain::{DomainError, DomainResult, Frame};
use opencv::core::{self, Mat};
use opencv::prelude::*;
use std::ffi::c_void;

/// FrameのバッファからBGR 3chのMatを作成する
///
/// 生ポインタ経由の一時Matを即座にクローンし、所有権のある連続メモリの
/// Matとして返す。返されたMatはFrameと独立しており、描画で書き換えてよい。
///
/// # Returns
/// - `Ok(Mat)`: 変換成功
/// - `Err(DomainError)`: バッファ長がwidth×height×3と一致しない、またはMat作成失敗
pub fn frame_to_mat(frame: &Frame) -> DomainResult<Mat> {
    let expected = frame.expected_len();
    if frame.data.len() != expected {
        return Err(DomainError::Other(format!(
            "Invalid frame data length: expected {} bytes, got {}",
            expected,
            frame.data.len()
        )));
    }

    // 生データを参照する一時Mat（frameの寿命内でのみ有効）
    let borrowed = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            frame.height as i32,
            frame.width as i32,
            core::CV_8UC3, // BGR形式
            frame.data.as_ptr() as *mut c_void,
            core::Mat_AUTO_STEP,
        )
    }
    .map_err(|e| DomainError::Other(format!("Failed to create Mat: {:?}", e)))?;

    borrowed
        .try_clone()
        .map_err(|e| DomainError::Other(format!("Failed to clone Mat: {:?}", e)))
}
