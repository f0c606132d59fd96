//! Infrastructure層: 外部技術の統合
//!
//! Domain層のtraitを実装し、外部ライブラリ（OpenCV）と接続する。
//! mock_*はスキャンループを実機なしでテストするためのスクリプト可能な実装。

pub mod camera;
pub mod decoder;
pub mod display;
pub(crate) mod frame_mat;
pub mod mock_capture;
pub mod mock_decoder;
pub mod mock_display;
