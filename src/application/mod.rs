//! Application Layer
//!
//! スキャンループの制御と状態管理のユースケースを実装します。
//!
//! ## モジュール構成
//! - `scanner`: シングルスレッドのスキャンループ制御（read → decode → annotate → display → input）
//! - `state`: ループ状態（カウンタ・フラグ・検出済みペイロード集合）

pub mod scanner;
pub mod state;
