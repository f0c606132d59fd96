//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

/// アプリケーション設定のルート構造
#[allow(dead_code)]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// カメラ入力設定
    #[serde(default)]
    pub camera: CameraConfig,
    /// デコーダ設定
    #[serde(default)]
    pub decoder: DecoderConfig,
    /// 表示ウィンドウ設定
    #[serde(default)]
    pub display: DisplayConfig,
    /// スキャンループ設定
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// キーバインド設定
    #[serde(default)]
    pub keys: KeysConfig,
}

/// カメラ入力設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CameraConfig {
    /// カメラデバイスのインデックス
    ///
    /// 通常は0（最初に見つかったカメラ）
    /// デフォルト: 0
    #[serde(default)]
    pub device_index: u32,

    /// 要求するキャプチャ幅（ピクセル）
    ///
    /// 0 の場合はドライバのデフォルト解像度を使用
    /// デフォルト: 0
    #[serde(default)]
    pub frame_width: u32,

    /// 要求するキャプチャ高さ（ピクセル）
    ///
    /// 0 の場合はドライバのデフォルト解像度を使用
    /// デフォルト: 0
    #[serde(default)]
    pub frame_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            frame_width: 0,
            frame_height: 0,
        }
    }
}

/// デコーダ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DecoderConfig {
    /// デコードエンジン
    ///
    /// 選択肢: "qrcode" (OpenCV QRCodeDetector)
    /// 1Dバーコード用エンジンはOpenCV 4.8+のビルドが前提になるため未対応
    /// デフォルト: "qrcode"
    pub engine: String,
}

impl DecoderConfig {
    /// デフォルトのデコードエンジン
    pub const DEFAULT_ENGINE: &'static str = "qrcode";
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            engine: Self::DEFAULT_ENGINE.to_string(),
        }
    }
}

/// 表示ウィンドウ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisplayConfig {
    /// ウィンドウタイトル
    ///
    /// デフォルト: "QR Code Scanner"
    pub window_title: String,
}

impl DisplayConfig {
    /// デフォルトのウィンドウタイトル
    pub const DEFAULT_WINDOW_TITLE: &'static str = "QR Code Scanner";
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: Self::DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

/// スキャンループ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScannerConfig {
    /// 連続で検出なしと判定する上限回数
    ///
    /// デコードが空振りしたイテレーションがこの回数に達すると
    /// 「見つからなかった」メッセージを出して終了する
    /// デフォルト: 500回
    pub no_detection_limit: u32,

    /// 検出後にフレームを表示し続ける時間（ミリ秒）
    ///
    /// デフォルト: 3000ms
    pub exit_hold_ms: u64,

    /// キー入力ポーリングの待ち時間（ミリ秒）
    ///
    /// デフォルト: 1ms
    pub poll_wait_ms: u64,
}

impl ScannerConfig {
    /// デフォルトの検出なし上限回数
    pub const DEFAULT_NO_DETECTION_LIMIT: u32 = 500;
    /// デフォルトの検出後ホールド時間（ミリ秒）
    pub const DEFAULT_EXIT_HOLD_MS: u64 = 3000;
    /// デフォルトのキーポーリング待ち時間（ミリ秒）
    pub const DEFAULT_POLL_WAIT_MS: u64 = 1;
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            no_detection_limit: Self::DEFAULT_NO_DETECTION_LIMIT,
            exit_hold_ms: Self::DEFAULT_EXIT_HOLD_MS,
            poll_wait_ms: Self::DEFAULT_POLL_WAIT_MS,
        }
    }
}

impl ScannerConfig {
    /// 検出後ホールド時間をDurationとして取得
    #[allow(dead_code)]
    pub fn exit_hold(&self) -> Duration {
        Duration::from_millis(self.exit_hold_ms)
    }

    /// キーポーリング待ち時間をDurationとして取得
    #[allow(dead_code)]
    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }
}

/// キーバインド設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeysConfig {
    /// 終了キー
    ///
    /// デフォルト: "q"
    pub quit: char,

    /// 一時停止/再開キー
    ///
    /// デフォルト: "p"
    pub pause: char,

    /// 検出済みセットとエラーカウンタをクリアするキー
    ///
    /// デフォルト: "c"
    pub clear: char,
}

impl KeysConfig {
    /// デフォルトの終了キー
    pub const DEFAULT_QUIT: char = 'q';
    /// デフォルトの一時停止キー
    pub const DEFAULT_PAUSE: char = 'p';
    /// デフォルトのクリアキー
    pub const DEFAULT_CLEAR: char = 'c';
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            quit: Self::DEFAULT_QUIT,
            pause: Self::DEFAULT_PAUSE,
            clear: Self::DEFAULT_CLEAR,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    #[allow(dead_code)]
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    #[allow(dead_code)]
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    #[allow(dead_code)]
    pub fn validate(&self) -> DomainResult<()> {
        // デコードエンジンの検証
        if self.decoder.engine != DecoderConfig::DEFAULT_ENGINE {
            return Err(DomainError::Configuration(format!(
                "Unknown decoder engine: '{}' (supported: \"qrcode\")",
                self.decoder.engine
            )));
        }

        // ウィンドウタイトルの検証
        if self.display.window_title.is_empty() {
            return Err(DomainError::Configuration(
                "Window title must not be empty".to_string(),
            ));
        }

        // ループ閾値の検証
        if self.scanner.no_detection_limit == 0 {
            return Err(DomainError::Configuration(
                "no_detection_limit must be greater than 0".to_string(),
            ));
        }

        // waitKey(0)は無限ブロックになるため0は許可しない
        if self.scanner.poll_wait_ms == 0 {
            return Err(DomainError::Configuration(
                "poll_wait_ms must be greater than 0 (0 blocks forever)".to_string(),
            ));
        }
        if self.scanner.exit_hold_ms == 0 {
            return Err(DomainError::Configuration(
                "exit_hold_ms must be greater than 0 (0 blocks forever)".to_string(),
            ));
        }

        // キーバインドの検証
        let keys = [self.keys.quit, self.keys.pause, self.keys.clear];
        if keys.iter().any(|k| !k.is_ascii()) {
            return Err(DomainError::Configuration(
                "Key bindings must be ASCII characters".to_string(),
            ));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(DomainError::Configuration(
                "Key bindings must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}
